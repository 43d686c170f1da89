//! Schedule output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Schedule month (1-indexed)
    pub month: u32,

    /// Installment due date
    pub due_date: NaiveDate,

    /// Outstanding balance at the start of the month
    pub starting_balance: f64,

    /// Scheduled payment (capped in the final month so the balance cannot go negative)
    pub base_payment: f64,

    /// Commission fee charged this month
    pub commission_paid: f64,

    /// Scheduled payment plus commission
    pub total_payment_due: f64,

    /// Extra contribution applied this month (capped at the remaining balance)
    pub extra_payment: f64,

    /// Principal component of the scheduled payment
    pub principal_paid: f64,

    /// Interest component of the scheduled payment
    pub interest_paid: f64,

    /// Outstanding balance after principal and extra
    pub ending_balance: f64,

    /// Running interest total through this month
    pub cumulative_interest: f64,

    /// Interest saved vs the baseline schedule at the same month.
    /// Filled in for planned schedules only; 0 otherwise.
    pub cumulative_interest_saved: f64,
}

/// Aggregates over a full schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Number of months until payoff
    pub months: u32,

    /// Total interest paid
    pub total_interest: f64,

    /// Total commission paid
    pub total_commission: f64,

    /// Total of all payments, commissions and extras
    pub total_paid: f64,
}

/// Complete result of one schedule run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Monthly rows, in order
    pub rows: Vec<AmortizationRow>,

    /// Aggregates over the rows
    pub summary: ScheduleSummary,
}

impl ScheduleResult {
    /// Due date of the final installment
    pub fn payoff_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|row| row.due_date)
    }
}
