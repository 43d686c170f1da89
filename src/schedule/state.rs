//! Iteration state for the schedule builder

use chrono::{Months, NaiveDate};

/// State of the amortization loop at the start of a month
#[derive(Debug, Clone)]
pub struct ScheduleState {
    /// Current month (1-indexed)
    pub month: u32,

    /// Outstanding balance at the start of the month
    pub balance: f64,

    /// Payment currently in force (re-derived after a reduce-payment extra)
    pub current_payment: f64,

    /// Due date of the current month's installment
    pub due_date: NaiveDate,

    /// Unrounded running interest total
    pub total_interest: f64,

    /// Unrounded running commission total
    pub total_commission: f64,

    /// Unrounded running total of everything paid
    pub total_paid: f64,
}

impl ScheduleState {
    /// Initialize state at month 1
    pub fn new(principal: f64, monthly_payment: f64, first_due_date: NaiveDate) -> Self {
        Self {
            month: 1,
            balance: principal,
            current_payment: monthly_payment,
            due_date: first_due_date,
            total_interest: 0.0,
            total_commission: 0.0,
            total_paid: 0.0,
        }
    }

    /// Advance to the next month, stepping the due date by one calendar
    /// month. The day-of-month is clamped to the target month's last day
    /// (Jan 31 -> Feb 28/29).
    pub fn advance_month(&mut self) {
        self.month += 1;
        self.due_date = self.due_date + Months::new(1);
    }
}
