//! Per-year payment-mix aggregation for charting

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::money::{normalize_money, round_money};
use crate::schedule::AmortizationRow;

/// Default number of year bars kept
pub const PAYMENT_MIX_MAX_BARS: usize = 18;

/// One calendar year of the payment-mix chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMixBar {
    pub year: i32,

    /// Principal repaid this year, including extra payments
    pub principal_paid: f64,

    /// Extra payments alone
    pub extra_paid: f64,

    /// Interest paid this year
    pub interest_paid: f64,

    /// Principal + extra + interest
    pub total_paid: f64,

    /// Principal share of the year's total, in percent
    pub principal_pct: f64,

    /// Interest share of the year's total, in percent
    pub interest_pct: f64,

    /// Principal repaid this year as a percent of the original loan
    pub principal_loan_pct: f64,

    /// Running principal repaid as a percent of the original loan, capped at 100
    pub cumulative_principal_loan_pct: f64,
}

#[derive(Debug, Default)]
struct YearTotals {
    principal_base: f64,
    extra: f64,
    interest: f64,
}

/// Bucket schedule rows by due-date calendar year, earliest years first,
/// keeping at most `max_bars` bars.
pub fn payment_mix_by_year(
    rows: &[AmortizationRow],
    loan_amount: f64,
    max_bars: usize,
) -> Vec<PaymentMixBar> {
    if rows.is_empty() {
        return Vec::new();
    }

    let mut yearly: BTreeMap<i32, YearTotals> = BTreeMap::new();
    for row in rows {
        let totals = yearly.entry(row.due_date.year()).or_default();
        totals.principal_base += row.principal_paid;
        totals.extra += row.extra_payment;
        totals.interest += row.interest_paid;
    }

    let original_loan = normalize_money(loan_amount).max(1e-6);
    let mut cumulative_principal = 0.0;

    yearly
        .into_iter()
        .take(max_bars)
        .map(|(year, totals)| {
            let principal_paid = totals.principal_base + totals.extra;
            let total_paid = principal_paid + totals.interest;
            let safe_total = total_paid.max(1e-6);
            cumulative_principal += principal_paid;

            PaymentMixBar {
                year,
                principal_paid: round_money(principal_paid),
                extra_paid: round_money(totals.extra),
                interest_paid: round_money(totals.interest),
                total_paid: round_money(total_paid),
                principal_pct: principal_paid / safe_total * 100.0,
                interest_pct: totals.interest / safe_total * 100.0,
                principal_loan_pct: principal_paid / original_loan * 100.0,
                cumulative_principal_loan_pct: (cumulative_principal / original_loan * 100.0)
                    .min(100.0),
            }
        })
        .collect()
}
