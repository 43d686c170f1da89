//! Loan terms, commission configuration and the extra-payment list

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::money::{normalize_money, round_money};

/// Recurring fee mode layered on top of principal + interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommissionMode {
    /// No recurring fee
    None,
    /// Percent of the month's interest
    InterestRate,
    /// Percent of the month's starting balance
    BalanceRate,
    /// Fixed monthly amount, independent of balance and interest
    Fixed,
}

impl CommissionMode {
    /// Get the string representation matching the persisted record format
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionMode::None => "none",
            CommissionMode::InterestRate => "interestRate",
            CommissionMode::BalanceRate => "balanceRate",
            CommissionMode::Fixed => "fixed",
        }
    }

    /// Parse the persisted record representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(CommissionMode::None),
            "interestRate" => Some(CommissionMode::InterestRate),
            "balanceRate" => Some(CommissionMode::BalanceRate),
            "fixed" => Some(CommissionMode::Fixed),
            _ => None,
        }
    }
}

/// What an extra payment is meant to achieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrepaymentStrategy {
    /// Keep the payment, shorten the remaining term
    ReduceTime,
    /// Keep the term, lower the payment on future installments
    ReducePayment,
}

impl PrepaymentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrepaymentStrategy::ReduceTime => "reduceTime",
            PrepaymentStrategy::ReducePayment => "reducePayment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reduceTime" => Some(PrepaymentStrategy::ReduceTime),
            "reducePayment" => Some(PrepaymentStrategy::ReducePayment),
            _ => None,
        }
    }
}

/// One user-entered extra (prepayment) contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPayment {
    /// Unique identity within the list
    pub id: u32,

    /// Target schedule month (1-indexed)
    pub month: u32,

    /// Contribution amount
    pub amount: f64,

    /// How the contribution is applied
    pub strategy: PrepaymentStrategy,
}

/// Per-month aggregation of extra amounts, split by strategy
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtraPaymentBucket {
    pub reduce_time: f64,
    pub reduce_payment: f64,
}

impl ExtraPaymentBucket {
    /// Undifferentiated extra total for the month
    pub fn total(&self) -> f64 {
        self.reduce_time + self.reduce_payment
    }
}

/// Aggregate an extra-payment list into a month -> bucket map.
///
/// Months are clamped to >= 1, amounts normalized; non-positive amounts are
/// skipped. Lookup is by key only, so ordering does not matter.
pub fn build_extra_map(extras: &[ExtraPayment]) -> HashMap<u32, ExtraPaymentBucket> {
    let mut map: HashMap<u32, ExtraPaymentBucket> = HashMap::new();

    for extra in extras {
        let month = extra.month.max(1);
        let amount = normalize_money(extra.amount);
        if amount <= 0.0 {
            continue;
        }

        let bucket = map.entry(month).or_default();
        match extra.strategy {
            PrepaymentStrategy::ReducePayment => bucket.reduce_payment += amount,
            PrepaymentStrategy::ReduceTime => bucket.reduce_time += amount,
        }
    }

    map
}

/// Fold a suggested reduce-time extra into the list.
///
/// Amounts merge into an existing reduce-time extra for the same month;
/// otherwise a new entry is appended and `next_id` advances.
pub fn merge_reduce_time_extra(
    extras: &mut Vec<ExtraPayment>,
    month: u32,
    amount: f64,
    next_id: &mut u32,
) {
    let month = month.max(1);
    let amount = round_money(normalize_money(amount));
    if amount <= 0.0 {
        return;
    }

    let existing = extras
        .iter_mut()
        .find(|item| item.month == month && item.strategy == PrepaymentStrategy::ReduceTime);

    match existing {
        Some(item) => item.amount = round_money(item.amount + amount),
        None => {
            extras.push(ExtraPayment {
                id: *next_id,
                month,
                amount,
                strategy: PrepaymentStrategy::ReduceTime,
            });
            *next_id += 1;
        }
    }
}

/// Commission configuration for a loan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommissionTerms {
    pub mode: CommissionMode,

    /// Percentage applied in the rate-based modes
    pub rate_pct: f64,

    /// Amount charged in `Fixed` mode
    pub fixed_amount: f64,
}

impl CommissionTerms {
    /// Create commission terms, clamping rate and fixed amount to >= 0
    pub fn new(mode: CommissionMode, rate_pct: f64, fixed_amount: f64) -> Self {
        Self {
            mode,
            rate_pct: if rate_pct.is_finite() { rate_pct.max(0.0) } else { 0.0 },
            fixed_amount: normalize_money(fixed_amount),
        }
    }

    /// No commission at all
    pub fn none() -> Self {
        Self::new(CommissionMode::None, 0.0, 0.0)
    }

    /// Fee for one month, given the month's starting balance and interest
    pub fn monthly_amount(&self, starting_balance: f64, interest_paid: f64) -> f64 {
        let rate = self.rate_pct / 100.0;
        match self.mode {
            CommissionMode::InterestRate => interest_paid * rate,
            CommissionMode::BalanceRate => starting_balance * rate,
            CommissionMode::Fixed => self.fixed_amount,
            CommissionMode::None => 0.0,
        }
    }
}

/// Immutable loan parameters for one schedule run
#[derive(Debug, Clone, PartialEq)]
pub struct LoanTerms {
    /// Loan principal
    pub principal: f64,

    /// Annual nominal interest rate, in percent
    pub annual_rate_pct: f64,

    /// Initial term in months
    pub term_months: u32,

    /// Due date of the first installment
    pub first_payment_date: NaiveDate,

    /// Recurring fee configuration
    pub commission: CommissionTerms,
}

impl LoanTerms {
    /// Create loan terms with input clamps applied (principal >= 0,
    /// rate >= 0, term >= 1)
    pub fn new(
        principal: f64,
        annual_rate_pct: f64,
        term_months: u32,
        first_payment_date: NaiveDate,
        commission: CommissionTerms,
    ) -> Self {
        Self {
            principal: normalize_money(principal),
            annual_rate_pct: if annual_rate_pct.is_finite() {
                annual_rate_pct.max(0.0)
            } else {
                0.0
            },
            term_months: term_months.max(1),
            first_payment_date,
            commission,
        }
    }

    /// Monthly interest rate as a fraction (annual % / 100 / 12)
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_pct / 100.0 / 12.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extra(id: u32, month: u32, amount: f64, strategy: PrepaymentStrategy) -> ExtraPayment {
        ExtraPayment { id, month, amount, strategy }
    }

    #[test]
    fn test_build_extra_map_merges_same_month() {
        let extras = vec![
            extra(1, 3, 1000.0, PrepaymentStrategy::ReduceTime),
            extra(2, 3, 500.0, PrepaymentStrategy::ReducePayment),
            extra(3, 9, 250.0, PrepaymentStrategy::ReduceTime),
        ];

        let map = build_extra_map(&extras);
        assert_eq!(map.len(), 2);

        let month3 = map[&3];
        assert_eq!(month3.reduce_time, 1000.0);
        assert_eq!(month3.reduce_payment, 500.0);
        assert_eq!(month3.total(), 1500.0);
    }

    #[test]
    fn test_build_extra_map_skips_non_positive_amounts() {
        let extras = vec![
            extra(1, 3, 0.0, PrepaymentStrategy::ReduceTime),
            extra(2, 5, -100.0, PrepaymentStrategy::ReduceTime),
        ];

        assert!(build_extra_map(&extras).is_empty());
    }

    #[test]
    fn test_build_extra_map_clamps_month() {
        let extras = vec![extra(1, 0, 100.0, PrepaymentStrategy::ReduceTime)];
        let map = build_extra_map(&extras);
        assert_eq!(map[&1].reduce_time, 100.0);
    }

    #[test]
    fn test_merge_reduce_time_extra_folds_into_existing() {
        let mut extras = vec![extra(1, 3, 1000.0, PrepaymentStrategy::ReduceTime)];
        let mut next_id = 2;

        merge_reduce_time_extra(&mut extras, 3, 500.0, &mut next_id);
        assert_eq!(extras.len(), 1);
        assert_eq!(extras[0].amount, 1500.0);
        assert_eq!(next_id, 2);

        merge_reduce_time_extra(&mut extras, 7, 250.0, &mut next_id);
        assert_eq!(extras.len(), 2);
        assert_eq!(extras[1].id, 2);
        assert_eq!(next_id, 3);
    }

    #[test]
    fn test_commission_modes() {
        let balance = 100_000.0;
        let interest = 900.0;

        assert_eq!(CommissionTerms::none().monthly_amount(balance, interest), 0.0);

        let on_interest = CommissionTerms::new(CommissionMode::InterestRate, 4.0, 0.0);
        assert_eq!(on_interest.monthly_amount(balance, interest), 36.0);

        let on_balance = CommissionTerms::new(CommissionMode::BalanceRate, 0.1, 0.0);
        assert!((on_balance.monthly_amount(balance, interest) - 100.0).abs() < 1e-9);

        let fixed = CommissionTerms::new(CommissionMode::Fixed, 0.0, 25.0);
        assert_eq!(fixed.monthly_amount(balance, interest), 25.0);
        assert_eq!(fixed.monthly_amount(0.0, 0.0), 25.0);
    }

    #[test]
    fn test_commission_terms_clamp_negative_inputs() {
        let terms = CommissionTerms::new(CommissionMode::InterestRate, -5.0, -10.0);
        assert_eq!(terms.rate_pct, 0.0);
        assert_eq!(terms.fixed_amount, 0.0);
    }

    #[test]
    fn test_loan_terms_clamps() {
        let terms = LoanTerms::new(
            -1.0,
            -2.0,
            0,
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            CommissionTerms::none(),
        );
        assert_eq!(terms.principal, 0.0);
        assert_eq!(terms.annual_rate_pct, 0.0);
        assert_eq!(terms.term_months, 1);
    }

    #[test]
    fn test_monthly_rate() {
        let terms = LoanTerms::new(
            300_000.0,
            12.0,
            84,
            NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            CommissionTerms::none(),
        );
        assert!((terms.monthly_rate() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_mode_string_roundtrip() {
        for mode in [
            CommissionMode::None,
            CommissionMode::InterestRate,
            CommissionMode::BalanceRate,
            CommissionMode::Fixed,
        ] {
            assert_eq!(CommissionMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(CommissionMode::parse("bogus"), None);

        for strategy in [PrepaymentStrategy::ReduceTime, PrepaymentStrategy::ReducePayment] {
            assert_eq!(PrepaymentStrategy::parse(strategy.as_str()), Some(strategy));
        }
    }
}
