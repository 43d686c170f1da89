//! Core schedule builder: iterative month-by-month amortization

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::loan::{CommissionTerms, ExtraPaymentBucket};
use crate::money::round_money;
use super::error::ScheduleError;
use super::rows::{AmortizationRow, ScheduleResult, ScheduleSummary};
use super::state::ScheduleState;

/// Hard cap on schedule length, guarding against near-infinite amortization
/// when the payment barely exceeds the monthly interest
pub const MAX_SCHEDULE_MONTHS: u32 = 1200;

/// Balance at or below this is treated as fully paid off
pub const BALANCE_EPSILON: f64 = 1e-7;

/// Standard fixed-payment annuity formula, with a zero-rate fallback.
///
/// Caller guarantees non-negative inputs and `term_months >= 1`.
pub fn monthly_payment(principal: f64, monthly_rate: f64, term_months: u32) -> f64 {
    if monthly_rate == 0.0 {
        return principal / term_months as f64;
    }

    let growth = (1.0 + monthly_rate).powi(term_months as i32);
    principal * monthly_rate * growth / (growth - 1.0)
}

/// Configuration for one schedule run
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Loan principal at month 1
    pub principal: f64,

    /// Monthly interest rate as a fraction
    pub monthly_rate: f64,

    /// Initial scheduled monthly payment
    pub monthly_payment: f64,

    /// Original term; used only to re-derive the payment after a
    /// reduce-payment extra
    pub initial_term_months: u32,

    /// Due date of the first installment
    pub first_due_date: NaiveDate,

    /// Recurring fee configuration
    pub commission: CommissionTerms,

    /// Iteration cap; `MAX_SCHEDULE_MONTHS` unless a test narrows it
    pub max_months: u32,
}

/// Iterative amortization builder.
///
/// One pass per month: interest accrual, final-payment capping, extra
/// application, commission, balance roll-forward. The extra bucket's
/// reduce-payment share triggers a payment recomputation over the remaining
/// balance and remaining months.
pub struct ScheduleEngine {
    config: ScheduleConfig,
}

impl ScheduleEngine {
    /// Create a new engine for the given configuration
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    /// Build the full schedule, applying per-month extra-payment buckets.
    ///
    /// Fails with `PaymentTooLow` when the payment in force does not cover a
    /// month's interest, and with `ScheduleExceeded` past the month cap.
    /// Either failure discards the partial schedule.
    pub fn build(
        &self,
        extras: &HashMap<u32, ExtraPaymentBucket>,
    ) -> Result<ScheduleResult, ScheduleError> {
        let cfg = &self.config;
        let mut rows: Vec<AmortizationRow> = Vec::new();
        let mut state = ScheduleState::new(cfg.principal, cfg.monthly_payment, cfg.first_due_date);

        while state.balance > BALANCE_EPSILON {
            if state.month > cfg.max_months {
                return Err(ScheduleError::ScheduleExceeded(cfg.max_months));
            }

            let starting_balance = state.balance;
            let interest_paid = starting_balance * cfg.monthly_rate;

            if state.current_payment <= interest_paid + 1e-8 {
                return Err(ScheduleError::PaymentTooLow);
            }

            // Cap the final payment so the balance cannot go negative
            let scheduled_payment = state.current_payment.min(starting_balance + interest_paid);
            let principal_paid = scheduled_payment - interest_paid;

            let bucket = extras.get(&state.month).copied().unwrap_or_default();
            let raw_extra = bucket.total();

            // Extra is capped at what would zero the remaining balance
            let available_extra = (starting_balance - principal_paid).max(0.0);
            let extra_payment = raw_extra.min(available_extra);

            // Proportional attribution when a month mixes both strategies;
            // used only to decide whether the payment is recomputed below,
            // never to split the row's extra amount
            let applied_reduce_payment = if raw_extra > 0.0 {
                extra_payment * bucket.reduce_payment / raw_extra
            } else {
                0.0
            };

            let commission_paid = cfg.commission.monthly_amount(starting_balance, interest_paid);
            let total_payment_due = scheduled_payment + commission_paid;

            state.balance = (starting_balance - principal_paid - extra_payment).max(0.0);
            state.total_interest += interest_paid;
            state.total_commission += commission_paid;
            state.total_paid += total_payment_due + extra_payment;

            rows.push(AmortizationRow {
                month: state.month,
                due_date: state.due_date,
                starting_balance: round_money(starting_balance),
                base_payment: round_money(scheduled_payment),
                commission_paid: round_money(commission_paid),
                total_payment_due: round_money(total_payment_due),
                extra_payment: round_money(extra_payment),
                principal_paid: round_money(principal_paid),
                interest_paid: round_money(interest_paid),
                ending_balance: round_money(state.balance),
                cumulative_interest: round_money(state.total_interest),
                cumulative_interest_saved: 0.0,
            });

            // A reduce-payment extra lowers future installments instead of
            // shortening the term: re-derive the payment over the remaining
            // balance and remaining months
            if applied_reduce_payment > 0.0 && state.balance > BALANCE_EPSILON {
                let months_after_current = cfg.initial_term_months.saturating_sub(state.month).max(1);
                state.current_payment =
                    monthly_payment(state.balance, cfg.monthly_rate, months_after_current);
            }

            state.advance_month();
        }

        Ok(ScheduleResult {
            summary: ScheduleSummary {
                months: rows.len() as u32,
                total_interest: round_money(state.total_interest),
                total_commission: round_money(state.total_commission),
                total_paid: round_money(state.total_paid),
            },
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{build_extra_map, CommissionMode, ExtraPayment, PrepaymentStrategy};
    use approx::assert_relative_eq;

    fn first_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    fn config(principal: f64, monthly_rate: f64, term: u32) -> ScheduleConfig {
        ScheduleConfig {
            principal,
            monthly_rate,
            monthly_payment: monthly_payment(principal, monthly_rate, term),
            initial_term_months: term,
            first_due_date: first_due(),
            commission: CommissionTerms::none(),
            max_months: MAX_SCHEDULE_MONTHS,
        }
    }

    #[test]
    fn test_annuity_payment_formula() {
        // 300000 at 11% annual over 84 months
        let payment = monthly_payment(300_000.0, 11.0 / 100.0 / 12.0, 84);
        assert_relative_eq!(payment, 5136.73, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_payment_is_linear() {
        assert_relative_eq!(monthly_payment(12_000.0, 0.0, 12), 1000.0);
    }

    #[test]
    fn test_baseline_schedule_amortizes_to_zero() {
        let engine = ScheduleEngine::new(config(300_000.0, 11.0 / 100.0 / 12.0, 84));
        let result = engine.build(&HashMap::new()).unwrap();

        assert_eq!(result.rows.len(), 84);
        assert_eq!(result.summary.months, 84);
        assert!(result.rows.last().unwrap().ending_balance <= 1e-6);

        // With no commission, everything paid is principal plus interest
        assert_relative_eq!(
            result.summary.total_paid,
            300_000.0 + result.summary.total_interest,
            epsilon = 0.05
        );
    }

    #[test]
    fn test_balances_monotonic_and_chained() {
        let engine = ScheduleEngine::new(config(300_000.0, 11.0 / 100.0 / 12.0, 84));
        let result = engine.build(&HashMap::new()).unwrap();

        for pair in result.rows.windows(2) {
            assert!(pair[1].starting_balance <= pair[0].starting_balance);
            assert_eq!(pair[1].starting_balance, pair[0].ending_balance);
            assert!(pair[1].cumulative_interest >= pair[0].cumulative_interest);
        }
    }

    #[test]
    fn test_payment_too_low_fails() {
        // 2% monthly interest on 100000 is 2000; a 1999 payment never amortizes
        let cfg = ScheduleConfig {
            monthly_payment: 1999.0,
            ..config(100_000.0, 0.02, 12)
        };
        let engine = ScheduleEngine::new(cfg);
        assert_eq!(engine.build(&HashMap::new()), Err(ScheduleError::PaymentTooLow));
    }

    #[test]
    fn test_schedule_exceeded_fails() {
        // Payment a hair above interest takes well over 1200 months
        let cfg = ScheduleConfig {
            monthly_payment: 1000.001,
            ..config(100_000.0, 0.01, 12)
        };
        let engine = ScheduleEngine::new(cfg);
        assert_eq!(
            engine.build(&HashMap::new()),
            Err(ScheduleError::ScheduleExceeded(MAX_SCHEDULE_MONTHS))
        );
    }

    #[test]
    fn test_extra_capped_at_remaining_balance() {
        let extras = build_extra_map(&[ExtraPayment {
            id: 1,
            month: 1,
            amount: 10_000_000.0,
            strategy: PrepaymentStrategy::ReduceTime,
        }]);

        let engine = ScheduleEngine::new(config(300_000.0, 11.0 / 100.0 / 12.0, 84));
        let result = engine.build(&extras).unwrap();

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert!(row.extra_payment <= row.starting_balance - row.principal_paid + 0.01);
        assert_eq!(row.ending_balance, 0.0);
    }

    #[test]
    fn test_reduce_payment_lowers_future_installments() {
        let extras = build_extra_map(&[ExtraPayment {
            id: 1,
            month: 6,
            amount: 20_000.0,
            strategy: PrepaymentStrategy::ReducePayment,
        }]);

        let engine = ScheduleEngine::new(config(300_000.0, 11.0 / 100.0 / 12.0, 84));
        let baseline = engine.build(&HashMap::new()).unwrap();
        let planned = engine.build(&extras).unwrap();

        // Term is preserved, installments after month 6 drop
        assert_eq!(planned.rows.len(), baseline.rows.len());
        assert_eq!(planned.rows[5].base_payment, baseline.rows[5].base_payment);
        assert!(planned.rows[6].base_payment < baseline.rows[6].base_payment);
        assert!(planned.rows[40].base_payment < baseline.rows[40].base_payment);
    }

    #[test]
    fn test_reduce_time_shortens_schedule() {
        let extras = build_extra_map(&[ExtraPayment {
            id: 1,
            month: 6,
            amount: 20_000.0,
            strategy: PrepaymentStrategy::ReduceTime,
        }]);

        let engine = ScheduleEngine::new(config(300_000.0, 11.0 / 100.0 / 12.0, 84));
        let baseline = engine.build(&HashMap::new()).unwrap();
        let planned = engine.build(&extras).unwrap();

        assert!(planned.summary.months < baseline.summary.months);
        assert!(planned.summary.total_interest < baseline.summary.total_interest);
        // The payment itself is untouched
        assert_eq!(planned.rows[10].base_payment, baseline.rows[10].base_payment);
    }

    #[test]
    fn test_fixed_commission_constant_across_months() {
        let cfg = ScheduleConfig {
            commission: CommissionTerms::new(CommissionMode::Fixed, 0.0, 25.0),
            ..config(100_000.0, 0.01, 24)
        };
        let result = ScheduleEngine::new(cfg).build(&HashMap::new()).unwrap();

        assert!(result.rows.iter().all(|row| row.commission_paid == 25.0));
        assert_relative_eq!(
            result.summary.total_commission,
            25.0 * result.rows.len() as f64,
            epsilon = 0.01
        );
    }

    #[test]
    fn test_no_commission_yields_zero() {
        let engine = ScheduleEngine::new(config(100_000.0, 0.01, 24));
        let result = engine.build(&HashMap::new()).unwrap();

        assert!(result.rows.iter().all(|row| row.commission_paid == 0.0));
        assert_eq!(result.summary.total_commission, 0.0);
    }

    #[test]
    fn test_identical_inputs_identical_rows() {
        let engine = ScheduleEngine::new(config(300_000.0, 11.0 / 100.0 / 12.0, 84));
        let first = engine.build(&HashMap::new()).unwrap();
        let second = engine.build(&HashMap::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_due_dates_advance_monthly() {
        let engine = ScheduleEngine::new(config(12_000.0, 0.0, 12));
        let result = engine.build(&HashMap::new()).unwrap();

        assert_eq!(result.rows[0].due_date, first_due());
        assert_eq!(result.rows[1].due_date, NaiveDate::from_ymd_opt(2026, 4, 9).unwrap());
        assert_eq!(result.payoff_date(), NaiveDate::from_ymd_opt(2027, 2, 9));
    }
}
