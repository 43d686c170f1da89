//! Persisted application state: a flat JSON record loaded and saved as a whole
//!
//! The engine itself never touches storage; callers hand the record's fields
//! in as constructor input. Storage failures are swallowed: a missing or
//! corrupt record falls back to the built-in defaults, and save errors only
//! log a warning.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::data::{
    CommissionMode, CommissionTerms, ExtraPayment, LoanTerms, PrepaymentStrategy,
};
use crate::money::normalize_money;

/// UI language tag, persisted for the caller; the engine treats it as opaque
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLanguage {
    #[default]
    En,
    Ka,
}

/// One extra payment as persisted. `strategy` may be missing in records
/// written before per-extra strategies existed; the record-wide legacy
/// strategy fills it in on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedExtraPayment {
    #[serde(default)]
    pub id: u32,
    pub month: u32,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<PrepaymentStrategy>,
}

/// Flat record of everything persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub language: AppLanguage,
    pub loan_amount: f64,
    pub annual_interest_rate: f64,
    pub loan_term_months: u32,
    pub first_payment_date: NaiveDate,
    pub commission_mode: CommissionMode,

    /// Legacy record-wide strategy for extras that lack their own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prepayment_strategy: Option<PrepaymentStrategy>,

    pub commission_rate: f64,
    pub fixed_commission: f64,
    pub extra_payments: Vec<PersistedExtraPayment>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            language: AppLanguage::En,
            loan_amount: 300_000.0,
            annual_interest_rate: 11.0,
            loan_term_months: 84,
            first_payment_date: NaiveDate::from_ymd_opt(2026, 3, 9)
                .expect("default first payment date is valid"),
            commission_mode: CommissionMode::InterestRate,
            prepayment_strategy: None,
            commission_rate: 4.0,
            fixed_commission: 0.0,
            extra_payments: vec![
                PersistedExtraPayment {
                    id: 1,
                    month: 3,
                    amount: 17_059.17,
                    strategy: Some(PrepaymentStrategy::ReduceTime),
                },
                PersistedExtraPayment {
                    id: 2,
                    month: 9,
                    amount: 26_700.0,
                    strategy: Some(PrepaymentStrategy::ReduceTime),
                },
            ],
        }
    }
}

impl PersistedState {
    /// Loan terms with all monetary and range clamps applied
    pub fn loan_terms(&self) -> LoanTerms {
        LoanTerms::new(
            self.loan_amount,
            self.annual_interest_rate,
            self.loan_term_months.max(1),
            self.first_payment_date,
            CommissionTerms::new(self.commission_mode, self.commission_rate, self.fixed_commission),
        )
    }

    /// Extra payments with sanitized months and amounts, repaired ids, and
    /// the legacy record-wide strategy filled in where missing
    pub fn extra_payments(&self) -> Vec<ExtraPayment> {
        let legacy = self.prepayment_strategy.unwrap_or(PrepaymentStrategy::ReduceTime);

        self.extra_payments
            .iter()
            .enumerate()
            .map(|(index, item)| ExtraPayment {
                id: if item.id > 0 { item.id } else { index as u32 + 1 },
                month: item.month.max(1),
                amount: normalize_money(item.amount),
                strategy: item.strategy.unwrap_or(legacy),
            })
            .collect()
    }

    /// First id safe to hand out for a newly added extra payment
    pub fn next_extra_payment_id(&self) -> u32 {
        self.extra_payments().iter().map(|item| item.id).fold(1, u32::max) + 1
    }
}

/// Loads and saves the persisted record at a fixed path
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record, falling back to defaults on any failure
    pub fn load(&self) -> PersistedState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("unable to read state from {}: {err}", self.path.display());
                }
                return PersistedState::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(err) => {
                log::warn!("ignoring corrupt state at {}: {err}", self.path.display());
                PersistedState::default()
            }
        }
    }

    /// Write the whole record; failures are logged and otherwise ignored
    pub fn save(&self, state: &PersistedState) {
        let json = match serde_json::to_string_pretty(state) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("unable to serialize state: {err}");
                return;
            }
        };

        if let Err(err) = fs::write(&self.path, json) {
            log::warn!("unable to save state to {}: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mortgage_os_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let store = StateStore::new(temp_path("missing"));
        let state = store.load();
        assert_eq!(state, PersistedState::default());
        assert_eq!(state.loan_amount, 300_000.0);
        assert_eq!(state.extra_payments.len(), 2);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").unwrap();

        let state = StateStore::new(&path).load();
        assert_eq!(state, PersistedState::default());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_roundtrip_preserves_record() {
        let path = temp_path("roundtrip");
        let store = StateStore::new(&path);

        let mut state = PersistedState::default();
        state.language = AppLanguage::Ka;
        state.loan_amount = 150_000.0;
        state.commission_mode = CommissionMode::Fixed;
        state.fixed_commission = 12.5;

        store.save(&state);
        assert_eq!(store.load(), state);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let path = temp_path("partial");
        fs::write(&path, r#"{"loanAmount": 50000, "loanTermMonths": 24}"#).unwrap();

        let state = StateStore::new(&path).load();
        assert_eq!(state.loan_amount, 50_000.0);
        assert_eq!(state.loan_term_months, 24);
        // Untouched fields keep their defaults
        assert_eq!(state.annual_interest_rate, 11.0);
        assert_eq!(state.commission_mode, CommissionMode::InterestRate);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_legacy_strategy_applies_to_bare_extras() {
        let mut state = PersistedState::default();
        state.prepayment_strategy = Some(PrepaymentStrategy::ReducePayment);
        state.extra_payments = vec![
            PersistedExtraPayment { id: 0, month: 0, amount: -5.0, strategy: None },
            PersistedExtraPayment {
                id: 7,
                month: 9,
                amount: 100.0,
                strategy: Some(PrepaymentStrategy::ReduceTime),
            },
        ];

        let extras = state.extra_payments();
        // Repaired id, clamped month and amount, legacy strategy filled in
        assert_eq!(extras[0].id, 1);
        assert_eq!(extras[0].month, 1);
        assert_eq!(extras[0].amount, 0.0);
        assert_eq!(extras[0].strategy, PrepaymentStrategy::ReducePayment);
        // Explicit strategy survives
        assert_eq!(extras[1].strategy, PrepaymentStrategy::ReduceTime);

        assert_eq!(state.next_extra_payment_id(), 8);
    }

    #[test]
    fn test_loan_terms_sanitized() {
        let mut state = PersistedState::default();
        state.loan_amount = -10.0;
        state.annual_interest_rate = -3.0;
        state.loan_term_months = 0;

        let terms = state.loan_terms();
        assert_eq!(terms.principal, 0.0);
        assert_eq!(terms.annual_rate_pct, 0.0);
        assert_eq!(terms.term_months, 1);
    }
}
