//! MortgageOS - Amortization and prepayment coaching engine for installment loans
//!
//! This library provides:
//! - Month-by-month amortization schedules with per-month commission fees
//! - Extra-payment semantics: reduce the term or reduce future installments
//! - Baseline vs planned scenario comparison with savings metrics
//! - Heuristic prepayment coaching (ranked months, strategy, projected impact)
//! - Per-year payment-mix aggregation for charting

pub mod money;
pub mod loan;
pub mod schedule;
pub mod scenario;
pub mod coach;
pub mod chart;

// Re-export commonly used types
pub use loan::{LoanTerms, CommissionTerms, CommissionMode, PrepaymentStrategy, ExtraPayment};
pub use schedule::{ScheduleEngine, ScheduleConfig, ScheduleResult, AmortizationRow, ScheduleError};
pub use scenario::{ScenarioRunner, ScenarioOutcome};
pub use coach::{CoachEngine, CoachSession, PrepaymentTip, CoachSummary};
