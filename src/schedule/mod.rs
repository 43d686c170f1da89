//! Schedule builder for month-by-month amortization

mod engine;
mod error;
mod rows;
mod state;

pub use engine::{monthly_payment, ScheduleEngine, ScheduleConfig, BALANCE_EPSILON, MAX_SCHEDULE_MONTHS};
pub use error::ScheduleError;
pub use rows::{AmortizationRow, ScheduleResult, ScheduleSummary};
pub use state::ScheduleState;
