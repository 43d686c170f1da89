//! Error taxonomy for schedule computation

use thiserror::Error;

/// Fatal schedule computation failures.
///
/// Every variant aborts the whole computation; no partial schedule is ever
/// returned. Advisory layers (coaching) downgrade these to neutral results
/// instead of propagating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Input rejected before any iteration runs
    #[error("{0} must be greater than 0")]
    InvalidInput(&'static str),

    /// The payment does not cover a month's interest, so the loan never amortizes
    #[error("monthly payment is too low: it does not cover monthly interest, so the loan cannot be paid off")]
    PaymentTooLow,

    /// The amortization ran past the hard month cap
    #[error("schedule exceeded {0} months; increase the payment to finish the loan")]
    ScheduleExceeded(u32),
}
