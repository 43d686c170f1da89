//! Prepayment coaching heuristics
//!
//! Advisory layer over the schedule builder: ranks the months where an extra
//! payment has the largest effect, recommends a strategy and amount, and
//! projects the impact of paying that amount every month. Everything here is
//! best-effort; failures degrade to empty or neutral results instead of
//! propagating.

mod session;
mod summary;
mod tips;

pub use session::{CoachSession, RequestToken};
pub use summary::{CoachEngine, CoachSummary, PaymentPattern, TimingAdvice};
pub use tips::{prepayment_tips, ExtraTier, InterestPhase, PrepaymentTip};
