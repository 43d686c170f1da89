//! Last-request-wins gating for deferred coach responses
//!
//! The coaching computation itself is synchronous and cheap; only the
//! delivery of its result is deferred. Each request takes a monotonically
//! increasing token at dispatch time, and a completion is delivered only if
//! its token is still the latest. Nothing in flight is cancelled.

use std::sync::atomic::{AtomicU64, Ordering};

/// Token identifying one coaching request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Issues request tokens and accepts only the latest request's result
#[derive(Debug, Default)]
pub struct CoachSession {
    latest: AtomicU64,
}

impl CoachSession {
    pub fn new() -> Self {
        Self { latest: AtomicU64::new(0) }
    }

    /// Start a new request; any earlier in-flight request becomes stale
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidate all in-flight requests without starting a new one
    /// (loan parameters changed, pending results must not land)
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether the token still identifies the latest request
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Deliver a completed result only if its request is still current
    pub fn deliver<T>(&self, token: RequestToken, value: T) -> Option<T> {
        if self.is_current(token) {
            Some(value)
        } else {
            None
        }
    }
}
