//! Refresh scheduling: a trailing-edge debounce deadline plus a monotonic
//! sequence guard so a superseded fetch can never overwrite a newer one.

use std::time::Duration;

use tokio::time::Instant;

/// Collapses rapid refresh triggers into one pending deadline. The newest
/// trigger wins; the widget loop fires one refresh when the deadline
/// passes.
#[derive(Debug, Default)]
pub struct RefreshScheduler {
    deadline: Option<Instant>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    pub fn cancel_pending(&mut self) -> Option<Instant> {
        self.deadline.take()
    }

    pub fn pending(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Monotonic issue/apply counter for refresh fetches. Responses resolve in
/// any order; only one newer than the last applied snapshot may render.
#[derive(Debug, Default)]
pub struct SeqGuard {
    issued: u64,
    applied: u64,
}

impl SeqGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn try_apply(&mut self, seq: u64) -> bool {
        if seq > self.applied {
            self.applied = seq;
            true
        } else {
            false
        }
    }

    pub fn last_applied(&self) -> u64 {
        self.applied
    }
}
