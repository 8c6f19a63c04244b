//! Idle detection
//!
//! Tracks when the last label cleared the confidence gate. The runtime polls
//! [`IdleTimer::is_idle`] on a fixed period while capturing.

use std::time::Duration;

use tokio::time::Instant;

/// Idle tracker for separator insertion
#[derive(Debug, Clone)]
pub struct IdleTimer {
    timeout: Duration,
    last_accepted: Instant,
}

impl IdleTimer {
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            last_accepted: now,
        }
    }

    /// Record a gated label at `now`
    pub fn touch(&mut self, now: Instant) {
        self.last_accepted = now;
    }

    /// Restart the idle span at a session boundary
    pub fn reset(&mut self, now: Instant) {
        self.last_accepted = now;
    }

    /// Strictly more than `timeout` has passed since the last gated label
    pub fn is_idle(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_accepted) > self.timeout
    }
}
