//! Telemetry for the refresh coordinator
//!
//! # Metrics
//!
//! - `token_refresh_attempts_total`: Counter of refresh calls issued
//! - `token_refresh_outcomes_total`: Counter of settled refreshes by outcome
//! - `token_refresh_duration_seconds`: Histogram of refresh call duration
//! - `token_refresh_waiters`: Histogram of callers settled per refresh cycle
//!
//! Without an installed recorder every call is a no-op.

use metrics::{histogram, increment_counter};
use std::time::Instant;

/// Metrics for a single refresh cycle.
///
/// Created by the leader when it starts a refresh and consumed when the
/// cycle settles, so each cycle is recorded at most once.
#[derive(Debug)]
pub struct RefreshMetrics {
    start: Instant,
}

impl RefreshMetrics {
    /// Records a refresh attempt and starts the duration clock.
    pub fn start() -> Self {
        increment_counter!("token_refresh_attempts_total");
        Self {
            start: Instant::now(),
        }
    }

    /// Records the cycle's outcome and the number of callers it settled.
    ///
    /// `outcome` is `"success"` or `"failure"`.
    pub fn finish(self, outcome: &'static str, waiters: usize) {
        histogram!(
            "token_refresh_duration_seconds",
            self.start.elapsed().as_secs_f64(),
            "outcome" => outcome
        );
        histogram!("token_refresh_waiters", waiters as f64);
        increment_counter!("token_refresh_outcomes_total", "outcome" => outcome);
    }
}
