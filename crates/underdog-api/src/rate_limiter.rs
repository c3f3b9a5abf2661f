//! Request rate limiting for API-Football.
//!
//! Sliding window: at most `max_requests` in any trailing window. There is no
//! burst allowance beyond the window budget.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};
use underdog_telemetry::Metrics;

/// Extra delay added to a computed wait so the oldest request has
/// definitely left the window when we re-check.
const SAFETY_MARGIN: Duration = Duration::from_millis(100);

/// Sliding-window rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum requests per window.
    max_requests: u32,
    /// Window length.
    window: Duration,
    /// Instants of requests inside the window, oldest first.
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter.
    ///
    /// # Arguments
    /// * `max_requests` - Maximum requests per window (at least 1)
    /// * `window_secs` - Window size in seconds
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        let max_requests = max_requests.max(1);
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            timestamps: Mutex::new(VecDeque::with_capacity(max_requests as usize)),
        }
    }

    /// Limiter with a rolling one-minute window.
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, 60)
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Record a request if the window has room, otherwise return how long
    /// to wait before trying again. Never blocks.
    pub fn try_reserve(&self) -> Result<(), Duration> {
        let now = Instant::now();
        let mut timestamps = self.timestamps.lock();
        Self::cleanup(&mut timestamps, now, self.window);

        if timestamps.len() < self.max_requests as usize {
            timestamps.push_back(now);
            return Ok(());
        }

        let oldest = timestamps.front().copied().unwrap_or(now);
        let age = now.saturating_duration_since(oldest);
        Err(self.window.saturating_sub(age) + SAFETY_MARGIN)
    }

    /// Wait until a request can be issued, then record it.
    ///
    /// Returns the total time spent waiting. The lock is never held across
    /// the sleep.
    pub async fn acquire(&self) -> Duration {
        let mut waited = Duration::ZERO;
        loop {
            match self.try_reserve() {
                Ok(()) => return waited,
                Err(wait) => {
                    warn!(
                        wait_ms = wait.as_millis() as u64,
                        max = self.max_requests,
                        "Rate limit reached, waiting"
                    );
                    Metrics::rate_limit_wait("api", wait.as_secs_f64() * 1000.0);
                    tokio::time::sleep(wait).await;
                    waited += wait;
                }
            }
        }
    }

    /// Requests recorded in the current window.
    pub fn current_count(&self) -> u32 {
        let mut timestamps = self.timestamps.lock();
        Self::cleanup(&mut timestamps, Instant::now(), self.window);
        timestamps.len() as u32
    }

    /// Requests that can still be issued without waiting.
    pub fn remaining_capacity(&self) -> u32 {
        self.max_requests.saturating_sub(self.current_count())
    }

    /// Forget all recorded requests.
    pub fn reset(&self) {
        self.timestamps.lock().clear();
        debug!("Rate limiter reset");
    }

    fn cleanup(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while timestamps
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= window)
        {
            timestamps.pop_front();
        }
    }
}
