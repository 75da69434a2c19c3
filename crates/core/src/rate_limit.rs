//! Outcome of a sliding-window rate-limit check.

use serde::Serialize;

/// Default requests admitted per window.
pub const DEFAULT_LIMIT: u32 = 60;

/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Result of checking one request against the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests admitted per window.
    pub limit: u32,
    /// Requests still available in the current window.
    pub remaining: u32,
    /// Unix time (seconds) at which the oldest admitted request leaves the
    /// window and a slot frees up.
    pub reset: i64,
}

impl RateLimitDecision {
    /// Decision for a window holding `count` admitted requests, the oldest
    /// recorded at `oldest_ms`.
    pub fn from_window(
        count: u64,
        limit: u32,
        oldest_ms: Option<i64>,
        now_ms: i64,
        window_ms: i64,
    ) -> Self {
        let allowed = count <= u64::from(limit);
        let remaining = u64::from(limit).saturating_sub(count) as u32;
        let reset_ms = oldest_ms.unwrap_or(now_ms) + window_ms;
        Self {
            allowed,
            limit,
            remaining,
            reset: ceil_div(reset_ms, 1000),
        }
    }

    /// Fail-open decision used when the backing store is unavailable.
    pub fn allow_all(limit: u32, now_ms: i64, window_ms: i64) -> Self {
        Self {
            allowed: true,
            limit,
            remaining: limit,
            reset: ceil_div(now_ms + window_ms, 1000),
        }
    }

    /// Seconds until a slot frees up, never less than one.
    pub fn retry_after_secs(&self, now_secs: i64) -> u64 {
        (self.reset - now_secs).max(1) as u64
    }
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    (value + divisor - 1).div_euclid(divisor)
}
