//! Sliding-window rate limiter keyed by client identity.
//!
//! Each admitted request is a timestamped entry in a per-identity sorted set.
//! Entries older than the window are trimmed on every check, so the count
//! always reflects the trailing `window` rather than fixed buckets.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use floodwatch_core::rate_limit::{RateLimitDecision, DEFAULT_LIMIT, DEFAULT_WINDOW_SECS};

use crate::store::KvStore;

const KEY_PREFIX: &str = "ratelimit:";

/// Per-identity request quota over a rolling window.
pub struct SlidingWindowLimiter {
    store: Arc<dyn KvStore>,
    limit: u32,
    window: Duration,
    /// Disambiguates entries recorded in the same millisecond.
    seq: AtomicU64,
    instance: String,
}

impl SlidingWindowLimiter {
    pub fn new(store: Arc<dyn KvStore>, limit: u32, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
            seq: AtomicU64::new(0),
            instance: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    /// Limiter with the default quota (60 requests per 60 seconds).
    pub fn with_defaults(store: Arc<dyn KvStore>) -> Self {
        Self::new(
            store,
            DEFAULT_LIMIT,
            Duration::from_secs(DEFAULT_WINDOW_SECS),
        )
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check and record one request for `identity` at the current time.
    pub async fn check(&self, identity: &str) -> RateLimitDecision {
        self.check_at(identity, chrono::Utc::now().timestamp_millis())
            .await
    }

    /// [`check`](Self::check) at an explicit Unix time in milliseconds.
    ///
    /// Denied requests are removed from the window again so a client that
    /// keeps retrying is not locked out beyond the window. If the store is
    /// unreachable the request is allowed.
    pub async fn check_at(&self, identity: &str, now_ms: i64) -> RateLimitDecision {
        let window_ms = self.window.as_millis() as i64;
        let key = format!("{KEY_PREFIX}{identity}");
        let member = format!(
            "{now_ms}-{}-{}",
            self.instance,
            self.seq.fetch_add(1, Ordering::Relaxed)
        );

        let snapshot = match self.store.window_hit(&key, &member, now_ms, window_ms).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    identity,
                    backend = self.store.backend(),
                    error = %e,
                    "Rate limit store unavailable, allowing request",
                );
                return RateLimitDecision::allow_all(self.limit, now_ms, window_ms);
            }
        };

        let decision = RateLimitDecision::from_window(
            snapshot.count,
            self.limit,
            snapshot.oldest_ms,
            now_ms,
            window_ms,
        );

        if !decision.allowed {
            tracing::debug!(identity, limit = self.limit, "Window full, dropping denied entry");
            if let Err(e) = self.store.window_forget(&key, &member).await {
                tracing::warn!(identity, error = %e, "Failed to drop denied rate-limit entry");
            }
        }

        decision
    }
}
