//! Backing-store abstraction shared by the cache and the rate limiter.

use std::time::Duration;

use async_trait::async_trait;

/// Errors from a key-value backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The Redis command or connection failed.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The backend returned data in an unexpected shape.
    #[error("Unexpected store response: {0}")]
    Protocol(String),
}

/// State of one sliding window after recording a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Entries inside the window, including the hit just recorded.
    pub count: u64,
    /// Timestamp (ms) of the oldest entry still inside the window.
    pub oldest_ms: Option<i64>,
}

/// Minimal set of atomic operations the edge layer needs from a store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a string value. Expired keys read as `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a string value that expires after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Record `member` at `now_ms` in the window stored under `key`.
    ///
    /// Atomically drops entries at or before `now_ms - window_ms`, inserts the
    /// new entry, counts what remains and refreshes the key's expiry to the
    /// window length.
    async fn window_hit(
        &self,
        key: &str,
        member: &str,
        now_ms: i64,
        window_ms: i64,
    ) -> Result<WindowSnapshot, StoreError>;

    /// Remove a single entry previously recorded with [`window_hit`](Self::window_hit).
    async fn window_forget(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}
