//! TTL response cache keyed by upstream request URL.
//!
//! The cache never fails a request: store errors and undecodable entries are
//! logged and treated as misses, and failed writes are dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::KvStore;

/// Default time-to-live for cached upstream payloads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Prefix applied to every cache key in the backing store.
const KEY_PREFIX: &str = "cache:";

/// Whether a value came from the cache or from the upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value for the `X-Cache` response header.
    pub fn as_header(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// JSON cache over a [`KvStore`].
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a cached value. Any failure reads as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = format!("{KEY_PREFIX}{key}");
        let raw = match self.store.get(&full_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Store a value with the default TTL.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        self.put_with_ttl(key, value, self.ttl).await;
    }

    /// Store a value with an explicit TTL. Failures are logged and ignored.
    pub async fn put_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        let full_key = format!("{KEY_PREFIX}{key}");
        if let Err(e) = self.store.set_ex(&full_key, &raw, ttl).await {
            tracing::warn!(key, error = %e, "Cache write failed");
        } else {
            tracing::debug!(key, ttl_secs = ttl.as_secs(), "Cached response");
        }
    }

    /// Drop a cached value. Failures are logged and ignored.
    pub async fn invalidate(&self, key: &str) {
        let full_key = format!("{KEY_PREFIX}{key}");
        if let Err(e) = self.store.delete(&full_key).await {
            tracing::warn!(key, error = %e, "Cache invalidation failed");
        }
    }

    /// Return the cached value for `key`, or run `fetch` and cache its
    /// successful result.
    ///
    /// Errors from `fetch` propagate unchanged and are never cached.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        fetch: F,
    ) -> Result<(T, CacheStatus), E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key).await {
            tracing::debug!(key, "Cache hit");
            return Ok((hit, CacheStatus::Hit));
        }

        let value = fetch().await?;
        self.put(key, &value).await;
        Ok((value, CacheStatus::Miss))
    }
}
