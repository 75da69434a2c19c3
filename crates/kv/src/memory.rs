//! In-process [`KvStore`] used when no Redis URL is configured.
//!
//! State is only consistent within a single process. Expiry uses
//! [`tokio::time::Instant`], so tests can drive it with paused time.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::store::{KvStore, StoreError, WindowSnapshot};

/// Map size above which expired keys are swept on write.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug)]
struct Value {
    data: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Window {
    /// `(timestamp_ms, member)` pairs in insertion order.
    entries: Vec<(i64, String)>,
    expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct State {
    values: HashMap<String, Value>,
    windows: HashMap<String, Window>,
}

impl State {
    fn sweep(&mut self, now: Instant) {
        if self.values.len() > SWEEP_THRESHOLD {
            self.values.retain(|_, v| v.expires_at > now);
        }
        if self.windows.len() > SWEEP_THRESHOLD {
            self.windows
                .retain(|_, w| w.expires_at.is_none_or(|at| at > now));
        }
    }
}

/// Mutex-guarded hash maps emulating the Redis commands the edge layer uses.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        match state.values.get(key) {
            Some(v) if v.expires_at > now => Ok(Some(v.data.clone())),
            Some(_) => {
                state.values.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        state.sweep(now);
        state.values.insert(
            key.to_string(),
            Value {
                data: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.values.remove(key);
        state.windows.remove(key);
        Ok(())
    }

    async fn window_hit(
        &self,
        key: &str,
        member: &str,
        now_ms: i64,
        window_ms: i64,
    ) -> Result<WindowSnapshot, StoreError> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        state.sweep(now);

        let window = state.windows.entry(key.to_string()).or_default();
        if window.expires_at.is_some_and(|at| at <= now) {
            window.entries.clear();
        }

        let cutoff = now_ms - window_ms;
        window.entries.retain(|(ts, _)| *ts > cutoff);
        window.entries.push((now_ms, member.to_string()));
        window.expires_at = Some(now + Duration::from_millis(window_ms.max(0) as u64));

        Ok(WindowSnapshot {
            count: window.entries.len() as u64,
            oldest_ms: window.entries.iter().map(|(ts, _)| *ts).min(),
        })
    }

    async fn window_forget(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if let Some(window) = state.windows.get_mut(key) {
            window.entries.retain(|(_, m)| m != member);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
