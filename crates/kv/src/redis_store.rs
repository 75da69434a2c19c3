//! Redis-backed [`KvStore`] shared by every API instance.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::store::{KvStore, StoreError, WindowSnapshot};

/// Redis client with automatic reconnection.
///
/// [`ConnectionManager`] is cheap to clone and multiplexes commands over a
/// single connection, so each operation works on its own clone.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis. Supports both `redis://` and `rediss://` URLs.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry.
        let secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, secs).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn window_hit(
        &self,
        key: &str,
        member: &str,
        now_ms: i64,
        window_ms: i64,
    ) -> Result<WindowSnapshot, StoreError> {
        let mut conn = self.conn.clone();
        let cutoff = now_ms - window_ms;

        // MULTI/EXEC so concurrent requests from other instances observe a
        // consistent window.
        let (count, oldest): (u64, Vec<(String, f64)>) = redis::pipe()
            .atomic()
            .zrembyscore(key, "-inf", cutoff)
            .ignore()
            .zadd(key, member, now_ms)
            .ignore()
            .zcard(key)
            .zrange_withscores(key, 0, 0)
            .pexpire(key, window_ms)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(WindowSnapshot {
            count,
            oldest_ms: oldest.first().map(|(_, score)| *score as i64),
        })
    }

    async fn window_forget(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.zrem(key, member).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Protocol(format!("unexpected PING reply: {reply}")))
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests require a running Redis instance.
    // Run with: REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored

    async fn connect() -> RedisStore {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        RedisStore::connect(&url).await.unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn set_get_delete() {
        let store = connect().await;
        let key = format!("test:kv:{}", uuid::Uuid::new_v4());

        store.set_ex(&key, "hello", Duration::from_secs(30)).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("hello"));

        store.delete(&key).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn sliding_window_counts_and_trims() {
        let store = connect().await;
        let key = format!("test:window:{}", uuid::Uuid::new_v4());

        store.window_hit(&key, "a", 1_000, 60_000).await.unwrap();
        store.window_hit(&key, "b", 30_000, 60_000).await.unwrap();
        let snap = store.window_hit(&key, "c", 61_000, 60_000).await.unwrap();

        assert_eq!(snap.count, 2);
        assert_eq!(snap.oldest_ms, Some(30_000));

        store.window_forget(&key, "c").await.unwrap();
        let snap = store.window_hit(&key, "d", 62_000, 60_000).await.unwrap();
        assert_eq!(snap.count, 2);

        store.delete(&key).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn ping_succeeds() {
        connect().await.ping().await.unwrap();
    }
}
