//! Key-value backed edge infrastructure: the response cache and the
//! sliding-window rate limiter.
//!
//! Both sit on top of the [`KvStore`] trait so they share consistent state
//! across processes when backed by Redis, and fall back to an in-process
//! [`MemoryStore`] for single-node development and tests.

pub mod cache;
pub mod memory;
pub mod rate_limiter;
pub mod redis_store;
pub mod store;

pub use cache::ResponseCache;
pub use memory::MemoryStore;
pub use rate_limiter::SlidingWindowLimiter;
pub use redis_store::RedisStore;
pub use store::{KvStore, StoreError, WindowSnapshot};
