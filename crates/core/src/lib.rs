//! Domain types and pure logic shared by every Floodwatch crate.
//!
//! Nothing in here performs I/O. The circuit breaker and retry policy are
//! driven by callers in `floodwatch-upstream`; the rate-limit decision is
//! produced by `floodwatch-kv`.

pub mod backoff;
pub mod circuit_breaker;
pub mod error;
pub mod flood;
pub mod geo;
pub mod rate_limit;
pub mod types;
pub mod validation;
