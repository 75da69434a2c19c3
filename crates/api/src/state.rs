use std::sync::Arc;
use std::time::Duration;

use floodwatch_core::backoff::RetryPolicy;
use floodwatch_core::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use floodwatch_kv::{KvStore, ResponseCache, SlidingWindowLimiter};
use floodwatch_upstream::{FetchError, Providers, ResilientClient};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: floodwatch_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Backing store for the cache and rate limiter (Redis or in-memory).
    pub kv: Arc<dyn KvStore>,
    pub cache: ResponseCache,
    pub limiter: Arc<SlidingWindowLimiter>,
    /// Process-wide breaker guarding every upstream provider.
    pub breaker: Arc<CircuitBreaker>,
    pub providers: Arc<Providers>,
}

impl AppState {
    /// Wire the cache, limiter, breaker and provider clients from `config`.
    pub fn new(
        pool: floodwatch_db::DbPool,
        config: ServerConfig,
        kv: Arc<dyn KvStore>,
    ) -> Result<Self, FetchError> {
        let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: config.upstream.circuit_failure_threshold,
            reset_timeout: Duration::from_secs(config.upstream.circuit_reset_secs),
        }));
        let policy = RetryPolicy {
            max_retries: config.upstream.max_retries,
            base_delay: Duration::from_millis(config.upstream.retry_base_ms),
            ..RetryPolicy::default()
        };
        let http = ResilientClient::new(
            Arc::clone(&breaker),
            policy,
            Duration::from_secs(config.upstream.timeout_secs),
        )?
        .with_deadline(config.upstream_call_budget());
        let providers = Arc::new(Providers::new(http, config.providers.clone()));

        let cache = ResponseCache::new(Arc::clone(&kv), Duration::from_secs(config.cache_ttl_secs));
        let limiter = Arc::new(SlidingWindowLimiter::new(
            Arc::clone(&kv),
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
        ));

        Ok(Self {
            pool,
            config: Arc::new(config),
            kv,
            cache,
            limiter,
            breaker,
            providers,
        })
    }
}
