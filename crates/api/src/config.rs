use std::str::FromStr;
use std::time::Duration;

use floodwatch_core::circuit_breaker::{DEFAULT_FAILURE_THRESHOLD, DEFAULT_RESET_TIMEOUT};
use floodwatch_core::rate_limit::{DEFAULT_LIMIT, DEFAULT_WINDOW_SECS};
use floodwatch_upstream::{disaster, earthquake, weather, ProviderConfig};

/// Retry and circuit-breaker tuning for upstream calls.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// Per-attempt timeout in seconds (default: `10`).
    pub timeout_secs: u64,
    /// Retries after the first attempt (default: `3`).
    pub max_retries: u32,
    /// Backoff base delay in milliseconds (default: `500`).
    pub retry_base_ms: u64,
    /// Consecutive failed calls that open the circuit (default: `5`).
    pub circuit_failure_threshold: u32,
    /// Seconds the circuit stays open (default: `30`).
    pub circuit_reset_secs: u64,
    /// Bound on one call including retries and backoff (default: `12`).
    /// Capped by [`ServerConfig::upstream_call_budget`].
    pub call_budget_secs: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 3,
            retry_base_ms: 500,
            circuit_failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            circuit_reset_secs: DEFAULT_RESET_TIMEOUT.as_secs(),
            call_budget_secs: 12,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Seconds to wait for a pooled database connection (default: `5`).
    pub db_acquire_timeout_secs: u64,
    /// Redis URL for the shared rate limiter and cache. In-memory when unset.
    pub redis_url: Option<String>,
    /// Requests admitted per client per window (default: `60`).
    pub rate_limit_max: u32,
    /// Rate limit window in seconds (default: `60`).
    pub rate_limit_window_secs: u64,
    /// Upstream response cache TTL in seconds (default: `300`).
    pub cache_ttl_secs: u64,
    pub upstream: UpstreamSettings,
    pub providers: ProviderConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                                   |
    /// |-----------------------------|-------------------------------------------|
    /// | `HOST`                      | `0.0.0.0`                                 |
    /// | `PORT`                      | `3000`                                    |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`                   |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                                      |
    /// | `DB_ACQUIRE_TIMEOUT_SECS`   | `5`                                       |
    /// | `REDIS_URL`                 | unset (in-memory store)                   |
    /// | `RATE_LIMIT_MAX`            | `60`                                      |
    /// | `RATE_LIMIT_WINDOW_SECS`    | `60`                                      |
    /// | `CACHE_TTL_SECS`            | `300`                                     |
    /// | `UPSTREAM_TIMEOUT_SECS`     | `10`                                      |
    /// | `UPSTREAM_MAX_RETRIES`      | `3`                                       |
    /// | `UPSTREAM_RETRY_BASE_MS`    | `500`                                     |
    /// | `CIRCUIT_FAILURE_THRESHOLD` | `5`                                       |
    /// | `CIRCUIT_RESET_SECS`        | `30`                                      |
    /// | `UPSTREAM_CALL_BUDGET_SECS` | `12`                                      |
    /// | `OPENWEATHER_API_KEY`       | unset (weather uses Open-Meteo)           |
    /// | `OPENWEATHER_BASE_URL`      | `https://api.openweathermap.org`          |
    /// | `OPEN_METEO_BASE_URL`       | `https://api.open-meteo.com`              |
    /// | `EARTHQUAKE_FEED_URL`       | `https://data.bmkg.go.id/DataMKG/TEWS`    |
    /// | `DISASTER_REPORTS_URL`      | `https://data.petabencana.id/reports`     |
    /// | `WATER_LEVEL_API_URL`       | unset (endpoint answers 503)              |
    ///
    /// Panics on unparsable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_parse("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let upstream = UpstreamSettings {
            timeout_secs: env_parse("UPSTREAM_TIMEOUT_SECS", 10),
            max_retries: env_parse("UPSTREAM_MAX_RETRIES", 3),
            retry_base_ms: env_parse("UPSTREAM_RETRY_BASE_MS", 500),
            circuit_failure_threshold: env_parse(
                "CIRCUIT_FAILURE_THRESHOLD",
                DEFAULT_FAILURE_THRESHOLD,
            ),
            circuit_reset_secs: env_parse("CIRCUIT_RESET_SECS", DEFAULT_RESET_TIMEOUT.as_secs()),
            call_budget_secs: env_parse("UPSTREAM_CALL_BUDGET_SECS", 12),
        };

        let providers = ProviderConfig {
            openweather_api_key: env_opt("OPENWEATHER_API_KEY"),
            openweather_base_url: env_or(
                "OPENWEATHER_BASE_URL",
                weather::DEFAULT_OPENWEATHER_BASE_URL,
            ),
            open_meteo_base_url: env_or("OPEN_METEO_BASE_URL", weather::DEFAULT_OPEN_METEO_BASE_URL),
            earthquake_feed_url: env_or("EARTHQUAKE_FEED_URL", earthquake::DEFAULT_FEED_URL),
            disaster_reports_url: env_or("DISASTER_REPORTS_URL", disaster::DEFAULT_REPORTS_URL),
            water_level_api_url: env_opt("WATER_LEVEL_API_URL"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            db_acquire_timeout_secs: env_parse("DB_ACQUIRE_TIMEOUT_SECS", 5),
            redis_url: env_opt("REDIS_URL"),
            rate_limit_max: env_parse("RATE_LIMIT_MAX", DEFAULT_LIMIT),
            rate_limit_window_secs: env_parse("RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW_SECS),
            cache_ttl_secs: env_parse("CACHE_TTL_SECS", 300),
            upstream,
            providers,
        }
    }

    /// Share of the request timeout any single dependency may consume
    /// before the handler gives up on it and degrades.
    fn dependency_share(&self) -> Duration {
        Duration::from_millis(self.request_timeout_secs.saturating_mul(400))
    }

    /// Deadline for one upstream call, retries included.
    ///
    /// `UPSTREAM_CALL_BUDGET_SECS`, capped at 40% of the request timeout.
    /// Weather may make two sequential calls, and both must finish (and be
    /// recorded by the circuit breaker) before the request itself times out.
    pub fn upstream_call_budget(&self) -> Duration {
        Duration::from_secs(self.upstream.call_budget_secs).min(self.dependency_share())
    }

    /// How long a handler waits on the database before falling back.
    ///
    /// `DB_ACQUIRE_TIMEOUT_SECS`, capped at 40% of the request timeout.
    pub fn db_wait_budget(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs).min(self.dependency_share())
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid {}: {e}", std::any::type_name::<T>())),
        None => default,
    }
}
