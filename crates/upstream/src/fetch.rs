//! Resilient JSON-over-HTTP client shared by every provider.
//!
//! Each call goes through three guards:
//!
//! 1. The process-wide [`CircuitBreaker`]: while it is open the call fails
//!    immediately without network I/O.
//! 2. Retry with exponential backoff on transport errors, 429 and 5xx.
//! 3. `Content-Type` validation: anything that is not JSON is rejected
//!    (typically an HTML error page from a proxy).
//!
//! Breaker accounting happens once per call, after retries: success resets
//! the counter, exhausted retryable failures, invalid content types and
//! undecodable bodies count as failures. Non-retryable 4xx responses say
//! nothing about upstream health and are not counted.
//!
//! The whole call, retries and backoff included, is bounded by a deadline.
//! Running out of it is a [`FetchError::Timeout`] and counts as a failure,
//! so a hanging upstream still trips the breaker. The deadline must be
//! shorter than any outer request timeout or the call is dropped before
//! its outcome is recorded.

use std::sync::Arc;
use std::time::Duration;

use floodwatch_core::backoff::{parse_retry_after, RetryPolicy};
use floodwatch_core::circuit_breaker::CircuitBreaker;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default bound on a whole call, retries included.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(20);

const USER_AGENT: &str = concat!("floodwatch/", env!("CARGO_PKG_VERSION"));

/// Upper bound on how much of an error body is kept for diagnostics.
const MAX_ERROR_BODY: usize = 512;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from an upstream call.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The circuit breaker is open; no request was sent.
    #[error("Circuit breaker open, retry in {}s", retry_after.as_secs())]
    CircuitOpen { retry_after: Duration },

    /// The upstream answered with a non-2xx status.
    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The upstream answered 2xx with a non-JSON body.
    #[error("Unexpected content type: {0}")]
    InvalidContentType(String),

    /// The request did not complete within the timeout.
    #[error("Upstream request timed out")]
    Timeout,

    /// Transport-level failure (DNS, connect, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The JSON body did not match the expected shape.
    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    /// The provider needs configuration (e.g. an API key) that is missing.
    #[error("Provider not configured: {0}")]
    NotConfigured(&'static str),
}

impl FetchError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(err)
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            FetchError::Timeout | FetchError::Request(_) => true,
            _ => false,
        }
    }

    /// Whether this outcome should count against the circuit breaker.
    pub fn counts_as_failure(&self) -> bool {
        match self {
            FetchError::CircuitOpen { .. } | FetchError::NotConfigured(_) => false,
            FetchError::Status { .. } => self.is_retryable(),
            FetchError::InvalidContentType(_)
            | FetchError::Timeout
            | FetchError::Request(_)
            | FetchError::Decode(_) => true,
        }
    }
}

/// A failed attempt plus the server's `Retry-After` hint, if any.
struct AttemptError {
    error: FetchError,
    retry_after: Option<Duration>,
}

impl From<FetchError> for AttemptError {
    fn from(error: FetchError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ResilientClient
// ---------------------------------------------------------------------------

/// HTTP client wrapping every GET in retry, content-type validation and the
/// shared circuit breaker. Cheap to clone.
#[derive(Clone)]
pub struct ResilientClient {
    client: reqwest::Client,
    breaker: Arc<CircuitBreaker>,
    policy: RetryPolicy,
    deadline: Duration,
}

impl ResilientClient {
    /// Build a client with its own connection pool.
    pub fn new(
        breaker: Arc<CircuitBreaker>,
        policy: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Request)?;
        Ok(Self::with_client(client, breaker, policy))
    }

    /// Reuse an existing [`reqwest::Client`] (shares its connection pool).
    pub fn with_client(
        client: reqwest::Client,
        breaker: Arc<CircuitBreaker>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            breaker,
            policy,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Bound every call, retries and backoff included, by `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// GET `url` with `query` appended and return the JSON body as-is.
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, FetchError> {
        self.get_json_as(url, query).await
    }

    /// GET `url` with `query` appended and decode the JSON body into `T`.
    pub async fn get_json_as<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        if let Err(open) = self.breaker.check() {
            tracing::warn!(
                url,
                retry_after_ms = open.retry_after.as_millis() as u64,
                "Circuit open, skipping upstream call",
            );
            return Err(FetchError::CircuitOpen {
                retry_after: open.retry_after,
            });
        }

        let result = tokio::time::timeout(self.deadline, self.get_with_retry(url, query))
            .await
            .unwrap_or_else(|_| {
                tracing::warn!(
                    url,
                    deadline_ms = self.deadline.as_millis() as u64,
                    "Upstream call exceeded its deadline",
                );
                Err(FetchError::Timeout)
            })
            .and_then(|body| {
                serde_json::from_slice::<T>(&body).map_err(|e| FetchError::Decode(e.to_string()))
            });

        match &result {
            Ok(_) => self.breaker.record_success(),
            Err(e) if e.counts_as_failure() => {
                self.breaker.record_failure();
                tracing::error!(url, error = %e, state = ?self.breaker.state(), "Upstream call failed");
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "Upstream call rejected");
            }
        }

        result
    }

    async fn get_with_retry(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, FetchError> {
        let started = tokio::time::Instant::now();
        let mut attempt = 0u32;
        loop {
            match self.attempt(url, query).await {
                Ok(body) => return Ok(body),
                Err(failed) if failed.error.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = self.policy.delay_with_hint(attempt, failed.retry_after);
                    // No point sleeping past the deadline.
                    if started.elapsed() + delay >= self.deadline {
                        tracing::warn!(
                            url,
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            error = %failed.error,
                            "Retry would exceed the call deadline, giving up",
                        );
                        return Err(failed.error);
                    }
                    tracing::warn!(
                        url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %failed.error,
                        "Upstream attempt failed, retrying",
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failed) => return Err(failed.error),
            }
        }
    }

    /// Execute a single GET and validate status and content type.
    async fn attempt(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, AttemptError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let mut body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(AttemptError {
                error: FetchError::Status {
                    status: status.as_u16(),
                    body,
                },
                retry_after,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_json_content_type(&content_type) {
            return Err(FetchError::InvalidContentType(if content_type.is_empty() {
                "<missing>".to_string()
            } else {
                content_type
            })
            .into());
        }

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;
        Ok(body.to_vec())
    }
}

/// Accepts `application/json` and structured-syntax `+json` types
/// (e.g. `application/geo+json`), with or without parameters.
pub fn is_json_content_type(value: &str) -> bool {
    let essence = value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
