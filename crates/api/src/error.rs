use std::time::Duration;

use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use floodwatch_core::error::CoreError;
use floodwatch_upstream::FetchError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `floodwatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A third-party provider call failed.
    #[error(transparent)]
    Upstream(#[from] FetchError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

/// Status, machine-readable code, client-facing message and optional
/// `Retry-After` seconds for an error.
struct Classified {
    status: StatusCode,
    code: &'static str,
    message: String,
    retry_after_secs: Option<u64>,
}

impl Classified {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            retry_after_secs: None,
        }
    }

    fn retry_after(mut self, secs: u64) -> Self {
        self.retry_after_secs = Some(secs);
        self
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let classified = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => Classified::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    Classified::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => {
                    Classified::new(StatusCode::CONFLICT, "CONFLICT", msg.clone())
                }
                CoreError::RateLimited { retry_after_secs } => Classified::new(
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    "Too many requests, please try again later",
                )
                .retry_after(*retry_after_secs),
                CoreError::UpstreamUnavailable {
                    message,
                    retry_after,
                } => {
                    let classified = Classified::new(
                        StatusCode::SERVICE_UNAVAILABLE,
                        "UPSTREAM_UNAVAILABLE",
                        message.clone(),
                    );
                    match retry_after {
                        Some(d) => classified.retry_after(ceil_secs(*d)),
                        None => classified,
                    }
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    Classified::internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Upstream errors ---
            AppError::Upstream(err) => classify_fetch_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                Classified::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Classified::internal()
            }
        };

        let body = json!({
            "error": classified.message,
            "code": classified.code,
        });

        let mut response = (classified.status, axum::Json(body)).into_response();
        if let Some(secs) = classified.retry_after_secs {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Round a duration up to whole seconds, never below one.
fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    secs.max(1)
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Check constraint violations (constraint name starting with `ck_`) map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    match err {
        sqlx::Error::RowNotFound => {
            Classified::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // PostgreSQL unique constraint violation
                Some("23505") if constraint.starts_with("uq_") => Classified::new(
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                ),
                // PostgreSQL check constraint violation
                Some("23514") if constraint.starts_with("ck_") => Classified::new(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Value violates constraint: {constraint}"),
                ),
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    Classified::internal()
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            Classified::internal()
        }
    }
}

/// Classify an upstream failure.
///
/// - Open circuit or unconfigured provider maps to 503 (with `Retry-After`
///   for the circuit).
/// - Timeouts map to 504.
/// - Anything else the provider did wrong maps to 502.
fn classify_fetch_error(err: &FetchError) -> Classified {
    match err {
        FetchError::CircuitOpen { retry_after } => Classified::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "UPSTREAM_UNAVAILABLE",
            "Upstream service temporarily unavailable",
        )
        .retry_after(ceil_secs(*retry_after)),
        FetchError::NotConfigured(setting) => {
            tracing::warn!(setting, "Provider called without configuration");
            Classified::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "UPSTREAM_UNAVAILABLE",
                "Upstream service is not configured",
            )
        }
        FetchError::Timeout => Classified::new(
            StatusCode::GATEWAY_TIMEOUT,
            "UPSTREAM_TIMEOUT",
            "Upstream service did not respond in time",
        ),
        FetchError::Status { status, .. } => Classified::new(
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_ERROR",
            format!("Upstream service responded with HTTP {status}"),
        ),
        FetchError::InvalidContentType(_) | FetchError::Decode(_) | FetchError::Request(_) => {
            tracing::error!(error = %err, "Upstream request failed");
            Classified::new(
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Upstream service returned an invalid response",
            )
        }
    }
}
