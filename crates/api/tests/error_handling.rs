//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values and need neither
//! a server nor a database.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use floodwatch_api::error::AppError;
use floodwatch_core::error::CoreError;
use floodwatch_upstream::FetchError;
use http_body_util::BodyExt;

/// Helper: convert an `AppError` into its status, `Retry-After` and JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, Option<String>, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let retry_after = response
        .headers()
        .get("retry-after")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, retry_after, json)
}

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "FloodReport",
        id: 42,
    });

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "FloodReport with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("latitude out of range".into()));

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "latitude out of range");
}

#[tokio::test]
async fn rate_limited_returns_429_with_retry_after() {
    let err = AppError::Core(CoreError::RateLimited {
        retry_after_secs: 17,
    });

    let (status, retry_after, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(retry_after.as_deref(), Some("17"));
    assert_eq!(json["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("redis password is hunter2".into());

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(
        !json.to_string().contains("hunter2"),
        "Internal error response must not leak sensitive details"
    );
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("expires_at must be later than issued_at".into());

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Upstream errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn open_circuit_returns_503_with_rounded_up_retry_after() {
    let err = AppError::Upstream(FetchError::CircuitOpen {
        retry_after: Duration::from_millis(4_200),
    });

    let (status, retry_after, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(retry_after.as_deref(), Some("5"));
    assert_eq!(json["code"], "UPSTREAM_UNAVAILABLE");
}

#[tokio::test]
async fn upstream_timeout_returns_504() {
    let (status, _, json) = error_to_response(AppError::Upstream(FetchError::Timeout)).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["code"], "UPSTREAM_TIMEOUT");
}

#[tokio::test]
async fn upstream_status_returns_502_without_leaking_body() {
    let err = AppError::Upstream(FetchError::Status {
        status: 500,
        body: "stack trace at provider.internal:8080".into(),
    });

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert_eq!(json["error"], "Upstream service responded with HTTP 500");
    assert!(!json.to_string().contains("provider.internal"));
}

#[tokio::test]
async fn unexpected_content_type_returns_502() {
    let err = AppError::Upstream(FetchError::InvalidContentType("text/html".into()));

    let (status, _, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
}
