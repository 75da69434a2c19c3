//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })`.

use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::Json;
use floodwatch_kv::cache::CacheStatus;
use serde::Serialize;

/// `X-Cache: HIT|MISS` on proxied responses.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": T, "source": ... }` for endpoints that may serve fallback data.
#[derive(Debug, Serialize)]
pub struct SourcedResponse<T: Serialize> {
    pub data: T,
    pub source: &'static str,
}

/// Wrap `data` in the envelope and tag it with its cache status.
pub fn cached<T: Serialize>(data: T, status: CacheStatus) -> Response {
    (
        [(X_CACHE, status.as_header())],
        Json(DataResponse { data }),
    )
        .into_response()
}
