//! Per-client rate limiting for upstream-backed routes.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use floodwatch_core::error::CoreError;
use floodwatch_core::rate_limit::RateLimitDecision;

use crate::error::AppError;
use crate::state::AppState;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Identity used when no client address can be determined.
const ANONYMOUS: &str = "anonymous";

/// Resolve the client identity for rate limiting.
///
/// Order: first `X-Forwarded-For` entry, `X-Real-IP`, the socket peer
/// address, then `"anonymous"`. Header values that are not IP addresses are
/// ignored.
pub fn client_identity(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    if let Some(first) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
    {
        return first.to_string();
    }

    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
    {
        return real_ip.to_string();
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| ANONYMOUS.to_string())
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset));
}

/// Admit or reject a request against the shared sliding-window limiter.
///
/// Every response carries `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
/// `X-RateLimit-Reset`; rejected requests get a 429 with `Retry-After`.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let identity = client_identity(request.headers(), peer);

    let decision = state.limiter.check(&identity).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(
            client = %identity,
            path = %request.uri().path(),
            limit = decision.limit,
            "Rate limit exceeded",
        );
        let retry_after_secs = decision.retry_after_secs(chrono::Utc::now().timestamp());
        AppError::Core(CoreError::RateLimited { retry_after_secs }).into_response()
    };

    apply_headers(response.headers_mut(), &decision);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn prefers_first_forwarded_for_entry() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        let peer = Some("127.0.0.1".parse().unwrap());
        assert_eq!(client_identity(&h, peer), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_real_ip() {
        let h = headers(&[("x-real-ip", "198.51.100.2")]);
        assert_eq!(client_identity(&h, None), "198.51.100.2");
    }

    #[test]
    fn ignores_garbage_headers() {
        let h = headers(&[("x-forwarded-for", "not-an-ip"), ("x-real-ip", "")]);
        let peer = Some("192.0.2.1".parse().unwrap());
        assert_eq!(client_identity(&h, peer), "192.0.2.1");
    }

    #[test]
    fn ipv6_peer() {
        let peer = Some("2001:db8::1".parse().unwrap());
        assert_eq!(client_identity(&HeaderMap::new(), peer), "2001:db8::1");
    }

    #[test]
    fn anonymous_without_any_address() {
        assert_eq!(client_identity(&HeaderMap::new(), None), "anonymous");
    }
}
