use axum::extract::State;
use axum::{routing::get, Json, Router};
use floodwatch_core::circuit_breaker::CircuitState;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answers, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the cache / rate-limit store is reachable.
    pub kv_healthy: bool,
    /// `redis` or `memory`.
    pub kv_backend: &'static str,
    /// State of the upstream circuit breaker.
    pub circuit: CircuitState,
}

/// GET /health -- returns service, database, store and circuit health.
///
/// Always 200. Each dependency check is bounded so a hung database or
/// store reports unhealthy instead of running into the request timeout.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let budget = state.config.db_wait_budget();
    let (db, kv) = tokio::join!(
        tokio::time::timeout(budget, floodwatch_db::health_check(&state.pool)),
        tokio::time::timeout(budget, state.kv.ping()),
    );
    let db_healthy = matches!(db, Ok(Ok(())));
    let kv_healthy = matches!(kv, Ok(Ok(_)));
    if !db_healthy {
        tracing::warn!(timed_out = db.is_err(), "Database health check failed");
    }

    let status = if db_healthy && kv_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        kv_healthy,
        kv_backend: state.kv.backend(),
        circuit: state.breaker.state(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
