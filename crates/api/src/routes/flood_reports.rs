use axum::handler::Handler;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, put};
use axum::Router;

use crate::handlers::flood_reports;
use crate::middleware::rate_limit::enforce_rate_limit;
use crate::state::AppState;

/// Flood report routes mounted at `/flood-reports`.
///
/// ```text
/// GET    /                  -> list_reports
/// POST   /                  -> create_report (rate limited)
/// GET    /{id}              -> get_report
/// PUT    /{id}              -> update_report
/// DELETE /{id}              -> delete_report
/// PUT    /{id}/status       -> update_report_status
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    let create = flood_reports::create_report
        .layer(from_fn_with_state(state.clone(), enforce_rate_limit));

    Router::new()
        .route("/", get(flood_reports::list_reports).post(create))
        .route(
            "/{id}",
            get(flood_reports::get_report)
                .put(flood_reports::update_report)
                .delete(flood_reports::delete_report),
        )
        .route("/{id}/status", put(flood_reports::update_report_status))
}
