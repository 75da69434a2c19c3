use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Alert routes mounted at `/alerts`.
///
/// ```text
/// GET    /                  -> list_alerts (?active_only=true)
/// POST   /                  -> create_alert
/// GET    /{id}              -> get_alert
/// PUT    /{id}              -> update_alert
/// DELETE /{id}              -> delete_alert
/// POST   /{id}/deactivate   -> deactivate_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_alerts).post(alerts::create_alert))
        .route(
            "/{id}",
            get(alerts::get_alert)
                .put(alerts::update_alert)
                .delete(alerts::delete_alert),
        )
        .route("/{id}/deactivate", post(alerts::deactivate_alert))
}
