use axum::routing::get;
use axum::Router;

use crate::handlers::shelters;
use crate::state::AppState;

/// Shelter routes mounted at `/shelters`.
///
/// ```text
/// GET    /                  -> list_shelters (nearby, mock fallback)
/// POST   /                  -> create_shelter
/// GET    /all               -> list_all_shelters
/// GET    /{id}              -> get_shelter
/// PUT    /{id}              -> update_shelter
/// DELETE /{id}              -> delete_shelter
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(shelters::list_shelters).post(shelters::create_shelter),
        )
        .route("/all", get(shelters::list_all_shelters))
        .route(
            "/{id}",
            get(shelters::get_shelter)
                .put(shelters::update_shelter)
                .delete(shelters::delete_shelter),
        )
}
