//! Route definitions for the upstream proxy endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::proxy;
use crate::state::AppState;

/// Proxy routes mounted at `/api/v1`.
///
/// ```text
/// GET    /water-level            -> get_water_level
/// GET    /weather                -> get_weather
/// GET    /air-quality            -> get_air_quality
/// GET    /earthquakes/latest     -> get_latest_earthquake
/// GET    /earthquakes/felt       -> get_felt_earthquakes
/// GET    /disaster-reports       -> get_disaster_reports
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/water-level", get(proxy::get_water_level))
        .route("/weather", get(proxy::get_weather))
        .route("/air-quality", get(proxy::get_air_quality))
        .route("/earthquakes/latest", get(proxy::get_latest_earthquake))
        .route("/earthquakes/felt", get(proxy::get_felt_earthquakes))
        .route("/disaster-reports", get(proxy::get_disaster_reports))
}
