pub mod alerts;
pub mod flood_reports;
pub mod health;
pub mod proxy;
pub mod shelters;

use axum::middleware::from_fn_with_state;
use axum::Router;

use crate::middleware::rate_limit::enforce_rate_limit;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /water-level                     upstream proxy (rate limited, cached)
/// /weather                         upstream proxy (rate limited, cached, mock fallback)
/// /air-quality                     upstream proxy (rate limited, cached)
/// /earthquakes/latest              upstream proxy (rate limited, cached)
/// /earthquakes/felt                upstream proxy (rate limited, cached)
/// /disaster-reports                upstream proxy (rate limited, cached)
///
/// /shelters                        nearby search (mock fallback), create
/// /shelters/all                    list all
/// /shelters/{id}                   get, update, delete
///
/// /flood-reports                   list, submit (rate limited)
/// /flood-reports/{id}              get, update, delete
/// /flood-reports/{id}/status       moderation status (PUT)
///
/// /alerts                          list (?active_only), create
/// /alerts/{id}                     get, update, delete
/// /alerts/{id}/deactivate          deactivate (POST)
/// ```
///
/// The rate limiter needs the state up front, so unlike the other route
/// builders this one takes it by reference.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(
            proxy::router()
                .route_layer(from_fn_with_state(state.clone(), enforce_rate_limit)),
        )
        .nest("/shelters", shelters::router())
        .nest("/flood-reports", flood_reports::router(state))
        .nest("/alerts", alerts::router())
}
