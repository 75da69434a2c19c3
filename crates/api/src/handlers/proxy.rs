//! Handlers for the upstream proxy endpoints.
//!
//! Every handler goes through the shared [`ResponseCache`] so repeated
//! requests within the TTL do not reach the provider. Responses carry
//! `X-Cache: HIT|MISS`. Rate limiting is applied at the router level.
//!
//! [`ResponseCache`]: floodwatch_kv::ResponseCache

use axum::extract::{Query, RawQuery, State};
use axum::response::Response;
use floodwatch_kv::cache::CacheStatus;
use floodwatch_upstream::disaster::DisasterQuery;
use floodwatch_upstream::weather::WeatherReport;

use crate::error::AppResult;
use crate::query::CoordinateParams;
use crate::response::cached;
use crate::state::AppState;

/// Cache key for point lookups (weather, air quality).
///
/// Keyed by location rather than upstream URL so the entry is shared
/// whichever provider answered. Four decimals is roughly 11 m.
fn point_key(prefix: &str, lat: f64, lon: f64) -> String {
    format!("{prefix}:{lat:.4},{lon:.4}")
}

/// GET /api/v1/water-level
///
/// Forward the query string to the water level API. The cache key is the
/// full upstream URL.
pub async fn get_water_level(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Response> {
    let client = &state.providers.water_level;
    let url = client.request_url(query.as_deref())?;

    let (data, status) = state
        .cache
        .get_or_fetch(&url, || client.fetch(query.as_deref()))
        .await?;

    Ok(cached(data, status))
}

/// GET /api/v1/weather?lat=&lon=
///
/// Current conditions. Never fails because of the providers: when both
/// OpenWeatherMap and Open-Meteo are unavailable a mock report with
/// `"source": "mock"` is served (and not cached).
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<CoordinateParams>,
) -> AppResult<Response> {
    let (lat, lon) = params.resolve()?;
    let weather = &state.providers.weather;

    match state
        .cache
        .get_or_fetch(&point_key("weather", lat, lon), || weather.current(lat, lon))
        .await
    {
        Ok((report, status)) => Ok(cached(report, status)),
        Err(e) => {
            tracing::warn!(lat, lon, error = %e, "All weather providers failed, serving mock data");
            Ok(cached(WeatherReport::mock(lat, lon), CacheStatus::Miss))
        }
    }
}

/// GET /api/v1/air-quality?lat=&lon=
pub async fn get_air_quality(
    State(state): State<AppState>,
    Query(params): Query<CoordinateParams>,
) -> AppResult<Response> {
    let (lat, lon) = params.resolve()?;
    let client = &state.providers.air_quality;

    let (report, status) = state
        .cache
        .get_or_fetch(&point_key("air-quality", lat, lon), || client.current(lat, lon))
        .await?;

    Ok(cached(report, status))
}

/// GET /api/v1/earthquakes/latest
pub async fn get_latest_earthquake(State(state): State<AppState>) -> AppResult<Response> {
    let client = &state.providers.earthquakes;

    let (quake, status) = state
        .cache
        .get_or_fetch(&client.latest_url(), || client.latest())
        .await?;

    Ok(cached(quake, status))
}

/// GET /api/v1/earthquakes/felt
///
/// The provider's felt-earthquakes list, unmodified.
pub async fn get_felt_earthquakes(State(state): State<AppState>) -> AppResult<Response> {
    let client = &state.providers.earthquakes;

    let (feed, status) = state
        .cache
        .get_or_fetch(&client.felt_url(), || client.felt())
        .await?;

    Ok(cached(feed, status))
}

/// GET /api/v1/disaster-reports?admin=&disaster=&timeperiod=
pub async fn get_disaster_reports(
    State(state): State<AppState>,
    Query(query): Query<DisasterQuery>,
) -> AppResult<Response> {
    query.validate()?;
    let client = &state.providers.disasters;

    let (reports, status) = state
        .cache
        .get_or_fetch(&client.cache_key(&query), || client.reports(&query))
        .await?;

    Ok(cached(reports, status))
}
