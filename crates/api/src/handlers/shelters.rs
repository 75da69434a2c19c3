//! Handlers for evacuation shelters.
//!
//! The nearby search degrades to a built-in list of well-known Jakarta
//! shelters when the database is unreachable, so the map keeps working
//! during an outage.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use floodwatch_core::error::CoreError;
use floodwatch_core::geo::haversine_km;
use floodwatch_core::types::DbId;
use floodwatch_core::validation::{clamp_limit, resolve_radius_km};
use floodwatch_db::models::shelter::{
    CreateShelter, EvacuationShelter, NearbyShelter, UpdateShelter,
};
use floodwatch_db::repositories::ShelterRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::query::CoordinateParams;
use crate::response::{DataResponse, SourcedResponse};
use crate::state::AppState;

const DEFAULT_NEARBY_LIMIT: i64 = 50;
const MAX_NEARBY_LIMIT: i64 = 200;

pub const SOURCE_DATABASE: &str = "database";
pub const SOURCE_MOCK: &str = "mock";

/// Query parameters for `GET /shelters`.
#[derive(Debug, Deserialize)]
pub struct ShelterSearchParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
    pub limit: Option<i64>,
}

/// Fallback shelters: (name, address, lat, lon, capacity, facilities).
const MOCK_SHELTERS: &[(&str, &str, f64, f64, i32, &[&str])] = &[
    (
        "GOR Otista",
        "Jl. Otista Raya, Bidara Cina, Jakarta Timur",
        -6.2297,
        106.8676,
        500,
        &["medical", "kitchen", "toilets"],
    ),
    (
        "Masjid Istiqlal",
        "Jl. Taman Wijaya Kusuma, Jakarta Pusat",
        -6.1702,
        106.8310,
        2000,
        &["toilets", "prayer_room"],
    ),
    (
        "SDN Kampung Melayu 01",
        "Jl. Jatinegara Barat, Kampung Melayu, Jakarta Timur",
        -6.2244,
        106.8665,
        300,
        &["kitchen", "toilets"],
    ),
    (
        "GOR Cengkareng",
        "Jl. Kamal Raya, Cengkareng, Jakarta Barat",
        -6.1425,
        106.7370,
        800,
        &["medical", "toilets"],
    ),
];

/// Built-in shelters within `radius_km` of the point, nearest first.
pub fn mock_shelters(lat: f64, lon: f64, radius_km: f64) -> Vec<NearbyShelter> {
    let now = Utc::now();
    let mut shelters: Vec<NearbyShelter> = MOCK_SHELTERS
        .iter()
        .enumerate()
        .map(|(i, (name, address, s_lat, s_lon, capacity, facilities))| NearbyShelter {
            shelter: EvacuationShelter {
                id: i as DbId + 1,
                name: name.to_string(),
                address: Some(address.to_string()),
                latitude: *s_lat,
                longitude: *s_lon,
                capacity: Some(*capacity),
                occupancy: None,
                contact_phone: None,
                facilities: facilities.iter().map(|f| f.to_string()).collect(),
                is_open: true,
                created_at: now,
                updated_at: now,
            },
            distance_km: haversine_km(lat, lon, *s_lat, *s_lon),
        })
        .filter(|s| s.distance_km <= radius_km)
        .collect();
    shelters.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    shelters
}

/// GET /api/v1/shelters?lat=&lon=&radius_km=&limit=
///
/// Shelters near a point (Jakarta by default), nearest first. Responds with
/// `"source": "mock"` when the database cannot be queried.
pub async fn list_shelters(
    State(state): State<AppState>,
    Query(params): Query<ShelterSearchParams>,
) -> AppResult<impl IntoResponse> {
    let (lat, lon) = CoordinateParams {
        lat: params.lat,
        lon: params.lon,
    }
    .resolve()?;
    let radius_km = resolve_radius_km(params.radius_km)?;
    let limit = clamp_limit(params.limit, DEFAULT_NEARBY_LIMIT, MAX_NEARBY_LIMIT);

    let query = ShelterRepo::list_nearby(&state.pool, lat, lon, radius_km, limit);
    let outcome = tokio::time::timeout(state.config.db_wait_budget(), query).await;

    let response = match outcome {
        Ok(Ok(shelters)) => SourcedResponse {
            data: shelters,
            source: SOURCE_DATABASE,
        },
        failed => {
            match failed {
                Ok(Err(e)) => tracing::warn!(error = %e, "Shelter query failed, serving built-in list"),
                _ => tracing::warn!("Shelter query timed out, serving built-in list"),
            }
            let mut shelters = mock_shelters(lat, lon, radius_km);
            shelters.truncate(limit as usize);
            SourcedResponse {
                data: shelters,
                source: SOURCE_MOCK,
            }
        }
    };

    Ok(Json(response))
}

/// GET /api/v1/shelters/all
///
/// Every registered shelter, alphabetically.
pub async fn list_all_shelters(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let shelters = ShelterRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: shelters }))
}

/// POST /api/v1/shelters
pub async fn create_shelter(
    State(state): State<AppState>,
    Json(input): Json<CreateShelter>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let shelter = ShelterRepo::create(&state.pool, &input).await?;

    tracing::info!(shelter_id = shelter.id, name = %shelter.name, "Shelter registered");

    Ok((StatusCode::CREATED, Json(DataResponse { data: shelter })))
}

/// GET /api/v1/shelters/{id}
pub async fn get_shelter(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let shelter = ShelterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Shelter",
            id,
        }))?;

    Ok(Json(DataResponse { data: shelter }))
}

/// PUT /api/v1/shelters/{id}
pub async fn update_shelter(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateShelter>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let shelter = ShelterRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Shelter",
            id,
        }))?;

    tracing::info!(shelter_id = id, "Shelter updated");

    Ok(Json(DataResponse { data: shelter }))
}

/// DELETE /api/v1/shelters/{id}
pub async fn delete_shelter(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ShelterRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Shelter",
            id,
        }));
    }

    tracing::info!(shelter_id = id, "Shelter deleted");

    Ok(StatusCode::NO_CONTENT)
}
