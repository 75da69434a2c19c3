//! Handlers for regional flood alerts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use floodwatch_core::error::CoreError;
use floodwatch_core::types::DbId;
use floodwatch_core::validation::{clamp_limit, clamp_offset};
use floodwatch_db::models::flood_alert::{CreateFloodAlert, UpdateFloodAlert};
use floodwatch_db::repositories::FloodAlertRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// Query parameters for `GET /alerts`.
#[derive(Debug, Deserialize)]
pub struct AlertListParams {
    #[serde(default)]
    pub active_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "FloodAlert",
        id,
    })
}

/// GET /api/v1/alerts?active_only=&limit=&offset=
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertListParams>,
) -> AppResult<impl IntoResponse> {
    let alerts = FloodAlertRepo::list(
        &state.pool,
        params.active_only,
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse { data: alerts }))
}

/// POST /api/v1/alerts
pub async fn create_alert(
    State(state): State<AppState>,
    Json(input): Json<CreateFloodAlert>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let (Some(expires_at), Some(issued_at)) = (input.expires_at, input.issued_at) {
        if expires_at <= issued_at {
            return Err(AppError::BadRequest(
                "expires_at must be later than issued_at".into(),
            ));
        }
    }

    let alert = FloodAlertRepo::create(&state.pool, &input).await?;

    tracing::info!(
        alert_id = alert.id,
        level = %alert.level,
        region = %alert.region,
        "Flood alert issued",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: alert })))
}

/// GET /api/v1/alerts/{id}
pub async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let alert = FloodAlertRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse { data: alert }))
}

/// PUT /api/v1/alerts/{id}
pub async fn update_alert(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFloodAlert>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let alert = FloodAlertRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(alert_id = id, "Flood alert updated");

    Ok(Json(DataResponse { data: alert }))
}

/// POST /api/v1/alerts/{id}/deactivate
///
/// Idempotent: deactivating an inactive alert returns it unchanged.
pub async fn deactivate_alert(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if FloodAlertRepo::deactivate(&state.pool, id).await? {
        tracing::info!(alert_id = id, "Flood alert deactivated");
    }

    let alert = FloodAlertRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse { data: alert }))
}

/// DELETE /api/v1/alerts/{id}
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !FloodAlertRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(alert_id = id, "Flood alert deleted");

    Ok(StatusCode::NO_CONTENT)
}
