//! Handlers for citizen flood reports.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use floodwatch_core::error::CoreError;
use floodwatch_core::flood::{resolve_severity, validate_report_status, validate_severity};
use floodwatch_core::types::DbId;
use floodwatch_core::validation::{clamp_limit, clamp_offset};
use floodwatch_db::models::flood_report::{CreateFloodReport, UpdateFloodReport, UpdateReportStatus};
use floodwatch_db::repositories::{FloodReportFilter, FloodReportRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// Query parameters for `GET /flood-reports`.
#[derive(Debug, Deserialize)]
pub struct ReportListParams {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "FloodReport",
        id,
    })
}

/// GET /api/v1/flood-reports?status=&severity=&limit=&offset=
///
/// Newest reports first.
pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ReportListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &params.status {
        validate_report_status(status)?;
    }
    if let Some(severity) = &params.severity {
        validate_severity(severity)?;
    }

    let filter = FloodReportFilter {
        status: params.status,
        severity: params.severity,
    };
    let reports = FloodReportRepo::list(
        &state.pool,
        &filter,
        clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(params.offset),
    )
    .await?;

    Ok(Json(DataResponse { data: reports }))
}

/// POST /api/v1/flood-reports
///
/// Submit a report. Severity is derived from `water_level_cm` when omitted.
pub async fn create_report(
    State(state): State<AppState>,
    Json(input): Json<CreateFloodReport>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let severity = resolve_severity(input.severity.as_deref(), input.water_level_cm)?;

    let report = FloodReportRepo::create(&state.pool, &input, severity.as_str()).await?;

    tracing::info!(
        report_id = report.id,
        severity = %report.severity,
        location = %report.location,
        "Flood report submitted",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// GET /api/v1/flood-reports/{id}
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = FloodReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(DataResponse { data: report }))
}

/// PUT /api/v1/flood-reports/{id}
pub async fn update_report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFloodReport>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let report = FloodReportRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(report_id = id, "Flood report updated");

    Ok(Json(DataResponse { data: report }))
}

/// PUT /api/v1/flood-reports/{id}/status
///
/// Moderation transition (`pending`, `verified`, `resolved`, `rejected`).
pub async fn update_report_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReportStatus>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let report = FloodReportRepo::update_status(&state.pool, id, &input.status)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(report_id = id, status = %report.status, "Flood report status changed");

    Ok(Json(DataResponse { data: report }))
}

/// DELETE /api/v1/flood-reports/{id}
pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !FloodReportRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(report_id = id, "Flood report deleted");

    Ok(StatusCode::NO_CONTENT)
}
