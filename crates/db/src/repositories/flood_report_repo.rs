//! Repository for the `flood_reports` table.

use floodwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::flood_report::{CreateFloodReport, FloodReport, UpdateFloodReport};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, location, latitude, longitude, water_level_cm, severity, status, \
     description, reporter_name, reporter_contact, photo_url, created_at, updated_at";

/// Optional filters for [`FloodReportRepo::list`].
#[derive(Debug, Clone, Default)]
pub struct FloodReportFilter {
    pub status: Option<String>,
    pub severity: Option<String>,
}

/// Provides CRUD operations for flood reports.
pub struct FloodReportRepo;

impl FloodReportRepo {
    /// Insert a new report with an already-resolved severity, returning the row.
    ///
    /// New reports always start in `pending`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFloodReport,
        severity: &str,
    ) -> Result<FloodReport, sqlx::Error> {
        let query = format!(
            "INSERT INTO flood_reports
                (location, latitude, longitude, water_level_cm, severity, description,
                 reporter_name, reporter_contact, photo_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FloodReport>(&query)
            .bind(&input.location)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.water_level_cm)
            .bind(severity)
            .bind(&input.description)
            .bind(&input.reporter_name)
            .bind(&input.reporter_contact)
            .bind(&input.photo_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FloodReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM flood_reports WHERE id = $1");
        sqlx::query_as::<_, FloodReport>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reports newest first, optionally filtered by status and severity.
    pub async fn list(
        pool: &PgPool,
        filter: &FloodReportFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FloodReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM flood_reports
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR severity = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, FloodReport>(&query)
            .bind(&filter.status)
            .bind(&filter.severity)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a report. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFloodReport,
    ) -> Result<Option<FloodReport>, sqlx::Error> {
        let query = format!(
            "UPDATE flood_reports SET
                location = COALESCE($2, location),
                latitude = COALESCE($3, latitude),
                longitude = COALESCE($4, longitude),
                water_level_cm = COALESCE($5, water_level_cm),
                severity = COALESCE($6, severity),
                description = COALESCE($7, description),
                photo_url = COALESCE($8, photo_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FloodReport>(&query)
            .bind(id)
            .bind(&input.location)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.water_level_cm)
            .bind(&input.severity)
            .bind(&input.description)
            .bind(&input.photo_url)
            .fetch_optional(pool)
            .await
    }

    /// Move a report to a new moderation status.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<FloodReport>, sqlx::Error> {
        let query = format!(
            "UPDATE flood_reports SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FloodReport>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a report. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM flood_reports WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
