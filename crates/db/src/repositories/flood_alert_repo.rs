//! Repository for the `flood_alerts` table.

use floodwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::flood_alert::{CreateFloodAlert, FloodAlert, UpdateFloodAlert};

const COLUMNS: &str = "id, region, level, title, message, source, is_active, issued_at, \
     expires_at, created_at, updated_at";

/// Provides CRUD operations for flood alerts.
pub struct FloodAlertRepo;

impl FloodAlertRepo {
    /// Issue a new alert, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateFloodAlert) -> Result<FloodAlert, sqlx::Error> {
        let query = format!(
            "INSERT INTO flood_alerts (region, level, title, message, source, issued_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()), $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FloodAlert>(&query)
            .bind(&input.region)
            .bind(&input.level)
            .bind(&input.title)
            .bind(&input.message)
            .bind(&input.source)
            .bind(input.issued_at)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FloodAlert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM flood_alerts WHERE id = $1");
        sqlx::query_as::<_, FloodAlert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List alerts, most recently issued first.
    ///
    /// With `active_only`, alerts that were deactivated or have expired are
    /// excluded.
    pub async fn list(
        pool: &PgPool,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FloodAlert>, sqlx::Error> {
        let filter = if active_only {
            "WHERE is_active AND (expires_at IS NULL OR expires_at > NOW())"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM flood_alerts {filter}
             ORDER BY issued_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, FloodAlert>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update an alert. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFloodAlert,
    ) -> Result<Option<FloodAlert>, sqlx::Error> {
        let query = format!(
            "UPDATE flood_alerts SET
                region = COALESCE($2, region),
                level = COALESCE($3, level),
                title = COALESCE($4, title),
                message = COALESCE($5, message),
                is_active = COALESCE($6, is_active),
                expires_at = COALESCE($7, expires_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FloodAlert>(&query)
            .bind(id)
            .bind(&input.region)
            .bind(&input.level)
            .bind(&input.title)
            .bind(&input.message)
            .bind(input.is_active)
            .bind(input.expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Mark an alert inactive. Returns `true` if an active alert was deactivated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE flood_alerts SET is_active = false WHERE id = $1 AND is_active")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM flood_alerts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
