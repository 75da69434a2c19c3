//! Repository for the `evacuation_shelters` table.

use floodwatch_core::geo::EARTH_RADIUS_KM;
use floodwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::shelter::{CreateShelter, EvacuationShelter, NearbyShelter, UpdateShelter};

const COLUMNS: &str = "id, name, address, latitude, longitude, capacity, occupancy, \
     contact_phone, facilities, is_open, created_at, updated_at";

/// Provides CRUD and proximity queries for evacuation shelters.
pub struct ShelterRepo;

impl ShelterRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateShelter,
    ) -> Result<EvacuationShelter, sqlx::Error> {
        let query = format!(
            "INSERT INTO evacuation_shelters
                (name, address, latitude, longitude, capacity, occupancy, contact_phone,
                 facilities, is_open)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, '{{}}'), COALESCE($9, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EvacuationShelter>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.capacity)
            .bind(input.occupancy)
            .bind(&input.contact_phone)
            .bind(&input.facilities)
            .bind(input.is_open)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EvacuationShelter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM evacuation_shelters WHERE id = $1");
        sqlx::query_as::<_, EvacuationShelter>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all shelters alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<EvacuationShelter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM evacuation_shelters ORDER BY name");
        sqlx::query_as::<_, EvacuationShelter>(&query)
            .fetch_all(pool)
            .await
    }

    /// Shelters within `radius_km` of a point, nearest first.
    ///
    /// Distance uses the haversine formula, matching
    /// [`floodwatch_core::geo::haversine_km`].
    pub async fn list_nearby(
        pool: &PgPool,
        lat: f64,
        lon: f64,
        radius_km: f64,
        limit: i64,
    ) -> Result<Vec<NearbyShelter>, sqlx::Error> {
        let query = format!(
            "SELECT * FROM (
                SELECT {COLUMNS},
                    2 * {EARTH_RADIUS_KM:.1} * ASIN(LEAST(1.0, SQRT(
                        POWER(SIN(RADIANS(latitude - $1) / 2), 2)
                        + COS(RADIANS($1)) * COS(RADIANS(latitude))
                        * POWER(SIN(RADIANS(longitude - $2) / 2), 2)
                    ))) AS distance_km
                FROM evacuation_shelters
             ) s
             WHERE distance_km <= $3
             ORDER BY distance_km ASC
             LIMIT $4"
        );
        sqlx::query_as::<_, NearbyShelter>(&query)
            .bind(lat)
            .bind(lon)
            .bind(radius_km)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update a shelter. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateShelter,
    ) -> Result<Option<EvacuationShelter>, sqlx::Error> {
        let query = format!(
            "UPDATE evacuation_shelters SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                capacity = COALESCE($4, capacity),
                occupancy = COALESCE($5, occupancy),
                contact_phone = COALESCE($6, contact_phone),
                facilities = COALESCE($7, facilities),
                is_open = COALESCE($8, is_open)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EvacuationShelter>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.capacity)
            .bind(input.occupancy)
            .bind(&input.contact_phone)
            .bind(&input.facilities)
            .bind(input.is_open)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM evacuation_shelters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
