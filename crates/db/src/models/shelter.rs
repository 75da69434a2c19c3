//! Evacuation shelter entity model and DTOs.

use floodwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `evacuation_shelters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EvacuationShelter {
    pub id: DbId,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: Option<i32>,
    pub occupancy: Option<i32>,
    pub contact_phone: Option<String>,
    pub facilities: Vec<String>,
    pub is_open: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A shelter together with its distance from the query point.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NearbyShelter {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub shelter: EvacuationShelter,
    pub distance_km: f64,
}

/// DTO for registering a shelter.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateShelter {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
    #[validate(range(min = 0))]
    pub occupancy: Option<i32>,
    #[validate(length(max = 40))]
    pub contact_phone: Option<String>,
    pub facilities: Option<Vec<String>>,
    pub is_open: Option<bool>,
}

/// DTO for editing a shelter. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateShelter {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
    #[validate(range(min = 0))]
    pub occupancy: Option<i32>,
    #[validate(length(max = 40))]
    pub contact_phone: Option<String>,
    pub facilities: Option<Vec<String>>,
    pub is_open: Option<bool>,
}
