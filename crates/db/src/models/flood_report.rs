//! Flood report entity model and DTOs.

use floodwatch_core::flood::{validate_report_status, validate_severity};
use floodwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// A row from the `flood_reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FloodReport {
    pub id: DbId,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub water_level_cm: Option<i32>,
    pub severity: String,
    pub status: String,
    pub description: Option<String>,
    pub reporter_name: Option<String>,
    pub reporter_contact: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a new flood report.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFloodReport {
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0, max = 10000))]
    pub water_level_cm: Option<i32>,
    /// Derived from `water_level_cm` when omitted.
    #[validate(custom(function = "severity_is_known"))]
    pub severity: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub reporter_name: Option<String>,
    #[validate(length(max = 100))]
    pub reporter_contact: Option<String>,
    #[validate(url)]
    pub photo_url: Option<String>,
}

/// DTO for editing a flood report. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFloodReport {
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(range(min = 0, max = 10000))]
    pub water_level_cm: Option<i32>,
    #[validate(custom(function = "severity_is_known"))]
    pub severity: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(url)]
    pub photo_url: Option<String>,
}

/// DTO for the moderation status transition.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReportStatus {
    #[validate(custom(function = "status_is_known"))]
    pub status: String,
}

fn severity_is_known(value: &str) -> Result<(), ValidationError> {
    validate_severity(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_severity"))
}

fn status_is_known(value: &str) -> Result<(), ValidationError> {
    validate_report_status(value).map_err(|_| ValidationError::new("unknown_status"))
}
