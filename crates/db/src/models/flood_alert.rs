//! Flood alert entity model and DTOs.

use floodwatch_core::flood::validate_alert_level;
use floodwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// A row from the `flood_alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FloodAlert {
    pub id: DbId,
    pub region: String,
    pub level: String,
    pub title: String,
    pub message: String,
    pub source: Option<String>,
    pub is_active: bool,
    pub issued_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for issuing a new alert.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFloodAlert {
    #[validate(length(min = 1, max = 120))]
    pub region: String,
    #[validate(custom(function = "level_is_known"))]
    pub level: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
    #[validate(length(max = 120))]
    pub source: Option<String>,
    /// Defaults to now.
    pub issued_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
}

/// DTO for editing an alert. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFloodAlert {
    #[validate(length(min = 1, max = 120))]
    pub region: Option<String>,
    #[validate(custom(function = "level_is_known"))]
    pub level: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub message: Option<String>,
    pub is_active: Option<bool>,
    pub expires_at: Option<Timestamp>,
}

fn level_is_known(value: &str) -> Result<(), ValidationError> {
    validate_alert_level(value).map_err(|_| ValidationError::new("unknown_alert_level"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_must_be_known() {
        let alert = CreateFloodAlert {
            region: "DKI Jakarta".to_string(),
            level: "siaga".to_string(),
            title: "Ciliwung rising".to_string(),
            message: "Katulampa gauge at 150 cm".to_string(),
            source: None,
            issued_at: None,
            expires_at: None,
        };
        let errors = alert.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("level"));

        let alert = CreateFloodAlert {
            level: "warning".to_string(),
            ..alert
        };
        assert!(alert.validate().is_ok());
    }

    #[test]
    fn update_with_bad_level_is_rejected() {
        let update = UpdateFloodAlert {
            level: Some("bogus".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
