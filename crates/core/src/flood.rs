//! Flood report and alert vocabulary.
//!
//! The database stores these as `TEXT` columns guarded by `CHECK`
//! constraints; the constants here must stay in sync with the migrations.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const SEVERITY_LOW: &str = "low";
pub const SEVERITY_MODERATE: &str = "moderate";
pub const SEVERITY_HIGH: &str = "high";
pub const SEVERITY_CRITICAL: &str = "critical";

pub const VALID_SEVERITIES: &[&str] = &[
    SEVERITY_LOW,
    SEVERITY_MODERATE,
    SEVERITY_HIGH,
    SEVERITY_CRITICAL,
];

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_VERIFIED: &str = "verified";
pub const STATUS_RESOLVED: &str = "resolved";
pub const STATUS_REJECTED: &str = "rejected";

pub const VALID_REPORT_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_VERIFIED,
    STATUS_RESOLVED,
    STATUS_REJECTED,
];

pub const ALERT_ADVISORY: &str = "advisory";
pub const ALERT_WATCH: &str = "watch";
pub const ALERT_WARNING: &str = "warning";
pub const ALERT_EMERGENCY: &str = "emergency";

pub const VALID_ALERT_LEVELS: &[&str] = &[
    ALERT_ADVISORY,
    ALERT_WATCH,
    ALERT_WARNING,
    ALERT_EMERGENCY,
];

/// Water depth (cm) at or above which a report is at least `moderate`.
pub const MODERATE_DEPTH_CM: i32 = 30;
/// Water depth (cm) at or above which a report is at least `high`.
pub const HIGH_DEPTH_CM: i32 = 70;
/// Water depth (cm) at or above which a report is `critical`.
pub const CRITICAL_DEPTH_CM: i32 = 150;

/// Severity of a reported flood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => SEVERITY_LOW,
            Severity::Moderate => SEVERITY_MODERATE,
            Severity::High => SEVERITY_HIGH,
            Severity::Critical => SEVERITY_CRITICAL,
        }
    }

    /// Classify a reported water depth.
    pub fn from_water_level_cm(depth_cm: i32) -> Self {
        if depth_cm >= CRITICAL_DEPTH_CM {
            Severity::Critical
        } else if depth_cm >= HIGH_DEPTH_CM {
            Severity::High
        } else if depth_cm >= MODERATE_DEPTH_CM {
            Severity::Moderate
        } else {
            Severity::Low
        }
    }
}

/// Parse and validate a severity string.
pub fn validate_severity(value: &str) -> Result<Severity, CoreError> {
    match value {
        SEVERITY_LOW => Ok(Severity::Low),
        SEVERITY_MODERATE => Ok(Severity::Moderate),
        SEVERITY_HIGH => Ok(Severity::High),
        SEVERITY_CRITICAL => Ok(Severity::Critical),
        _ => Err(CoreError::Validation(format!(
            "Unknown severity: '{value}'. Valid values: {}",
            VALID_SEVERITIES.join(", ")
        ))),
    }
}

/// Validate a flood report status string.
pub fn validate_report_status(value: &str) -> Result<(), CoreError> {
    if VALID_REPORT_STATUSES.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown report status: '{value}'. Valid values: {}",
            VALID_REPORT_STATUSES.join(", ")
        )))
    }
}

/// Validate an alert level string.
pub fn validate_alert_level(value: &str) -> Result<(), CoreError> {
    if VALID_ALERT_LEVELS.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown alert level: '{value}'. Valid values: {}",
            VALID_ALERT_LEVELS.join(", ")
        )))
    }
}

/// Resolve the severity for a new report: an explicit value wins, otherwise
/// it is derived from the water depth, falling back to `low`.
pub fn resolve_severity(
    explicit: Option<&str>,
    water_level_cm: Option<i32>,
) -> Result<Severity, CoreError> {
    match (explicit, water_level_cm) {
        (Some(value), _) => validate_severity(value),
        (None, Some(depth)) => Ok(Severity::from_water_level_cm(depth)),
        (None, None) => Ok(Severity::Low),
    }
}
