//! Crowd-sourced disaster reports (PetaBencana-style GeoJSON).

use floodwatch_core::error::CoreError;
use floodwatch_core::validation::validate_region_code;
use serde::Deserialize;

use crate::fetch::{FetchError, ResilientClient};

pub const DEFAULT_REPORTS_URL: &str = "https://data.petabencana.id/reports";

pub const VALID_DISASTER_TYPES: &[&str] = &["flood", "earthquake", "wind", "haze", "fire", "volcano"];

/// Default and maximum look-back in seconds (one hour / seven days).
pub const DEFAULT_TIMEPERIOD_SECS: u32 = 3_600;
pub const MAX_TIMEPERIOD_SECS: u32 = 604_800;

/// Report filters, deserializable straight from `?admin=&disaster=&timeperiod=`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DisasterQuery {
    /// Province code, e.g. `ID-JK`.
    pub admin: Option<String>,
    pub disaster: Option<String>,
    pub timeperiod: Option<u32>,
}

impl DisasterQuery {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(admin) = &self.admin {
            validate_region_code(admin)?;
        }
        if let Some(disaster) = &self.disaster {
            if !VALID_DISASTER_TYPES.contains(&disaster.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Invalid disaster type '{disaster}'. Must be one of: {}",
                    VALID_DISASTER_TYPES.join(", ")
                )));
            }
        }
        if let Some(secs) = self.timeperiod {
            if secs == 0 || secs > MAX_TIMEPERIOD_SECS {
                return Err(CoreError::Validation(format!(
                    "timeperiod must be between 1 and {MAX_TIMEPERIOD_SECS} seconds"
                )));
            }
        }
        Ok(())
    }

    /// Query pairs sent upstream, always asking for GeoJSON.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("geoformat", "geojson".to_string()),
            (
                "timeperiod",
                self.timeperiod.unwrap_or(DEFAULT_TIMEPERIOD_SECS).to_string(),
            ),
        ];
        if let Some(admin) = &self.admin {
            pairs.push(("admin", admin.clone()));
        }
        if let Some(disaster) = &self.disaster {
            pairs.push(("disaster", disaster.clone()));
        }
        pairs
    }
}

#[derive(Clone)]
pub struct DisasterClient {
    http: ResilientClient,
    reports_url: String,
}

impl DisasterClient {
    pub fn new(http: ResilientClient, reports_url: impl Into<String>) -> Self {
        Self {
            http,
            reports_url: reports_url.into(),
        }
    }

    /// Stable cache key for a query.
    pub fn cache_key(&self, query: &DisasterQuery) -> String {
        let qs = query
            .to_pairs()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{qs}", self.reports_url)
    }

    pub async fn reports(&self, query: &DisasterQuery) -> Result<serde_json::Value, FetchError> {
        let pairs = query.to_pairs();
        let borrowed: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.http.get_json(&self.reports_url, &borrowed).await
    }
}
