//! Input validation helpers for query parameters that do not map onto a
//! derived `Validate` DTO.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Default search radius for nearby shelters, in kilometres.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Largest accepted search radius, in kilometres.
pub const MAX_RADIUS_KM: f64 = 200.0;

/// Province codes accepted by the disaster report feed (ISO 3166-2:ID).
static REGION_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ID-[A-Z]{2}$").expect("valid regex"));

/// Validate a latitude/longitude pair.
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), CoreError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(CoreError::Validation(format!(
            "lat must be between -90 and 90, got {lat}"
        )));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(CoreError::Validation(format!(
            "lon must be between -180 and 180, got {lon}"
        )));
    }
    Ok(())
}

/// Resolve an optional search radius, rejecting non-positive or oversized values.
pub fn resolve_radius_km(radius_km: Option<f64>) -> Result<f64, CoreError> {
    let radius = radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    if !radius.is_finite() || radius <= 0.0 || radius > MAX_RADIUS_KM {
        return Err(CoreError::Validation(format!(
            "radius_km must be greater than 0 and at most {MAX_RADIUS_KM}, got {radius}"
        )));
    }
    Ok(radius)
}

/// Validate a province code such as `ID-JK`.
pub fn validate_region_code(code: &str) -> Result<(), CoreError> {
    if REGION_CODE_RE.is_match(code) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid region code: '{code}'. Expected a code like 'ID-JK'"
        )))
    }
}

/// Clamp a user-provided page size to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundary_coordinates() {
        assert!(validate_coordinates(-90.0, -180.0).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(-6.2, 106.8).is_ok());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn radius_defaults_and_bounds() {
        assert_eq!(resolve_radius_km(None).unwrap(), DEFAULT_RADIUS_KM);
        assert_eq!(resolve_radius_km(Some(25.0)).unwrap(), 25.0);
        assert!(resolve_radius_km(Some(0.0)).is_err());
        assert!(resolve_radius_km(Some(500.0)).is_err());
    }

    #[test]
    fn region_codes() {
        assert!(validate_region_code("ID-JK").is_ok());
        assert!(validate_region_code("ID-jk").is_err());
        assert!(validate_region_code("JK").is_err());
        assert!(validate_region_code("ID-JKT").is_err());
    }

    #[test]
    fn clamp_limit_behaviour() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
        assert_eq!(clamp_limit(Some(500), 20, 100), 100);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_offset(Some(-3)), 0);
    }
}
