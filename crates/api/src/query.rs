//! Shared query parameter types for API handlers.

use floodwatch_core::error::CoreError;
use floodwatch_core::validation::validate_coordinates;
use serde::Deserialize;

/// Central Jakarta, used when a request omits coordinates.
pub const DEFAULT_LATITUDE: f64 = -6.2088;
pub const DEFAULT_LONGITUDE: f64 = 106.8456;

/// `?lat=&lon=` for location-based proxy endpoints.
#[derive(Debug, Deserialize)]
pub struct CoordinateParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl CoordinateParams {
    /// The requested point, defaulting to Jakarta, after range validation.
    pub fn resolve(&self) -> Result<(f64, f64), CoreError> {
        let lat = self.lat.unwrap_or(DEFAULT_LATITUDE);
        let lon = self.lon.unwrap_or(DEFAULT_LONGITUDE);
        validate_coordinates(lat, lon)?;
        Ok((lat, lon))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_to_jakarta() {
        let params = CoordinateParams {
            lat: None,
            lon: None,
        };
        assert_eq!(params.resolve().unwrap(), (DEFAULT_LATITUDE, DEFAULT_LONGITUDE));
    }

    #[test]
    fn rejects_out_of_range() {
        let params = CoordinateParams {
            lat: Some(91.0),
            lon: Some(0.0),
        };
        assert_matches!(params.resolve(), Err(CoreError::Validation(_)));
    }
}
