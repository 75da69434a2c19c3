//! Great-circle distance helpers.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two WGS84 points, in kilometres.
///
/// The same formula is evaluated in SQL by the shelter repository; keep
/// them in agreement.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_km(-6.2, 106.8, -6.2, 106.8), 0.0);
    }

    #[test]
    fn jakarta_to_bogor() {
        // Monas to Bogor Palace, roughly 47 km.
        let d = haversine_km(-6.1754, 106.8272, -6.5980, 106.7975);
        assert!((d - 47.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn is_symmetric() {
        let a = haversine_km(1.0, 2.0, 3.0, 4.0);
        let b = haversine_km(3.0, 4.0, 1.0, 2.0);
        assert!((a - b).abs() < 1e-9);
    }
}
