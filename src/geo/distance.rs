//! Great-circle distance.

use crate::config::EARTH_RADIUS_KM;

/// Haversine distance between two coordinates, in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // clamp guards asin against rounding just above 1.0
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}
