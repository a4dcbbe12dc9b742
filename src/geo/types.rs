//! Geo data structures.

use serde::{Deserialize, Serialize};

/// Coordinates of one hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "hotelId")]
    pub id: String,
    pub lat: f64,
    pub lon: f64,
}

/// Nearby-hotel request.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    pub lat: f64,
    pub lon: f64,
}

/// Ids of nearby hotels, nearest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoResult {
    pub hotel_ids: Vec<String>,
}
