//! Hotel profile data structures.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street_number: String,
    #[serde(default)]
    pub street_name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub postal_code: String,
    pub lat: f64,
    pub lon: f64,
}

/// Display data for one hotel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub description: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRequest {
    pub hotel_ids: Vec<String>,
    pub locale: String,
}

/// Profiles in request order. Ids without a profile are left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileResult {
    pub hotels: Vec<HotelProfile>,
}
