//! GeoJSON rendering of hotel profiles.

use serde::Serialize;

use crate::profile::HotelProfile;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub properties: Properties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Properties {
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// `[lon, lat]`, GeoJSON axis order
    pub coordinates: [f64; 2],
}

impl FeatureCollection {
    /// One point feature per profile, in the given order.
    pub fn from_profiles(hotels: &[HotelProfile]) -> Self {
        FeatureCollection {
            kind: "FeatureCollection",
            features: hotels.iter().map(Feature::from).collect(),
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.id.as_str()).collect()
    }
}

impl From<&HotelProfile> for Feature {
    fn from(hotel: &HotelProfile) -> Self {
        Feature {
            kind: "Feature",
            id: hotel.id.clone(),
            properties: Properties {
                name: hotel.name.clone(),
                phone_number: hotel.phone_number.clone(),
            },
            geometry: Geometry {
                kind: "Point",
                coordinates: [hotel.address.lon, hotel.address.lat],
            },
        }
    }
}
