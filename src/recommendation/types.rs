//! Recommendation data structures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error_handling::SearchError;

/// Metadata the selector ranks hotels by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelMeta {
    #[serde(rename = "hotelId")]
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub rate: f64,
    pub price: f64,
}

/// What "best" means for a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// Nearest to the query point
    Distance,
    /// Highest rated
    Rate,
    /// Cheapest
    Price,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Distance => "distance",
            Criterion::Rate => "rate",
            Criterion::Price => "price",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" | "dis" => Ok(Criterion::Distance),
            "rate" => Ok(Criterion::Rate),
            "price" => Ok(Criterion::Price),
            other => Err(SearchError::invalid(format!(
                "unknown recommendation criterion '{other}', expected one of dis, distance, rate, price"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub lat: f64,
    pub lon: f64,
    pub criterion: Criterion,
}

/// Ids of the recommended hotels, in hotel id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationResult {
    pub hotel_ids: Vec<String>,
}
