//! Rate data structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pricing of one room type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    #[serde(default)]
    pub bookable_rate: f64,
    pub total_rate: f64,
    #[serde(default)]
    pub total_rate_inclusive: f64,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub room_description: String,
}

/// One bookable rate of a hotel. A hotel may have several, one per room code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePlan {
    pub hotel_id: String,
    pub code: String,
    #[serde(default)]
    pub in_date: String,
    #[serde(default)]
    pub out_date: String,
    pub room_type: RoomType,
}

impl RatePlan {
    pub fn total_rate(&self) -> f64 {
        self.room_type.total_rate
    }
}

/// Rate lookup for a set of hotels over a stay.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRequest {
    pub hotel_ids: Vec<String>,
    pub in_date: NaiveDate,
    pub out_date: NaiveDate,
}

/// Rate plans of every requested hotel, highest total rate first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateResult {
    pub rate_plans: Vec<RatePlan>,
}

impl RateResult {
    /// One hotel id per plan, in plan order. A hotel with several plans
    /// appears several times.
    pub fn hotel_ids(&self) -> Vec<String> {
        self.rate_plans.iter().map(|p| p.hotel_id.clone()).collect()
    }
}

/// Orders plans by total rate, highest first.
///
/// Ties are broken by hotel id then plan code so the order does not depend
/// on whether plans came from the cache or the primary store.
pub fn sort_by_total_rate(plans: &mut [RatePlan]) {
    plans.sort_by(|a, b| {
        b.total_rate()
            .total_cmp(&a.total_rate())
            .then_with(|| a.hotel_id.cmp(&b.hotel_id))
            .then_with(|| a.code.cmp(&b.code))
    });
}
