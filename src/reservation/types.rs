//! Reservation data structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::DATE_FORMAT;

/// One booked night of one customer at one hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub hotel_id: String,
    pub customer_name: String,
    pub in_date: String,
    pub out_date: String,
    pub number: u32,
}

/// Room count of one hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCapacity {
    pub hotel_id: String,
    pub number_of_rooms: u32,
}

/// A stay for `room_number` rooms at each of `hotel_ids`.
///
/// Availability checks look at every hotel; a booking uses the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRequest {
    pub customer_name: String,
    pub hotel_ids: Vec<String>,
    pub in_date: NaiveDate,
    pub out_date: NaiveDate,
    pub room_number: u32,
}

/// Hotels that can take the stay, or the hotel that was booked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationResult {
    pub hotel_ids: Vec<String>,
}

/// Nights of a stay: every day from `in_date` up to, not including, `out_date`.
pub fn nights(in_date: NaiveDate, out_date: NaiveDate) -> Vec<NaiveDate> {
    let mut nights = Vec::new();
    let mut night = in_date;
    while night < out_date {
        nights.push(night);
        match night.succ_opt() {
            Some(next) => night = next,
            None => break,
        }
    }
    nights
}

/// Cache key of the booked-room count for one night.
pub fn night_key(hotel_id: &str, night: NaiveDate) -> String {
    let next = night.succ_opt().unwrap_or(night);
    format!(
        "{hotel_id}_{}_{}",
        night.format(DATE_FORMAT),
        next.format(DATE_FORMAT)
    )
}

/// Cache key of a hotel's room capacity.
pub fn capacity_key(hotel_id: &str) -> String {
    format!("{hotel_id}_cap")
}
