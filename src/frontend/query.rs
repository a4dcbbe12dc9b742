//! Validation of raw query parameters into typed requests.
//!
//! Every check runs before any backend is called. A failed check yields
//! [`SearchError::InvalidArgument`] naming the offending parameter.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::{DATE_FORMAT, DEFAULT_LOCALE, DEFAULT_ROOMS_PER_RESERVATION};
use crate::error_handling::SearchError;
use crate::recommendation::{Criterion, RecommendationRequest};
use crate::reservation::ReservationRequest;
use crate::search::SearchRequest;

/// Validated `/hotels` query.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelSearchQuery {
    pub request: SearchRequest,
    pub locale: String,
}

/// Validated `/recommendations` query.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationQuery {
    pub request: RecommendationRequest,
    pub locale: String,
}

/// Validated `/reservation` query. Credentials in the query are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationQuery {
    pub request: ReservationRequest,
}

impl HotelSearchQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, SearchError> {
        let in_date = date_param(params, "inDate")?;
        let out_date = date_param(params, "outDate")?;
        if out_date < in_date {
            return Err(SearchError::invalid(format!(
                "outDate {out_date} is before inDate {in_date}"
            )));
        }
        let (lat, lon) = location_params(params)?;

        Ok(HotelSearchQuery {
            request: SearchRequest {
                lat,
                lon,
                in_date,
                out_date,
            },
            locale: locale_param(params),
        })
    }
}

impl RecommendationQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, SearchError> {
        let (lat, lon) = location_params(params)?;
        let criterion: Criterion = required(params, "require")?.parse()?;

        Ok(RecommendationQuery {
            request: RecommendationRequest {
                lat,
                lon,
                criterion,
            },
            locale: locale_param(params),
        })
    }
}

impl ReservationQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, SearchError> {
        let in_date = date_param(params, "inDate")?;
        let out_date = date_param(params, "outDate")?;
        if out_date <= in_date {
            return Err(SearchError::invalid(format!(
                "outDate {out_date} must be after inDate {in_date}"
            )));
        }
        let hotel_id = required(params, "hotelId")?.to_string();
        let customer_name = required(params, "customerName")?.to_string();
        let room_number = match params.get("number").map(|n| n.trim()) {
            None | Some("") => DEFAULT_ROOMS_PER_RESERVATION,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(SearchError::invalid(format!(
                        "number must be a positive integer, got '{raw}'"
                    )))
                }
            },
        };

        Ok(ReservationQuery {
            request: ReservationRequest {
                customer_name,
                hotel_ids: vec![hotel_id],
                in_date,
                out_date,
                room_number,
            },
        })
    }
}

fn required<'a>(params: &'a HashMap<String, String>, name: &str) -> Result<&'a str, SearchError> {
    params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SearchError::invalid(format!("missing required parameter {name}")))
}

/// Dates must be zero-padded `YYYY-MM-DD` and name a real calendar day.
fn date_param(params: &HashMap<String, String>, name: &str) -> Result<NaiveDate, SearchError> {
    let raw = required(params, name)?;
    let invalid = || SearchError::invalid(format!("{name} must be a YYYY-MM-DD date, got '{raw}'"));
    if raw.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())
}

fn location_params(params: &HashMap<String, String>) -> Result<(f64, f64), SearchError> {
    let lat = coordinate(params, "lat", 90.0)?;
    let lon = coordinate(params, "lon", 180.0)?;
    Ok((lat, lon))
}

fn coordinate(
    params: &HashMap<String, String>,
    name: &str,
    bound: f64,
) -> Result<f64, SearchError> {
    let raw = required(params, name)?;
    let value: f64 = raw
        .parse()
        .map_err(|_| SearchError::invalid(format!("{name} must be a number, got '{raw}'")))?;
    if !value.is_finite() || value.abs() > bound {
        return Err(SearchError::invalid(format!(
            "{name} must be between -{bound} and {bound}, got {raw}"
        )));
    }
    Ok(value)
}

fn locale_param(params: &HashMap<String, String>) -> String {
    params
        .get("locale")
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LOCALE)
        .to_string()
}
