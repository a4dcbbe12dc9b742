//! Ports between the search pipeline and its collaborators.
//!
//! Three kinds of capability are consumed here:
//! - point-store readers (eventually consistent snapshot reads of the primary store)
//! - a volatile key-value cache in front of the rate plans
//! - backend services, the typed "RPC" surface the orchestrator fans out to
//! - a booking writer, the only path that changes the primary store at runtime
//!
//! In-process implementations live in [`crate::storage`], [`crate::cache`] and
//! the service modules; any of them can be replaced by a remote client.

mod context;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error_handling::{CacheError, SearchError, StoreError};
use crate::geo::{GeoPoint, GeoResult, NearbyRequest};
use crate::profile::{HotelProfile, ProfileRequest, ProfileResult};
use crate::rate::{RatePlan, RateRequest, RateResult};
use crate::recommendation::{HotelMeta, RecommendationRequest, RecommendationResult};
use crate::reservation::{Reservation, ReservationRequest, ReservationResult};

pub use context::RequestContext;

/// Reads the full set of hotel coordinates.
#[async_trait]
pub trait GeoPointReader: Send + Sync {
    async fn find_all_points(&self) -> Result<Vec<GeoPoint>, StoreError>;
}

/// Reads the metadata scanned by the recommendation selector.
#[async_trait]
pub trait HotelMetaReader: Send + Sync {
    async fn find_all_hotels(&self) -> Result<Vec<HotelMeta>, StoreError>;
}

/// Reads every rate plan of one hotel.
#[async_trait]
pub trait RatePlanReader: Send + Sync {
    async fn find_rate_plans(&self, hotel_id: &str) -> Result<Vec<RatePlan>, StoreError>;
}

/// Reads display profiles. Unknown ids are skipped.
#[async_trait]
pub trait ProfileReader: Send + Sync {
    async fn find_profiles(&self, hotel_ids: &[String]) -> Result<Vec<HotelProfile>, StoreError>;
}

/// Reads room capacities and booked-room counts.
#[async_trait]
pub trait ReservationReader: Send + Sync {
    /// `None` when the hotel has no capacity row.
    async fn room_capacity(&self, hotel_id: &str) -> Result<Option<u32>, StoreError>;

    /// Rooms booked at the hotel for the night starting on `night`.
    async fn booked_rooms(&self, hotel_id: &str, night: NaiveDate) -> Result<u32, StoreError>;
}

/// Writes bookings. All rows of one call land together or not at all.
#[async_trait]
pub trait ReservationWriter: Send + Sync {
    async fn insert_reservations(&self, reservations: &[Reservation]) -> Result<(), StoreError>;
}

/// Volatile key-value cache.
///
/// `get` distinguishes a miss (`Ok(None)`) from a failure (`Err`); callers
/// treat the former as the trigger for a primary-store read and the latter as
/// fatal. Expiry and eviction are the cache's own business.
#[async_trait]
pub trait VolatileCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;
}

/// Nearby-hotel lookup.
#[async_trait]
pub trait GeoService: Send + Sync {
    async fn nearby(
        &self,
        ctx: &RequestContext,
        request: &NearbyRequest,
    ) -> Result<GeoResult, SearchError>;
}

/// Rate plan lookup.
#[async_trait]
pub trait RateService: Send + Sync {
    async fn get_rates(
        &self,
        ctx: &RequestContext,
        request: &RateRequest,
    ) -> Result<RateResult, SearchError>;
}

/// Recommendation lookup.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn get_recommendations(
        &self,
        ctx: &RequestContext,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, SearchError>;
}

/// Hotel profile lookup.
#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn get_profiles(
        &self,
        ctx: &RequestContext,
        request: &ProfileRequest,
    ) -> Result<ProfileResult, SearchError>;
}

/// Room availability and booking.
#[async_trait]
pub trait ReservationService: Send + Sync {
    /// Hotels among `request.hotel_ids` with `room_number` rooms free on every
    /// night of the stay, in request order.
    async fn check_availability(
        &self,
        ctx: &RequestContext,
        request: &ReservationRequest,
    ) -> Result<ReservationResult, SearchError>;

    /// Books the first requested hotel. An empty result means it was full.
    async fn make_reservation(
        &self,
        ctx: &RequestContext,
        request: &ReservationRequest,
    ) -> Result<ReservationResult, SearchError>;
}

/// Outcome of a one-shot snapshot load from the primary store.
///
/// Loaders keep whatever they managed to read when the store fails; `degraded`
/// carries the failure so callers can tell a partial structure from a complete
/// one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotState {
    /// Number of records the structure was built from
    pub records: usize,
    /// Store failure hit during the load, if any
    pub degraded: Option<String>,
}

impl SnapshotState {
    pub fn complete(records: usize) -> Self {
        SnapshotState {
            records,
            degraded: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}
