//! Seed data loading.
//!
//! A seed file is one JSON object with an array per table:
//!
//! ```json
//! {
//!   "geo": [...], "rates": [...], "recommendations": [...], "profiles": [...],
//!   "capacities": [...], "reservations": [...]
//! }
//! ```
//!
//! Missing arrays are treated as empty.

use std::path::Path;

use serde::Deserialize;
use sqlx::SqlitePool;

use super::insert::{
    insert_geo_point, insert_hotel_meta, insert_profile, insert_rate_plan, insert_reservation,
    insert_room_capacity,
};
use crate::error_handling::{DatabaseError, InitializationError};
use crate::geo::GeoPoint;
use crate::profile::HotelProfile;
use crate::rate::RatePlan;
use crate::recommendation::HotelMeta;
use crate::reservation::{Reservation, RoomCapacity};

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub geo: Vec<GeoPoint>,
    #[serde(default)]
    pub rates: Vec<RatePlan>,
    #[serde(default)]
    pub recommendations: Vec<HotelMeta>,
    #[serde(default)]
    pub profiles: Vec<HotelProfile>,
    #[serde(default)]
    pub capacities: Vec<RoomCapacity>,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self, InitializationError> {
        serde_json::from_str(json)
            .map_err(|e| InitializationError::SeedError(format!("invalid seed data: {e}")))
    }

    pub fn total_records(&self) -> usize {
        self.geo.len()
            + self.rates.len()
            + self.recommendations.len()
            + self.profiles.len()
            + self.capacities.len()
            + self.reservations.len()
    }
}

/// Reads and parses a seed file.
pub fn load_seed_file(path: &Path) -> Result<SeedData, InitializationError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        InitializationError::SeedError(format!("failed to read {}: {e}", path.display()))
    })?;
    SeedData::from_json(&json)
}

/// Writes all seed records in one transaction.
///
/// Table rows are upserted. Seeded reservations are appended, so a seed with
/// bookings should be loaded into a fresh database only once.
pub async fn seed_store(pool: &SqlitePool, seed: &SeedData) -> Result<usize, DatabaseError> {
    let mut tx = pool.begin().await?;
    for point in &seed.geo {
        insert_geo_point(&mut *tx, point).await?;
    }
    for plan in &seed.rates {
        insert_rate_plan(&mut *tx, plan).await?;
    }
    for hotel in &seed.recommendations {
        insert_hotel_meta(&mut *tx, hotel).await?;
    }
    for profile in &seed.profiles {
        insert_profile(&mut *tx, profile).await?;
    }
    for capacity in &seed.capacities {
        insert_room_capacity(&mut *tx, capacity).await?;
    }
    for reservation in &seed.reservations {
        insert_reservation(&mut *tx, reservation).await?;
    }
    tx.commit().await?;

    log::info!(
        "Seeded store: {} points, {} rate plans, {} hotels, {} profiles, {} capacities, {} bookings",
        seed.geo.len(),
        seed.rates.len(),
        seed.recommendations.len(),
        seed.profiles.len(),
        seed.capacities.len(),
        seed.reservations.len()
    );
    Ok(seed.total_records())
}
