//! In-memory test doubles for the backend ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{
    GeoPointReader, HotelMetaReader, ProfileReader, RatePlanReader, ReservationReader,
    ReservationWriter, VolatileCache,
};
use crate::config::DATE_FORMAT;
use crate::error_handling::{CacheError, StoreError};
use crate::geo::GeoPoint;
use crate::profile::{Address, HotelProfile};
use crate::rate::{RatePlan, RoomType};
use crate::recommendation::HotelMeta;
use crate::reservation::Reservation;

/// Builds a plan with only the fields the pipeline looks at.
pub fn plan(hotel_id: &str, code: &str, total_rate: f64) -> RatePlan {
    RatePlan {
        hotel_id: hotel_id.to_string(),
        code: code.to_string(),
        in_date: "2015-04-09".to_string(),
        out_date: "2015-04-10".to_string(),
        room_type: RoomType {
            total_rate,
            ..Default::default()
        },
    }
}

pub fn profile(id: &str, name: &str) -> HotelProfile {
    HotelProfile {
        id: id.to_string(),
        name: name.to_string(),
        phone_number: format!("(415) 555-{id}"),
        description: String::new(),
        address: Address::default(),
    }
}

/// Point store backed by plain vectors, with read counters and failure injection.
#[derive(Default)]
pub struct FakeStore {
    points: Mutex<Vec<GeoPoint>>,
    hotels: Mutex<Vec<HotelMeta>>,
    rates: Mutex<HashMap<String, Vec<RatePlan>>>,
    profiles: Mutex<Vec<HotelProfile>>,
    capacities: Mutex<HashMap<String, u32>>,
    reservations: Mutex<Vec<Reservation>>,
    failing: AtomicBool,
    failing_writes: AtomicBool,
    delay: Mutex<Option<Duration>>,
    point_scans: AtomicUsize,
    hotel_scans: AtomicUsize,
    rate_reads: Mutex<HashMap<String, usize>>,
    room_reads: AtomicUsize,
}

impl FakeStore {
    pub fn add_point(&self, id: &str, lat: f64, lon: f64) {
        self.points.lock().unwrap().push(GeoPoint {
            id: id.to_string(),
            lat,
            lon,
        });
    }

    pub fn add_hotel(&self, id: &str, lat: f64, lon: f64, rate: f64, price: f64) {
        self.hotels.lock().unwrap().push(HotelMeta {
            id: id.to_string(),
            lat,
            lon,
            rate,
            price,
        });
    }

    pub fn add_rate(&self, plan: RatePlan) {
        self.rates
            .lock()
            .unwrap()
            .entry(plan.hotel_id.clone())
            .or_default()
            .push(plan);
    }

    pub fn add_profile(&self, profile: HotelProfile) {
        self.profiles.lock().unwrap().push(profile);
    }

    pub fn set_capacity(&self, hotel_id: &str, rooms: u32) {
        self.capacities
            .lock()
            .unwrap()
            .insert(hotel_id.to_string(), rooms);
    }

    /// Records `rooms` booked for the night starting on `night`.
    pub fn add_booking(&self, hotel_id: &str, night: NaiveDate, rooms: u32) {
        let next = night.succ_opt().unwrap();
        self.reservations.lock().unwrap().push(Reservation {
            hotel_id: hotel_id.to_string(),
            customer_name: "seed".to_string(),
            in_date: night.format(DATE_FORMAT).to_string(),
            out_date: next.format(DATE_FORMAT).to_string(),
            number: rooms,
        });
    }

    pub fn reservations(&self) -> Vec<Reservation> {
        self.reservations.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    /// Capacity and booked-count reads combined.
    pub fn room_reads(&self) -> usize {
        self.room_reads.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn point_scans(&self) -> usize {
        self.point_scans.load(Ordering::SeqCst)
    }

    pub fn hotel_scans(&self) -> usize {
        self.hotel_scans.load(Ordering::SeqCst)
    }

    pub fn rate_reads(&self, hotel_id: &str) -> usize {
        self.rate_reads
            .lock()
            .unwrap()
            .get(hotel_id)
            .copied()
            .unwrap_or(0)
    }

    async fn before_read(&self) -> Result<(), StoreError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl GeoPointReader for FakeStore {
    async fn find_all_points(&self) -> Result<Vec<GeoPoint>, StoreError> {
        self.point_scans.fetch_add(1, Ordering::SeqCst);
        self.before_read().await?;
        Ok(self.points.lock().unwrap().clone())
    }
}

#[async_trait]
impl HotelMetaReader for FakeStore {
    async fn find_all_hotels(&self) -> Result<Vec<HotelMeta>, StoreError> {
        self.hotel_scans.fetch_add(1, Ordering::SeqCst);
        self.before_read().await?;
        Ok(self.hotels.lock().unwrap().clone())
    }
}

#[async_trait]
impl RatePlanReader for FakeStore {
    async fn find_rate_plans(&self, hotel_id: &str) -> Result<Vec<RatePlan>, StoreError> {
        *self
            .rate_reads
            .lock()
            .unwrap()
            .entry(hotel_id.to_string())
            .or_default() += 1;
        self.before_read().await?;
        Ok(self
            .rates
            .lock()
            .unwrap()
            .get(hotel_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ProfileReader for FakeStore {
    async fn find_profiles(&self, hotel_ids: &[String]) -> Result<Vec<HotelProfile>, StoreError> {
        self.before_read().await?;
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| hotel_ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReservationReader for FakeStore {
    async fn room_capacity(&self, hotel_id: &str) -> Result<Option<u32>, StoreError> {
        self.room_reads.fetch_add(1, Ordering::SeqCst);
        self.before_read().await?;
        Ok(self.capacities.lock().unwrap().get(hotel_id).copied())
    }

    async fn booked_rooms(&self, hotel_id: &str, night: NaiveDate) -> Result<u32, StoreError> {
        self.room_reads.fetch_add(1, Ordering::SeqCst);
        self.before_read().await?;
        let night = night.format(DATE_FORMAT).to_string();
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.hotel_id == hotel_id && r.in_date == night)
            .map(|r| r.number)
            .sum())
    }
}

#[async_trait]
impl ReservationWriter for FakeStore {
    async fn insert_reservations(&self, reservations: &[Reservation]) -> Result<(), StoreError> {
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        self.reservations
            .lock()
            .unwrap()
            .extend_from_slice(reservations);
        Ok(())
    }
}

/// Cache double that can fail gets and sets independently.
#[derive(Default)]
pub struct FakeCache {
    entries: Mutex<HashMap<String, String>>,
    fail_gets: AtomicBool,
    fail_sets: AtomicBool,
    sets: AtomicUsize,
}

impl FakeCache {
    /// Stores a value without going through `set`, e.g. a corrupt entry.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn entry(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn fail_gets(&self, failing: bool) {
        self.fail_gets.store(failing, Ordering::SeqCst);
    }

    pub fn fail_sets(&self, failing: bool) {
        self.fail_sets.store(failing, Ordering::SeqCst);
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VolatileCache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("injected get failure".into()));
        }
        Ok(self.entry(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("injected set failure".into()));
        }
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}
