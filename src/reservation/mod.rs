//! Room availability and booking.
//!
//! Booked-room counts are kept per hotel and night, cache-aside over the
//! primary store like rate plans, under keys of the form
//! `{hotel}_{night}_{next day}`. Capacities are cached under `{hotel}_cap`.
//!
//! Availability checks share a ledger lock and bookings hold it exclusively,
//! so a count refilled from the store can never overwrite the count a booking
//! just raised. A booking raises the cached counts before it writes the rows:
//! if the write fails the counts are put back, and if that fails too the cache
//! over-counts, which can only turn guests away, never overbook.

mod types;

pub use types::{
    capacity_key, night_key, nights, Reservation, ReservationRequest, ReservationResult,
    RoomCapacity,
};

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::backend::{
    RequestContext, ReservationReader, ReservationService, ReservationWriter, VolatileCache,
};
use crate::config::{DATE_FORMAT, DEFAULT_ROOM_CAPACITY};
use crate::error_handling::{ErrorType, InfoType, SearchError, ServiceStats};

pub struct ReservationBook {
    reader: Arc<dyn ReservationReader>,
    writer: Arc<dyn ReservationWriter>,
    cache: Arc<dyn VolatileCache>,
    ledger: RwLock<()>,
    stats: Arc<ServiceStats>,
}

impl ReservationBook {
    pub fn new(
        reader: Arc<dyn ReservationReader>,
        writer: Arc<dyn ReservationWriter>,
        cache: Arc<dyn VolatileCache>,
        stats: Arc<ServiceStats>,
    ) -> Self {
        ReservationBook {
            reader,
            writer,
            cache,
            ledger: RwLock::new(()),
            stats,
        }
    }

    /// Requested hotels with `room_number` rooms free on every night, in
    /// request order. Repeated ids are reported once.
    pub async fn check_availability(
        &self,
        ctx: &RequestContext,
        request: &ReservationRequest,
    ) -> Result<ReservationResult, SearchError> {
        let nights = nights(request.in_date, request.out_date);
        let _shared = ctx.run(self.ledger.read()).await?;

        let mut seen = HashSet::new();
        let mut hotel_ids = Vec::new();
        for hotel_id in &request.hotel_ids {
            if !seen.insert(hotel_id.as_str()) {
                continue;
            }
            if self
                .free_counts(ctx, hotel_id, &nights, request.room_number)
                .await?
                .is_some()
            {
                hotel_ids.push(hotel_id.clone());
            }
        }
        log::debug!(
            "{} of {} hotels free from {} to {}",
            hotel_ids.len(),
            seen.len(),
            request.in_date,
            request.out_date
        );
        Ok(ReservationResult { hotel_ids })
    }

    /// Books `room_number` rooms at the first requested hotel for every night
    /// of the stay. Returns the hotel id, or an empty result when any night
    /// lacks the rooms.
    pub async fn make_reservation(
        &self,
        ctx: &RequestContext,
        request: &ReservationRequest,
    ) -> Result<ReservationResult, SearchError> {
        let hotel_id = request
            .hotel_ids
            .first()
            .ok_or_else(|| SearchError::invalid("reservation names no hotel"))?;
        if request.customer_name.trim().is_empty() {
            return Err(SearchError::invalid("customerName must not be empty"));
        }
        if request.room_number == 0 {
            return Err(SearchError::invalid("number of rooms must be at least 1"));
        }
        let nights = nights(request.in_date, request.out_date);
        if nights.is_empty() {
            return Err(SearchError::invalid(format!(
                "outDate {} must be after inDate {}",
                request.out_date, request.in_date
            )));
        }

        let _exclusive = ctx.run(self.ledger.write()).await?;
        let Some(booked) = self
            .free_counts(ctx, hotel_id, &nights, request.room_number)
            .await?
        else {
            log::info!(
                "No rooms left at hotel {hotel_id} from {} to {}",
                request.in_date,
                request.out_date
            );
            self.stats.increment_info(InfoType::ReservationRejected);
            return Ok(ReservationResult::default());
        };

        // Past this point the booking is not abandoned half-way, so the
        // cache and the store are never left observing different writes.
        if ctx.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let raised: Vec<u32> = booked.iter().map(|b| b + request.room_number).collect();
        for (i, (&night, &count)) in nights.iter().zip(&raised).enumerate() {
            if let Err(e) = self
                .cache
                .set(&night_key(hotel_id, night), count.to_string())
                .await
            {
                self.restore_counts(hotel_id, &nights[..i], &booked[..i]).await;
                return Err(e.into());
            }
        }

        let rows: Vec<Reservation> = nights
            .iter()
            .map(|night| Reservation {
                hotel_id: hotel_id.clone(),
                customer_name: request.customer_name.clone(),
                in_date: night.format(DATE_FORMAT).to_string(),
                out_date: night
                    .succ_opt()
                    .unwrap_or(*night)
                    .format(DATE_FORMAT)
                    .to_string(),
                number: request.room_number,
            })
            .collect();
        if let Err(e) = self.writer.insert_reservations(&rows).await {
            self.restore_counts(hotel_id, &nights, &booked).await;
            return Err(e.into());
        }

        log::info!(
            "Reserved {} rooms at hotel {hotel_id} for {} nights from {}",
            request.room_number,
            nights.len(),
            request.in_date
        );
        self.stats.increment_info(InfoType::ReservationMade);
        Ok(ReservationResult {
            hotel_ids: vec![hotel_id.clone()],
        })
    }

    /// Booked counts per night if `rooms` more fit on every night, else `None`.
    async fn free_counts(
        &self,
        ctx: &RequestContext,
        hotel_id: &str,
        nights: &[NaiveDate],
        rooms: u32,
    ) -> Result<Option<Vec<u32>>, SearchError> {
        if nights.is_empty() {
            return Ok(Some(Vec::new()));
        }
        let capacity = self.capacity(ctx, hotel_id).await?;
        let mut counts = Vec::with_capacity(nights.len());
        for &night in nights {
            let booked = self.booked(ctx, hotel_id, night).await?;
            if booked.saturating_add(rooms) > capacity {
                return Ok(None);
            }
            counts.push(booked);
        }
        Ok(Some(counts))
    }

    async fn capacity(&self, ctx: &RequestContext, hotel_id: &str) -> Result<u32, SearchError> {
        let key = capacity_key(hotel_id);
        if let Some(rooms) = self.probe(ctx, &key).await? {
            return Ok(rooms);
        }
        let rooms = ctx
            .call(self.reader.room_capacity(hotel_id))
            .await?
            .unwrap_or(DEFAULT_ROOM_CAPACITY);
        self.fill(ctx, &key, rooms).await?;
        Ok(rooms)
    }

    async fn booked(
        &self,
        ctx: &RequestContext,
        hotel_id: &str,
        night: NaiveDate,
    ) -> Result<u32, SearchError> {
        let key = night_key(hotel_id, night);
        if let Some(count) = self.probe(ctx, &key).await? {
            return Ok(count);
        }
        let count = ctx.call(self.reader.booked_rooms(hotel_id, night)).await?;
        self.fill(ctx, &key, count).await?;
        Ok(count)
    }

    /// `Ok(None)` on a miss or on a value that is not a room count.
    async fn probe(&self, ctx: &RequestContext, key: &str) -> Result<Option<u32>, SearchError> {
        let Some(value) = ctx.call(self.cache.get(key)).await? else {
            self.stats.increment_info(InfoType::RoomCountCacheMiss);
            return Ok(None);
        };
        match value.parse() {
            Ok(count) => {
                self.stats.increment_info(InfoType::RoomCountCacheHit);
                Ok(Some(count))
            }
            Err(e) => {
                log::warn!("Discarding corrupt room count under {key}: {e}");
                self.stats.increment_error(ErrorType::CorruptCacheEntry);
                Ok(None)
            }
        }
    }

    async fn fill(&self, ctx: &RequestContext, key: &str, count: u32) -> Result<(), SearchError> {
        match ctx.call(self.cache.set(key, count.to_string())).await {
            Ok(()) => Ok(()),
            Err(SearchError::Cache(e)) => {
                log::warn!("Failed to cache room count under {key}: {e}");
                self.stats.increment_error(ErrorType::CacheWriteFailed);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn restore_counts(&self, hotel_id: &str, nights: &[NaiveDate], counts: &[u32]) {
        for (&night, &count) in nights.iter().zip(counts) {
            if let Err(e) = self
                .cache
                .set(&night_key(hotel_id, night), count.to_string())
                .await
            {
                log::warn!("Failed to restore room count for hotel {hotel_id} on {night}: {e}");
                self.stats.increment_error(ErrorType::CacheWriteFailed);
            }
        }
    }
}

#[async_trait]
impl ReservationService for ReservationBook {
    async fn check_availability(
        &self,
        ctx: &RequestContext,
        request: &ReservationRequest,
    ) -> Result<ReservationResult, SearchError> {
        ReservationBook::check_availability(self, ctx, request).await
    }

    async fn make_reservation(
        &self,
        ctx: &RequestContext,
        request: &ReservationRequest,
    ) -> Result<ReservationResult, SearchError> {
        ReservationBook::make_reservation(self, ctx, request).await
    }
}
