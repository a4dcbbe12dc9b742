//! SQLite implementation of the point-store readers and the booking writer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::insert::insert_reservation;
use crate::backend::{
    GeoPointReader, HotelMetaReader, ProfileReader, RatePlanReader, ReservationReader,
    ReservationWriter,
};
use crate::config::DATE_FORMAT;
use crate::error_handling::StoreError;
use crate::geo::GeoPoint;
use crate::profile::{Address, HotelProfile};
use crate::rate::{RatePlan, RoomType};
use crate::recommendation::HotelMeta;
use crate::reservation::Reservation;

/// Primary store over a shared SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<SqlitePool>,
}

impl SqliteStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        SqliteStore { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn rate_plan_from_row(row: &SqliteRow) -> Result<RatePlan, sqlx::Error> {
    Ok(RatePlan {
        hotel_id: row.try_get("hotel_id")?,
        code: row.try_get("code")?,
        in_date: row.try_get("in_date")?,
        out_date: row.try_get("out_date")?,
        room_type: RoomType {
            bookable_rate: row.try_get("bookable_rate")?,
            total_rate: row.try_get("total_rate")?,
            total_rate_inclusive: row.try_get("total_rate_inclusive")?,
            code: row.try_get("room_code")?,
            currency: row.try_get("currency")?,
            room_description: row.try_get("room_description")?,
        },
    })
}

fn profile_from_row(row: &SqliteRow) -> Result<HotelProfile, sqlx::Error> {
    Ok(HotelProfile {
        id: row.try_get("hotel_id")?,
        name: row.try_get("name")?,
        phone_number: row.try_get("phone_number")?,
        description: row.try_get("description")?,
        address: Address {
            street_number: row.try_get("street_number")?,
            street_name: row.try_get("street_name")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            country: row.try_get("country")?,
            postal_code: row.try_get("postal_code")?,
            lat: row.try_get("lat")?,
            lon: row.try_get("lon")?,
        },
    })
}

#[async_trait]
impl GeoPointReader for SqliteStore {
    async fn find_all_points(&self) -> Result<Vec<GeoPoint>, StoreError> {
        let rows = sqlx::query("SELECT hotel_id, lat, lon FROM geo ORDER BY hotel_id")
            .fetch_all(self.pool.as_ref())
            .await?;
        let points = rows
            .iter()
            .map(|row| {
                Ok(GeoPoint {
                    id: row.try_get("hotel_id")?,
                    lat: row.try_get("lat")?,
                    lon: row.try_get("lon")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(points)
    }
}

#[async_trait]
impl HotelMetaReader for SqliteStore {
    async fn find_all_hotels(&self) -> Result<Vec<HotelMeta>, StoreError> {
        let rows = sqlx::query(
            "SELECT hotel_id, lat, lon, rate, price FROM recommendations ORDER BY hotel_id",
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        let hotels = rows
            .iter()
            .map(|row| {
                Ok(HotelMeta {
                    id: row.try_get("hotel_id")?,
                    lat: row.try_get("lat")?,
                    lon: row.try_get("lon")?,
                    rate: row.try_get("rate")?,
                    price: row.try_get("price")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(hotels)
    }
}

#[async_trait]
impl RatePlanReader for SqliteStore {
    async fn find_rate_plans(&self, hotel_id: &str) -> Result<Vec<RatePlan>, StoreError> {
        let rows = sqlx::query(
            "SELECT hotel_id, code, in_date, out_date, room_code, bookable_rate, total_rate,
                    total_rate_inclusive, currency, room_description
             FROM rate_plans WHERE hotel_id = ? ORDER BY id",
        )
        .bind(hotel_id)
        .fetch_all(self.pool.as_ref())
        .await?;
        let plans = rows
            .iter()
            .map(rate_plan_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(plans)
    }
}

#[async_trait]
impl ProfileReader for SqliteStore {
    async fn find_profiles(&self, hotel_ids: &[String]) -> Result<Vec<HotelProfile>, StoreError> {
        if hotel_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT hotel_id, name, phone_number, description, street_number, street_name,
                    city, state, country, postal_code, lat, lon
             FROM profiles WHERE hotel_id IN (",
        );
        let mut ids = query.separated(", ");
        for id in hotel_ids {
            ids.push_bind(id.as_str());
        }
        ids.push_unseparated(")");

        let rows = query.build().fetch_all(self.pool.as_ref()).await?;
        let profiles = rows
            .iter()
            .map(profile_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }
}

#[async_trait]
impl ReservationReader for SqliteStore {
    async fn room_capacity(&self, hotel_id: &str) -> Result<Option<u32>, StoreError> {
        let row = sqlx::query("SELECT number_of_rooms FROM room_capacity WHERE hotel_id = ?")
            .bind(hotel_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(row
            .map(|row| row.try_get::<u32, _>("number_of_rooms"))
            .transpose()?)
    }

    async fn booked_rooms(&self, hotel_id: &str, night: NaiveDate) -> Result<u32, StoreError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(number), 0) AS booked FROM reservations
             WHERE hotel_id = ? AND in_date = ?",
        )
        .bind(hotel_id)
        .bind(night.format(DATE_FORMAT).to_string())
        .fetch_one(self.pool.as_ref())
        .await?;
        let booked: i64 = row.try_get("booked")?;
        u32::try_from(booked).map_err(|_| {
            StoreError::Unavailable(format!(
                "booked room count {booked} for hotel {hotel_id} out of range"
            ))
        })
    }
}

#[async_trait]
impl ReservationWriter for SqliteStore {
    async fn insert_reservations(&self, reservations: &[Reservation]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for reservation in reservations {
            insert_reservation(&mut *tx, reservation).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
