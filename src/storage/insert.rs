//! Row writers for the hotel tables.
//!
//! All writers upsert, so loading the same seed twice leaves one row per key.
//! They take any SQLite executor so a seed load can run inside a transaction.

use sqlx::{Executor, Sqlite};

use crate::error_handling::DatabaseError;
use crate::geo::GeoPoint;
use crate::profile::HotelProfile;
use crate::rate::RatePlan;
use crate::recommendation::HotelMeta;
use crate::reservation::{Reservation, RoomCapacity};

pub async fn insert_geo_point<'e, E>(executor: E, point: &GeoPoint) -> Result<(), DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO geo (hotel_id, lat, lon) VALUES (?, ?, ?)
         ON CONFLICT(hotel_id) DO UPDATE SET lat=excluded.lat, lon=excluded.lon",
    )
    .bind(&point.id)
    .bind(point.lat)
    .bind(point.lon)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_rate_plan<'e, E>(executor: E, plan: &RatePlan) -> Result<(), DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let room = &plan.room_type;
    sqlx::query(
        "INSERT INTO rate_plans (hotel_id, code, in_date, out_date, room_code, bookable_rate,
                                 total_rate, total_rate_inclusive, currency, room_description)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(hotel_id, code, room_code) DO UPDATE SET
             in_date=excluded.in_date,
             out_date=excluded.out_date,
             bookable_rate=excluded.bookable_rate,
             total_rate=excluded.total_rate,
             total_rate_inclusive=excluded.total_rate_inclusive,
             currency=excluded.currency,
             room_description=excluded.room_description",
    )
    .bind(&plan.hotel_id)
    .bind(&plan.code)
    .bind(&plan.in_date)
    .bind(&plan.out_date)
    .bind(&room.code)
    .bind(room.bookable_rate)
    .bind(room.total_rate)
    .bind(room.total_rate_inclusive)
    .bind(&room.currency)
    .bind(&room.room_description)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_hotel_meta<'e, E>(executor: E, hotel: &HotelMeta) -> Result<(), DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO recommendations (hotel_id, lat, lon, rate, price) VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(hotel_id) DO UPDATE SET
             lat=excluded.lat, lon=excluded.lon, rate=excluded.rate, price=excluded.price",
    )
    .bind(&hotel.id)
    .bind(hotel.lat)
    .bind(hotel.lon)
    .bind(hotel.rate)
    .bind(hotel.price)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_profile<'e, E>(executor: E, profile: &HotelProfile) -> Result<(), DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let address = &profile.address;
    sqlx::query(
        "INSERT INTO profiles (hotel_id, name, phone_number, description, street_number,
                               street_name, city, state, country, postal_code, lat, lon)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(hotel_id) DO UPDATE SET
             name=excluded.name,
             phone_number=excluded.phone_number,
             description=excluded.description,
             street_number=excluded.street_number,
             street_name=excluded.street_name,
             city=excluded.city,
             state=excluded.state,
             country=excluded.country,
             postal_code=excluded.postal_code,
             lat=excluded.lat,
             lon=excluded.lon",
    )
    .bind(&profile.id)
    .bind(&profile.name)
    .bind(&profile.phone_number)
    .bind(&profile.description)
    .bind(&address.street_number)
    .bind(&address.street_name)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.country)
    .bind(&address.postal_code)
    .bind(address.lat)
    .bind(address.lon)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_room_capacity<'e, E>(
    executor: E,
    capacity: &RoomCapacity,
) -> Result<(), DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO room_capacity (hotel_id, number_of_rooms) VALUES (?, ?)
         ON CONFLICT(hotel_id) DO UPDATE SET number_of_rooms=excluded.number_of_rooms",
    )
    .bind(&capacity.hotel_id)
    .bind(capacity.number_of_rooms)
    .execute(executor)
    .await?;
    Ok(())
}

/// Appends a booking row. Unlike the table writers above this never upserts:
/// two identical bookings are two bookings.
pub async fn insert_reservation<'e, E>(
    executor: E,
    reservation: &Reservation,
) -> Result<(), DatabaseError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO reservations (hotel_id, customer_name, in_date, out_date, number)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&reservation.hotel_id)
    .bind(&reservation.customer_name)
    .bind(&reservation.in_date)
    .bind(&reservation.out_date)
    .bind(reservation.number)
    .execute(executor)
    .await?;
    Ok(())
}
