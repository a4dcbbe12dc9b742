//! Configuration constants.
//!
//! This module defines the fixed parameters of the search pipeline (result caps,
//! search radius, index resolution) and the defaults used by [`super::Config`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

// Geo search
/// Maximum distance in kilometers between the query point and a nearby hotel
pub const MAX_SEARCH_RADIUS_KM: f64 = 10.0;
/// Maximum number of hotel ids returned by a nearby query
pub const MAX_SEARCH_RESULTS: usize = 5;
/// Edge length of one grid cell of the geo index, in kilometers.
/// Kept at half the search radius so a query never scans more than a 5x5 block
/// of cells at moderate latitudes.
pub const GEO_INDEX_RESOLUTION_KM: f64 = 5.0;
/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Kilometers per degree of latitude
pub const KM_PER_DEGREE: f64 = 111.195;

// Recommendation
/// Maximum number of hotel ids returned by a recommendation query
pub const MAX_RECOMMENDATION_RESULTS: usize = 5;

// Frontend
/// Locale used for profile lookups when the request does not name one
pub const DEFAULT_LOCALE: &str = "en";
/// Stay dates are exchanged as calendar dates in this format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Request handling
/// Default end-to-end deadline for one frontend request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Volatile cache
/// Default lifetime of a rate cache entry (1 hour)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;
/// Default maximum number of rate cache entries kept in memory
pub const DEFAULT_CACHE_CAPACITY: usize = 100_000;

// Reservations
/// Rooms assumed for a hotel with no capacity row
pub const DEFAULT_ROOM_CAPACITY: u32 = 200;
/// Rooms booked when a reservation query does not say
pub const DEFAULT_ROOMS_PER_RESERVATION: u32 = 1;

// Storage
/// Default SQLite database path
pub const DB_PATH: &str = "./hotel_search.db";
/// Maximum number of pooled SQLite connections
pub const DB_MAX_CONNECTIONS: u32 = 16;
/// How long a request waits for a pooled connection before failing
pub const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

// Server
/// Default listen address of the HTTP server
pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);
