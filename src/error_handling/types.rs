//! Error type definitions.
//!
//! This module defines the errors surfaced by the search pipeline and its
//! backends, plus the event types counted by [`super::ServiceStats`].

use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error reading or parsing the seed file.
    #[error("Seed file error: {0}")]
    SeedError(String),
}

/// Error types for database setup.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Failures reading from the primary point store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The query could not be executed.
    #[error("point store query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// The store is not reachable.
    #[error("point store unavailable: {0}")]
    Unavailable(String),
}

impl From<DatabaseError> for StoreError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::SqlError(e) => StoreError::Query(e),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Failures of the volatile cache other than a plain miss.
///
/// A miss is reported as `Ok(None)` by [`crate::backend::VolatileCache::get`]
/// and never appears here.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache could not be reached or refused the operation.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the search pipeline operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// A request field is missing or malformed. Raised before any backend call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The primary store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The volatile cache failed with something other than a miss.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Rate plans could not be serialized for the cache.
    #[error("rate plan encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// The request deadline passed before a backend answered.
    #[error("request deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl SearchError {
    /// Builds an [`SearchError::InvalidArgument`] from any message.
    pub fn invalid(message: impl Into<String>) -> Self {
        SearchError::InvalidArgument(message.into())
    }

    /// Whether the caller is at fault (maps to a 4xx response).
    pub fn is_client_error(&self) -> bool {
        matches!(self, SearchError::InvalidArgument(_))
    }

    /// The stats bucket this error is counted under.
    pub fn error_type(&self) -> ErrorType {
        match self {
            SearchError::InvalidArgument(_) => ErrorType::InvalidArgument,
            SearchError::Store(_) => ErrorType::StoreUnavailable,
            SearchError::Cache(_) => ErrorType::CacheUnavailable,
            SearchError::Encoding(_) => ErrorType::RateEncoding,
            SearchError::Cancelled => ErrorType::Cancelled,
            SearchError::DeadlineExceeded(_) => ErrorType::DeadlineExceeded,
        }
    }
}

/// Types of errors counted while serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Request validation
    InvalidArgument,
    // Backends
    StoreUnavailable,
    CacheUnavailable,
    CacheWriteFailed,
    CorruptCacheEntry,
    RateEncoding,
    // Snapshot loads that proceeded with partial data
    GeoIndexDegraded,
    RecommendationsDegraded,
    // Request lifecycle
    Cancelled,
    DeadlineExceeded,
}

/// Types of informational events counted while serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    CacheHit,
    CacheMiss,
    PrimaryStoreRead,
    CoalescedMiss, // Miss served by another request's refill
    GeoIndexBuilt,
    RecommendationsLoaded,
    // Room counts, cached separately from rate plans
    RoomCountCacheHit,
    RoomCountCacheMiss,
    ReservationMade,
    ReservationRejected, // Not enough rooms left
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidArgument => "Invalid argument",
            ErrorType::StoreUnavailable => "Point store unavailable",
            ErrorType::CacheUnavailable => "Cache unavailable",
            ErrorType::CacheWriteFailed => "Cache write failed",
            ErrorType::CorruptCacheEntry => "Corrupt cache entry",
            ErrorType::RateEncoding => "Rate plan encoding error",
            ErrorType::GeoIndexDegraded => "Geo index built from partial data",
            ErrorType::RecommendationsDegraded => "Recommendations loaded from partial data",
            ErrorType::Cancelled => "Request cancelled",
            ErrorType::DeadlineExceeded => "Request deadline exceeded",
        }
    }
}

impl std::fmt::Display for InfoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::CacheHit => "Rate cache hit",
            InfoType::CacheMiss => "Rate cache miss",
            InfoType::PrimaryStoreRead => "Primary store read",
            InfoType::CoalescedMiss => "Coalesced rate cache miss",
            InfoType::GeoIndexBuilt => "Geo index built",
            InfoType::RecommendationsLoaded => "Recommendations loaded",
            InfoType::RoomCountCacheHit => "Room count cache hit",
            InfoType::RoomCountCacheMiss => "Room count cache miss",
            InfoType::ReservationMade => "Reservation made",
            InfoType::ReservationRejected => "Reservation rejected, no rooms left",
        }
    }
}
