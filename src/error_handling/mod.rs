//! Error handling and service statistics.
//!
//! This module provides:
//! - Error type definitions for the search pipeline, its backends and startup
//! - Thread-safe counters for errors and informational events
//!
//! Cache misses are not errors: they are counted as [`InfoType::CacheMiss`]
//! and trigger the primary-store fallback.

mod stats;
mod types;

// Re-export public API
pub use stats::ServiceStats;
pub use types::{
    CacheError, DatabaseError, ErrorType, InfoType, InitializationError, SearchError, StoreError,
};
