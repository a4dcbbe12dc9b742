//! Server data structures.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::initialization::SearchStack;

/// Shared state for the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub stack: SearchStack,
    pub start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(stack: SearchStack) -> Self {
        AppState {
            stack,
            start_time: Arc::new(Instant::now()),
        }
    }
}

/// JSON response for `/status` endpoint
#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: f64,
    pub cache: CacheCounts,
    pub errors: ErrorCounts,
    pub reservations: ReservationCounts,
    pub geo_index: SnapshotStatus,
    pub recommendations: SnapshotStatus,
}

#[derive(Serialize)]
pub struct CacheCounts {
    pub hits: usize,
    pub misses: usize,
    pub coalesced_misses: usize,
    pub primary_store_reads: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_ratio: Option<f64>,
}

#[derive(Serialize)]
pub struct ErrorCounts {
    pub total: usize,
    pub invalid_argument: usize,
    pub store_unavailable: usize,
    pub cache_unavailable: usize,
    pub cache_write_failed: usize,
    pub corrupt_cache_entry: usize,
    pub deadline_exceeded: usize,
    pub cancelled: usize,
}

#[derive(Serialize)]
pub struct ReservationCounts {
    pub made: usize,
    pub rejected: usize,
    pub room_count_hits: usize,
    pub room_count_misses: usize,
}

/// Load state of a lazily built structure
#[derive(Serialize)]
pub struct SnapshotStatus {
    pub loaded: bool,
    pub records: usize,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}
