//! JSON status handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::types::{
    AppState, CacheCounts, ErrorCounts, ReservationCounts, SnapshotStatus, StatusResponse,
};
use crate::backend::SnapshotState;
use crate::error_handling::{ErrorType, InfoType};

fn snapshot_status(state: Option<SnapshotState>) -> SnapshotStatus {
    match state {
        Some(state) => SnapshotStatus {
            loaded: true,
            records: state.records,
            degraded: state.is_degraded(),
            degraded_reason: state.degraded,
        },
        None => SnapshotStatus {
            loaded: false,
            records: 0,
            degraded: false,
            degraded_reason: None,
        },
    }
}

/// Counters and load state of the lazily built structures
pub async fn status_handler(State(state): State<AppState>) -> Response {
    let stats = &state.stack.stats;

    let response = StatusResponse {
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        cache: CacheCounts {
            hits: stats.get_info_count(InfoType::CacheHit),
            misses: stats.get_info_count(InfoType::CacheMiss),
            coalesced_misses: stats.get_info_count(InfoType::CoalescedMiss),
            primary_store_reads: stats.get_info_count(InfoType::PrimaryStoreRead),
            hit_ratio: stats.cache_hit_ratio(),
        },
        errors: ErrorCounts {
            total: stats.total_errors(),
            invalid_argument: stats.get_error_count(ErrorType::InvalidArgument),
            store_unavailable: stats.get_error_count(ErrorType::StoreUnavailable),
            cache_unavailable: stats.get_error_count(ErrorType::CacheUnavailable),
            cache_write_failed: stats.get_error_count(ErrorType::CacheWriteFailed),
            corrupt_cache_entry: stats.get_error_count(ErrorType::CorruptCacheEntry),
            deadline_exceeded: stats.get_error_count(ErrorType::DeadlineExceeded),
            cancelled: stats.get_error_count(ErrorType::Cancelled),
        },
        reservations: ReservationCounts {
            made: stats.get_info_count(InfoType::ReservationMade),
            rejected: stats.get_info_count(InfoType::ReservationRejected),
            room_count_hits: stats.get_info_count(InfoType::RoomCountCacheHit),
            room_count_misses: stats.get_info_count(InfoType::RoomCountCacheMiss),
        },
        geo_index: snapshot_status(state.stack.geo.load_state()),
        recommendations: snapshot_status(state.stack.recommendations.load_state()),
    };

    let json = match serde_json::to_string_pretty(&response) {
        Ok(json) => json,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize status: {}", e),
            )
                .into_response();
        }
    };

    (StatusCode::OK, [("content-type", "application/json")], json).into_response()
}
