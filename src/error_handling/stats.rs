//! Service statistics tracking.
//!
//! Thread-safe counters for errors and informational events observed while
//! serving search requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType};

/// Thread-safe service statistics tracker.
///
/// Every [`ErrorType`] and [`InfoType`] variant gets an atomic counter at
/// construction, so the struct can be shared behind an `Arc` and incremented
/// from any task without locking.
pub struct ServiceStats {
    errors: HashMap<ErrorType, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
}

impl ServiceStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }

        let mut info = HashMap::new();
        for info_type in InfoType::iter() {
            info.insert(info_type, AtomicUsize::new(0));
        }

        ServiceStats { errors, info }
    }

    /// Increment an error counter.
    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map",
                error
            );
        }
    }

    /// Increment an info counter.
    pub fn increment_info(&self, info_type: InfoType) {
        if let Some(counter) = self.info.get(&info_type) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment info counter for {:?} which is not in the map",
                info_type
            );
        }
    }

    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info
            .get(&info_type)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total_errors(&self) -> usize {
        self.errors.values().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    pub fn total_info(&self) -> usize {
        self.info.values().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Fraction of rate lookups answered from the cache, `None` before any lookup.
    pub fn cache_hit_ratio(&self) -> Option<f64> {
        let hits = self.get_info_count(InfoType::CacheHit);
        let misses = self.get_info_count(InfoType::CacheMiss);
        let total = hits + misses;
        (total > 0).then(|| hits as f64 / total as f64)
    }

    /// Logs every non-zero counter.
    pub fn log_summary(&self) {
        for info_type in InfoType::iter() {
            let count = self.get_info_count(info_type);
            if count > 0 {
                log::info!("{}: {}", info_type, count);
            }
        }
        for error_type in ErrorType::iter() {
            let count = self.get_error_count(error_type);
            if count > 0 {
                log::warn!("{}: {}", error_type, count);
            }
        }
    }
}

impl Default for ServiceStats {
    fn default() -> Self {
        Self::new()
    }
}
