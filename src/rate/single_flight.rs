//! Per-key refill coalescing.
//!
//! A cold key is refilled by one request at a time. Others arriving for the
//! same key queue on its slot and re-probe the cache once the refill is done,
//! so a burst of misses costs one primary-store read instead of one each.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

#[derive(Default)]
pub struct SingleFlight {
    slots: Slots,
}

/// Exclusive right to refill one key. The slot is released on drop.
pub struct FlightGuard {
    key: String,
    slot: Arc<AsyncMutex<()>>,
    slots: Slots,
    _permit: OwnedMutexGuard<()>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other refill of `key` is running, then claims it.
    pub async fn acquire(&self, key: &str) -> FlightGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.to_string()).or_default())
        };
        let permit = Arc::clone(&slot).lock_owned().await;
        FlightGuard {
            key: key.to_string(),
            slot,
            slots: Arc::clone(&self.slots),
            _permit: permit,
        }
    }

    /// Number of keys with a refill running or queued.
    pub fn in_flight(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // map entry + this guard + its permit: nobody else is queued
        if Arc::strong_count(&self.slot) == 3 {
            slots.remove(&self.key);
        }
    }
}
