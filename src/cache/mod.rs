//! In-process volatile cache.
//!
//! Entries expire after a fixed TTL and the oldest entry is evicted when the
//! cache is full. Expired entries are dropped lazily, on read or when room is
//! needed for a new key.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::backend::VolatileCache;
use crate::error_handling::CacheError;

struct Entry {
    value: String,
    inserted: Instant,
    seq: u64,
}

/// Entries plus their insertion order. Every entry shares one TTL, so the
/// front of `order` is both the oldest and the first to expire.
#[derive(Default)]
struct Slots {
    entries: HashMap<String, Entry>,
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl Slots {
    fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.seq);
        Some(entry)
    }

    fn insert(&mut self, key: &str, value: String, now: Instant) {
        self.remove(key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.to_string());
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                inserted: now,
                seq,
            },
        );
    }

    fn oldest(&self) -> Option<&Entry> {
        let (_, key) = self.order.first_key_value()?;
        self.entries.get(key)
    }

    fn pop_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

pub struct MemoryCache {
    slots: RwLock<Slots>,
    ttl: Option<Duration>,
    capacity: usize,
}

impl MemoryCache {
    /// `ttl` of `None` keeps entries until evicted for space.
    pub fn new(ttl: Option<Duration>, capacity: usize) -> Self {
        MemoryCache {
            slots: RwLock::new(Slots::default()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.entries.is_empty()
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        self.ttl
            .map(|ttl| now.duration_since(entry.inserted) >= ttl)
            .unwrap_or(false)
    }

    /// Drops expired entries from the front, then the oldest live ones until
    /// one more key fits.
    fn make_room(&self, slots: &mut Slots, now: Instant) {
        while slots.oldest().is_some_and(|e| self.is_expired(e, now)) {
            slots.pop_oldest();
        }
        while slots.entries.len() >= self.capacity {
            match slots.pop_oldest() {
                Some(key) => log::debug!("Evicting cache entry {key}"),
                None => break,
            }
        }
    }
}

#[async_trait]
impl VolatileCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let slots = self.slots.read().await;
            match slots.entries.get(key) {
                None => return Ok(None),
                Some(entry) if !self.is_expired(entry, now) => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => {}
            }
        }

        let mut slots = self.slots.write().await;
        // Re-check: a writer may have refreshed the key in between
        if slots
            .entries
            .get(key)
            .is_some_and(|entry| self.is_expired(entry, now))
        {
            slots.remove(key);
        }
        Ok(slots.entries.get(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut slots = self.slots.write().await;
        if !slots.entries.contains_key(key) && slots.entries.len() >= self.capacity {
            self.make_room(&mut slots, now);
        }
        slots.insert(key, value, now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = MemoryCache::new(None, 10);
        assert_eq!(cache.get("h1").await.unwrap(), None);
        cache.set("h1", "plans".into()).await.unwrap();
        assert_eq!(cache.get("h1").await.unwrap().as_deref(), Some("plans"));
    }

    #[tokio::test]
    async fn test_empty_value_is_a_hit() {
        let cache = MemoryCache::new(None, 10);
        cache.set("h1", String::new()).await.unwrap();
        assert_eq!(cache.get("h1").await.unwrap().as_deref(), Some(""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = MemoryCache::new(Some(Duration::from_secs(60)), 10);
        cache.set("h1", "plans".into()).await.unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get("h1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("h1").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oldest_entry_evicted_when_full() {
        let cache = MemoryCache::new(None, 2);
        cache.set("a", "1".into()).await.unwrap();
        tokio::time::advance(Duration::from_millis(1)).await;
        cache.set("b", "2".into()).await.unwrap();
        tokio::time::advance(Duration::from_millis(1)).await;
        cache.set("c", "3".into()).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert!(cache.get("b").await.unwrap().is_some());
        assert!(cache.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let cache = MemoryCache::new(None, 2);
        cache.set("a", "1".into()).await.unwrap();
        cache.set("b", "2".into()).await.unwrap();
        cache.set("a", "3".into()).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_overwrite_moves_key_to_back_of_eviction_order() {
        let cache = MemoryCache::new(None, 2);
        cache.set("a", "1".into()).await.unwrap();
        cache.set("b", "2".into()).await.unwrap();
        cache.set("a", "3".into()).await.unwrap();
        cache.set("c", "4".into()).await.unwrap();

        assert_eq!(cache.get("b").await.unwrap(), None);
        assert_eq!(cache.get("a").await.unwrap().as_deref(), Some("3"));
        assert_eq!(cache.get("c").await.unwrap().as_deref(), Some("4"));
        assert_eq!(cache.slots.read().await.order.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cache_drops_expired_before_live_entries() {
        let cache = MemoryCache::new(Some(Duration::from_secs(60)), 3);
        cache.set("old1", "1".into()).await.unwrap();
        cache.set("old2", "2".into()).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.set("live", "3".into()).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;

        cache.set("new", "4".into()).await.unwrap();
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("live").await.unwrap().as_deref(), Some("3"));
        assert_eq!(cache.get("new").await.unwrap().as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn test_eviction_keeps_order_index_in_step() {
        let cache = MemoryCache::new(None, 100);
        for i in 0..1_000 {
            cache.set(&format!("h{i}"), i.to_string()).await.unwrap();
        }
        let slots = cache.slots.read().await;
        assert_eq!(slots.entries.len(), 100);
        assert_eq!(slots.order.len(), 100);
        assert_eq!(slots.order.first_key_value().map(|(_, k)| k.as_str()), Some("h900"));
        drop(slots);
        assert_eq!(cache.get("h899").await.unwrap(), None);
    }
}
