//! Cache-aside rate lookup.
//!
//! Each hotel's plans are cached under its id as newline-joined JSON. A miss
//! reads the primary store and writes the full plan set back. Refills of the
//! same id are serialized, so concurrent cold requests read the store once and
//! the cache only ever holds a complete plan set.

mod codec;
mod single_flight;
mod types;

pub use codec::{decode, encode};
pub use single_flight::{FlightGuard, SingleFlight};
pub use types::{sort_by_total_rate, RatePlan, RateRequest, RateResult, RoomType};

use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{RatePlanReader, RateService, RequestContext, VolatileCache};
use crate::error_handling::{ErrorType, InfoType, SearchError, ServiceStats};

pub struct RateCache {
    reader: Arc<dyn RatePlanReader>,
    cache: Arc<dyn VolatileCache>,
    flights: SingleFlight,
    stats: Arc<ServiceStats>,
}

impl RateCache {
    pub fn new(
        reader: Arc<dyn RatePlanReader>,
        cache: Arc<dyn VolatileCache>,
        stats: Arc<ServiceStats>,
    ) -> Self {
        RateCache {
            reader,
            cache,
            flights: SingleFlight::new(),
            stats,
        }
    }

    /// Collects the plans of every requested hotel, highest total rate first.
    ///
    /// Any cache failure other than a miss fails the whole request. Plans are
    /// looked up by hotel id only; the stay dates are carried for logging.
    pub async fn get_rates(
        &self,
        ctx: &RequestContext,
        request: &RateRequest,
    ) -> Result<RateResult, SearchError> {
        log::debug!(
            "Rates for {} hotels, {} to {}",
            request.hotel_ids.len(),
            request.in_date,
            request.out_date
        );

        let mut rate_plans = Vec::new();
        for hotel_id in &request.hotel_ids {
            rate_plans.extend(self.plans_for(ctx, hotel_id).await?);
        }
        sort_by_total_rate(&mut rate_plans);
        Ok(RateResult { rate_plans })
    }

    async fn plans_for(
        &self,
        ctx: &RequestContext,
        hotel_id: &str,
    ) -> Result<Vec<RatePlan>, SearchError> {
        if let Some(plans) = self.probe(ctx, hotel_id).await? {
            self.stats.increment_info(InfoType::CacheHit);
            return Ok(plans);
        }
        self.stats.increment_info(InfoType::CacheMiss);

        let _flight = ctx
            .call(async { Ok::<_, SearchError>(self.flights.acquire(hotel_id).await) })
            .await?;

        // Another request may have refilled the key while we queued
        if let Some(plans) = self.probe(ctx, hotel_id).await? {
            self.stats.increment_info(InfoType::CoalescedMiss);
            return Ok(plans);
        }

        let plans = ctx.call(self.reader.find_rate_plans(hotel_id)).await?;
        self.stats.increment_info(InfoType::PrimaryStoreRead);

        let value = encode(&plans)?;
        match ctx.call(self.cache.set(hotel_id, value)).await {
            Ok(()) => {}
            Err(SearchError::Cache(e)) => {
                log::warn!("Failed to cache rate plans for hotel {hotel_id}: {e}");
                self.stats.increment_error(ErrorType::CacheWriteFailed);
            }
            Err(e) => return Err(e),
        }
        Ok(plans)
    }

    /// `Ok(None)` on a miss or on an entry that no longer decodes.
    async fn probe(
        &self,
        ctx: &RequestContext,
        hotel_id: &str,
    ) -> Result<Option<Vec<RatePlan>>, SearchError> {
        let Some(value) = ctx.call(self.cache.get(hotel_id)).await? else {
            return Ok(None);
        };
        match decode(&value) {
            Ok(plans) => Ok(Some(plans)),
            Err(e) => {
                log::warn!("Discarding corrupt rate cache entry for hotel {hotel_id}: {e}");
                self.stats.increment_error(ErrorType::CorruptCacheEntry);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl RateService for RateCache {
    async fn get_rates(
        &self,
        ctx: &RequestContext,
        request: &RateRequest,
    ) -> Result<RateResult, SearchError> {
        RateCache::get_rates(self, ctx, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{plan, FakeCache, FakeStore};
    use chrono::NaiveDate;
    use std::time::Duration;

    struct Fixture {
        store: Arc<FakeStore>,
        cache: Arc<FakeCache>,
        stats: Arc<ServiceStats>,
        rates: Arc<RateCache>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(FakeStore::default());
        let cache = Arc::new(FakeCache::default());
        let stats = Arc::new(ServiceStats::new());
        let rates = Arc::new(RateCache::new(
            store.clone(),
            cache.clone(),
            Arc::clone(&stats),
        ));
        Fixture {
            store,
            cache,
            stats,
            rates,
        }
    }

    fn request(ids: &[&str]) -> RateRequest {
        RateRequest {
            hotel_ids: ids.iter().map(|s| s.to_string()).collect(),
            in_date: NaiveDate::from_ymd_opt(2015, 4, 9).unwrap(),
            out_date: NaiveDate::from_ymd_opt(2015, 4, 10).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_cold_and_warm_cache_agree() {
        let f = fixture();
        f.store.add_rate(plan("h1", "KNG", 200.0));
        f.store.add_rate(plan("h1", "QN", 120.0));
        f.store.add_rate(plan("h2", "KNG", 150.0));
        let ctx = RequestContext::background();

        let cold = f.rates.get_rates(&ctx, &request(&["h1", "h2"])).await.unwrap();
        let warm = f.rates.get_rates(&ctx, &request(&["h1", "h2"])).await.unwrap();

        assert_eq!(cold, warm);
        assert_eq!(cold.hotel_ids(), vec!["h1", "h2", "h1"]);
        assert_eq!(f.store.rate_reads("h1"), 1);
        assert_eq!(f.stats.get_info_count(InfoType::CacheHit), 2);
        assert_eq!(f.stats.get_info_count(InfoType::CacheMiss), 2);
    }

    #[tokio::test]
    async fn test_sorted_by_total_rate_descending() {
        let f = fixture();
        f.store.add_rate(plan("A", "x", 100.0));
        f.store.add_rate(plan("B", "x", 50.0));
        f.store.add_rate(plan("C", "x", 100.0));
        let ctx = RequestContext::background();

        for _ in 0..3 {
            let result = f.rates.get_rates(&ctx, &request(&["B", "C", "A"])).await.unwrap();
            assert_eq!(result.hotel_ids(), vec!["A", "C", "B"]);
        }
    }

    #[tokio::test]
    async fn test_cache_failure_fails_request() {
        let f = fixture();
        f.store.add_rate(plan("h1", "KNG", 200.0));
        f.cache.fail_gets(true);

        let result = f
            .rates
            .get_rates(&RequestContext::background(), &request(&["h1"]))
            .await;
        assert!(matches!(result, Err(SearchError::Cache(_))));
        assert_eq!(f.store.rate_reads("h1"), 0);
    }

    #[tokio::test]
    async fn test_store_failure_fails_request() {
        let f = fixture();
        f.store.fail_reads(true);

        let result = f
            .rates
            .get_rates(&RequestContext::background(), &request(&["h1"]))
            .await;
        assert!(matches!(result, Err(SearchError::Store(_))));
        assert!(f.cache.entry("h1").is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_refilled() {
        let f = fixture();
        f.store.add_rate(plan("h1", "KNG", 200.0));
        f.cache.insert_raw("h1", "{\"hotelId\":\"h1\"\n");

        let result = f
            .rates
            .get_rates(&RequestContext::background(), &request(&["h1"]))
            .await
            .unwrap();
        assert_eq!(result.rate_plans, vec![plan("h1", "KNG", 200.0)]);
        assert_eq!(
            f.cache.entry("h1").unwrap(),
            encode(&[plan("h1", "KNG", 200.0)]).unwrap()
        );
        assert_eq!(f.stats.get_error_count(ErrorType::CorruptCacheEntry), 2);
    }

    #[tokio::test]
    async fn test_cache_write_failure_is_not_fatal() {
        let f = fixture();
        f.store.add_rate(plan("h1", "KNG", 200.0));
        f.cache.fail_sets(true);

        let result = f
            .rates
            .get_rates(&RequestContext::background(), &request(&["h1"]))
            .await
            .unwrap();
        assert_eq!(result.hotel_ids(), vec!["h1"]);
        assert_eq!(f.stats.get_error_count(ErrorType::CacheWriteFailed), 1);
    }

    #[tokio::test]
    async fn test_empty_plan_set_is_cached() {
        let f = fixture();
        let ctx = RequestContext::background();

        let result = f.rates.get_rates(&ctx, &request(&["h9"])).await.unwrap();
        assert!(result.rate_plans.is_empty());
        assert_eq!(f.cache.entry("h9").as_deref(), Some(""));

        f.rates.get_rates(&ctx, &request(&["h9"])).await.unwrap();
        assert_eq!(f.store.rate_reads("h9"), 1);
    }

    #[tokio::test]
    async fn test_concurrent_cold_misses_read_store_once() {
        let f = fixture();
        f.store.add_rate(plan("hX", "KNG", 180.0));
        f.store.add_rate(plan("hX", "QN", 90.0));
        f.store.set_delay(Duration::from_millis(20));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let rates = Arc::clone(&f.rates);
            handles.push(tokio::spawn(async move {
                rates
                    .get_rates(&RequestContext::background(), &request(&["hX"]))
                    .await
            }));
        }

        let expected = vec![plan("hX", "KNG", 180.0), plan("hX", "QN", 90.0)];
        for handle in handles {
            let result = handle.await.expect("task panicked").expect("rates failed");
            assert_eq!(result.rate_plans, expected);
        }
        assert_eq!(f.store.rate_reads("hX"), 1);
        assert_eq!(f.cache.set_count(), 1);
        assert_eq!(f.cache.entry("hX").unwrap(), encode(&expected).unwrap());
        assert_eq!(f.stats.get_info_count(InfoType::CoalescedMiss), 9);
    }

    #[tokio::test]
    async fn test_cancelled_request_skips_backends() {
        let f = fixture();
        let ctx = RequestContext::background();
        ctx.cancel();

        let result = f.rates.get_rates(&ctx, &request(&["h1"])).await;
        assert!(matches!(result, Err(SearchError::Cancelled)));
        assert_eq!(f.store.rate_reads("h1"), 0);
    }
}
