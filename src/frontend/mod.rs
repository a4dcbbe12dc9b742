//! Public query entry points.
//!
//! Turns raw parameter maps into typed requests, runs them through the
//! orchestrator under a per-request deadline and renders the hotels as GeoJSON.
//! Search results are filtered down to hotels with a free room for the stay
//! before their profiles are fetched.

mod geojson;
mod query;

pub use geojson::{Feature, FeatureCollection, Geometry, Properties};
pub use query::{HotelSearchQuery, RecommendationQuery, ReservationQuery};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::backend::RequestContext;
use crate::error_handling::{SearchError, ServiceStats};
use crate::search::SearchOrchestrator;

/// Answer to a `/reservation` query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationOutcome {
    pub reserved: bool,
    pub message: String,
}

pub struct Frontend {
    orchestrator: Arc<SearchOrchestrator>,
    stats: Arc<ServiceStats>,
    timeout: Duration,
}

impl Frontend {
    pub fn new(
        orchestrator: Arc<SearchOrchestrator>,
        stats: Arc<ServiceStats>,
        timeout: Duration,
    ) -> Self {
        Frontend {
            orchestrator,
            stats,
            timeout,
        }
    }

    /// Handles a `/hotels` query: nearby hotels priced for the stay, highest
    /// rate first, with their profiles.
    pub async fn search_hotels(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<FeatureCollection, SearchError> {
        let ctx = RequestContext::with_timeout(self.timeout);
        let result = self.search_hotels_in(&ctx, params).await;
        self.record(result)
    }

    /// Handles a `/recommendations` query.
    pub async fn recommend(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<FeatureCollection, SearchError> {
        let ctx = RequestContext::with_timeout(self.timeout);
        let result = self.recommend_in(&ctx, params).await;
        self.record(result)
    }

    /// Handles a `/reservation` query for one hotel.
    pub async fn reserve(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<ReservationOutcome, SearchError> {
        let ctx = RequestContext::with_timeout(self.timeout);
        let result = self.reserve_in(&ctx, params).await;
        self.record(result)
    }

    pub fn stats(&self) -> &ServiceStats {
        &self.stats
    }

    async fn search_hotels_in(
        &self,
        ctx: &RequestContext,
        params: &HashMap<String, String>,
    ) -> Result<FeatureCollection, SearchError> {
        let query = HotelSearchQuery::from_params(params)?;
        let found = self.orchestrator.nearby_search(ctx, &query.request).await?;
        let free = self
            .orchestrator
            .available(ctx, &query.request, found.hotel_ids)
            .await?;
        let hotels = self
            .orchestrator
            .profiles(ctx, &free, &query.locale)
            .await?;
        Ok(FeatureCollection::from_profiles(&hotels))
    }

    async fn recommend_in(
        &self,
        ctx: &RequestContext,
        params: &HashMap<String, String>,
    ) -> Result<FeatureCollection, SearchError> {
        let query = RecommendationQuery::from_params(params)?;
        let hotels = self
            .orchestrator
            .recommend(ctx, &query.request, &query.locale)
            .await?;
        Ok(FeatureCollection::from_profiles(&hotels))
    }

    async fn reserve_in(
        &self,
        ctx: &RequestContext,
        params: &HashMap<String, String>,
    ) -> Result<ReservationOutcome, SearchError> {
        let query = ReservationQuery::from_params(params)?;
        let request = &query.request;
        let booked = self.orchestrator.reserve(ctx, request).await?;
        let hotel_id = request.hotel_ids.first().map(String::as_str).unwrap_or_default();

        Ok(if booked.hotel_ids.is_empty() {
            ReservationOutcome {
                reserved: false,
                message: format!(
                    "Failed. Hotel {hotel_id} has no {} rooms free from {} to {}",
                    request.room_number, request.in_date, request.out_date
                ),
            }
        } else {
            ReservationOutcome {
                reserved: true,
                message: format!(
                    "Reserve successfully! {} rooms at hotel {hotel_id} from {} to {}",
                    request.room_number, request.in_date, request.out_date
                ),
            }
        })
    }

    fn record<T>(&self, result: Result<T, SearchError>) -> Result<T, SearchError> {
        if let Err(e) = &result {
            self.stats.increment_error(e.error_type());
            if e.is_client_error() {
                log::debug!("Rejected request: {e}");
            } else {
                log::warn!("Request failed: {e}");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{plan, profile, FakeCache, FakeStore};
    use crate::error_handling::ErrorType;
    use crate::geo::GeoIndex;
    use crate::profile::ProfileDirectory;
    use crate::rate::RateCache;
    use crate::recommendation::RecommendationSelector;
    use crate::reservation::ReservationBook;

    fn frontend(store: &Arc<FakeStore>) -> Frontend {
        let stats = Arc::new(ServiceStats::new());
        let orchestrator = SearchOrchestrator::new(
            Arc::new(GeoIndex::new(store.clone(), Arc::clone(&stats))),
            Arc::new(RateCache::new(
                store.clone(),
                Arc::new(FakeCache::default()),
                Arc::clone(&stats),
            )),
            Arc::new(RecommendationSelector::new(store.clone(), Arc::clone(&stats))),
            Arc::new(ProfileDirectory::new(store.clone())),
            Arc::new(ReservationBook::new(
                store.clone(),
                store.clone(),
                Arc::new(FakeCache::default()),
                Arc::clone(&stats),
            )),
        );
        Frontend::new(Arc::new(orchestrator), stats, Duration::from_secs(5))
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_search_renders_profiles_in_rate_order() {
        let store = Arc::new(FakeStore::default());
        store.add_point("h1", 1.0, 1.0);
        store.add_point("h2", 1.0, 1.0);
        store.add_rate(plan("h1", "A", 100.0));
        store.add_rate(plan("h2", "B", 150.0));
        store.add_profile(profile("h1", "First"));
        store.add_profile(profile("h2", "Second"));
        let frontend = frontend(&store);

        let hotels = frontend
            .search_hotels(&params(&[
                ("inDate", "2015-04-09"),
                ("outDate", "2015-04-10"),
                ("lat", "1.0"),
                ("lon", "1.0"),
            ]))
            .await
            .unwrap();
        assert_eq!(hotels.ids(), vec!["h2", "h1"]);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_backends() {
        let store = Arc::new(FakeStore::default());
        let frontend = frontend(&store);

        let result = frontend
            .search_hotels(&params(&[("inDate", "2015-04-09"), ("lat", "1.0"), ("lon", "1.0")]))
            .await;
        assert!(matches!(result, Err(SearchError::InvalidArgument(_))));
        assert_eq!(store.point_scans(), 0);
        assert_eq!(frontend.stats().get_error_count(ErrorType::InvalidArgument), 1);
    }

    #[tokio::test]
    async fn test_recommend_renders_profiles() {
        let store = Arc::new(FakeStore::default());
        store.add_hotel("1", 37.78, -122.41, 4.5, 200.0);
        store.add_hotel("2", 37.79, -122.40, 3.0, 120.0);
        store.add_profile(profile("1", "Clift Hotel"));
        store.add_profile(profile("2", "W San Francisco"));
        let frontend = frontend(&store);

        let hotels = frontend
            .recommend(&params(&[("lat", "37.78"), ("lon", "-122.41"), ("require", "rate")]))
            .await
            .unwrap();
        assert_eq!(hotels.ids(), vec!["1"]);
        assert_eq!(hotels.features[0].properties.name, "Clift Hotel");
    }

    #[tokio::test]
    async fn test_backend_failure_is_counted() {
        let store = Arc::new(FakeStore::default());
        store.add_point("h1", 1.0, 1.0);
        let frontend = frontend(&store);
        // Load the geo index, then break the store for the rate read
        frontend
            .search_hotels(&params(&[
                ("inDate", "2015-04-09"),
                ("outDate", "2015-04-10"),
                ("lat", "50.0"),
                ("lon", "50.0"),
            ]))
            .await
            .unwrap();
        store.fail_reads(true);

        let result = frontend
            .search_hotels(&params(&[
                ("inDate", "2015-04-09"),
                ("outDate", "2015-04-10"),
                ("lat", "1.0"),
                ("lon", "1.0"),
            ]))
            .await;
        assert!(matches!(result, Err(SearchError::Store(_))));
        assert_eq!(frontend.stats().get_error_count(ErrorType::StoreUnavailable), 1);
    }

    #[tokio::test]
    async fn test_search_leaves_out_full_hotels() {
        let store = Arc::new(FakeStore::default());
        store.add_point("h1", 1.0, 1.0);
        store.add_point("h2", 1.0, 1.0);
        store.add_rate(plan("h1", "A", 100.0));
        store.add_rate(plan("h2", "B", 150.0));
        store.add_profile(profile("h1", "First"));
        store.add_profile(profile("h2", "Second"));
        store.set_capacity("h2", 0);
        let frontend = frontend(&store);

        let hotels = frontend
            .search_hotels(&params(&[
                ("inDate", "2015-04-09"),
                ("outDate", "2015-04-10"),
                ("lat", "1.0"),
                ("lon", "1.0"),
            ]))
            .await
            .unwrap();
        assert_eq!(hotels.ids(), vec!["h1"]);
    }

    #[tokio::test]
    async fn test_reserve_until_full() {
        let store = Arc::new(FakeStore::default());
        store.set_capacity("h1", 2);
        let frontend = frontend(&store);
        let query = params(&[
            ("inDate", "2015-04-09"),
            ("outDate", "2015-04-10"),
            ("hotelId", "h1"),
            ("customerName", "Alice"),
            ("number", "2"),
        ]);

        let first = frontend.reserve(&query).await.unwrap();
        assert!(first.reserved, "{}", first.message);
        assert!(first.message.starts_with("Reserve successfully"));

        let second = frontend.reserve(&query).await.unwrap();
        assert!(!second.reserved);
        assert!(second.message.contains("h1"), "{}", second.message);
        assert_eq!(store.reservations().len(), 1);
    }

    #[tokio::test]
    async fn test_reserve_rejects_bad_dates_before_backends() {
        let store = Arc::new(FakeStore::default());
        let frontend = frontend(&store);

        let result = frontend
            .reserve(&params(&[
                ("inDate", "2015-4-9"),
                ("outDate", "2015-04-10"),
                ("hotelId", "h1"),
                ("customerName", "Alice"),
            ]))
            .await;
        assert!(matches!(result, Err(SearchError::InvalidArgument(_))));
        assert_eq!(store.room_reads(), 0);
        assert_eq!(frontend.stats().get_error_count(ErrorType::InvalidArgument), 1);
    }
}
