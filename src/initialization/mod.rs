//! Application initialization and resource setup.
//!
//! This module wires the shared resources of the service:
//! - Logger
//! - SQLite point store and the in-memory cache shared by rates and room counts
//! - The geo/rate/recommendation/profile/reservation services and the orchestrator
//!
//! The returned [`SearchStack`] owns everything a request needs.

mod logger;

use std::sync::Arc;

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::error_handling::ServiceStats;
use crate::frontend::Frontend;
use crate::geo::GeoIndex;
use crate::profile::ProfileDirectory;
use crate::rate::RateCache;
use crate::recommendation::RecommendationSelector;
use crate::reservation::ReservationBook;
use crate::search::SearchOrchestrator;
use crate::storage::SqliteStore;

pub use logger::init_logger_with;

/// Every service of one process, wired together.
#[derive(Clone)]
pub struct SearchStack {
    pub geo: Arc<GeoIndex>,
    pub rates: Arc<RateCache>,
    pub recommendations: Arc<RecommendationSelector>,
    pub profiles: Arc<ProfileDirectory>,
    pub reservations: Arc<ReservationBook>,
    pub orchestrator: Arc<SearchOrchestrator>,
    pub frontend: Arc<Frontend>,
    pub stats: Arc<ServiceStats>,
}

/// Builds the service graph over a point store and the configured cache.
///
/// Nothing is read from the store here: the geo index and the recommendation
/// table load lazily on their first request.
pub fn init_search_stack(store: Arc<SqliteStore>, config: &Config) -> SearchStack {
    let stats = Arc::new(ServiceStats::new());
    let cache = Arc::new(MemoryCache::new(config.cache_ttl(), config.cache_capacity));

    let geo = Arc::new(GeoIndex::new(store.clone(), Arc::clone(&stats)));
    let rates = Arc::new(RateCache::new(
        store.clone(),
        cache.clone(),
        Arc::clone(&stats),
    ));
    let recommendations = Arc::new(RecommendationSelector::new(
        store.clone(),
        Arc::clone(&stats),
    ));
    let profiles = Arc::new(ProfileDirectory::new(store.clone()));
    let reservations = Arc::new(ReservationBook::new(
        store.clone(),
        store,
        cache,
        Arc::clone(&stats),
    ));

    let orchestrator = Arc::new(SearchOrchestrator::new(
        geo.clone(),
        rates.clone(),
        recommendations.clone(),
        profiles.clone(),
        reservations.clone(),
    ));
    let frontend = Arc::new(Frontend::new(
        Arc::clone(&orchestrator),
        Arc::clone(&stats),
        config.request_timeout(),
    ));

    SearchStack {
        geo,
        rates,
        recommendations,
        profiles,
        reservations,
        orchestrator,
        frontend,
        stats,
    }
}
