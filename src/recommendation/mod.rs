//! Extremal-candidate recommendations.
//!
//! The hotel table is read from the primary store on the first request and
//! kept until restart. Each query scans it twice: once for the best value of
//! the chosen metric, once to collect every hotel that reaches it.

mod types;

pub use types::{Criterion, HotelMeta, RecommendationRequest, RecommendationResult};

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::backend::{HotelMetaReader, RecommendationService, RequestContext, SnapshotState};
use crate::config::MAX_RECOMMENDATION_RESULTS;
use crate::error_handling::{ErrorType, InfoType, SearchError, ServiceStats};
use crate::geo::haversine_km;

struct HotelTable {
    // Ordered by id so ties always resolve the same way
    hotels: BTreeMap<String, HotelMeta>,
    state: SnapshotState,
}

pub struct RecommendationSelector {
    reader: Arc<dyn HotelMetaReader>,
    table: OnceCell<HotelTable>,
    stats: Arc<ServiceStats>,
}

impl RecommendationSelector {
    pub fn new(reader: Arc<dyn HotelMetaReader>, stats: Arc<ServiceStats>) -> Self {
        RecommendationSelector {
            reader,
            table: OnceCell::new(),
            stats,
        }
    }

    /// Parses `criterion` and selects. An unknown criterion is rejected before
    /// the table is touched.
    pub async fn select(
        &self,
        ctx: &RequestContext,
        lat: f64,
        lon: f64,
        criterion: &str,
    ) -> Result<Vec<String>, SearchError> {
        let criterion: Criterion = criterion.parse()?;
        self.select_by(ctx, lat, lon, criterion).await
    }

    /// Returns up to [`MAX_RECOMMENDATION_RESULTS`] hotels sharing the best
    /// value of `criterion`: smallest distance, highest rate or lowest price.
    pub async fn select_by(
        &self,
        ctx: &RequestContext,
        lat: f64,
        lon: f64,
        criterion: Criterion,
    ) -> Result<Vec<String>, SearchError> {
        let table = self.table(ctx).await?;
        let hotel_ids = match criterion {
            Criterion::Distance => {
                extremal(&table.hotels, |h| haversine_km(lat, lon, h.lat, h.lon), Best::Min)
            }
            Criterion::Rate => extremal(&table.hotels, |h| h.rate, Best::Max),
            Criterion::Price => extremal(&table.hotels, |h| h.price, Best::Min),
        };
        log::debug!(
            "Recommend by {criterion} at ({lat}, {lon}): {} hotels",
            hotel_ids.len()
        );
        Ok(hotel_ids)
    }

    pub fn load_state(&self) -> Option<SnapshotState> {
        self.table.get().map(|t| t.state.clone())
    }

    pub fn is_degraded(&self) -> bool {
        self.table
            .get()
            .map(|t| t.state.is_degraded())
            .unwrap_or(false)
    }

    async fn table(&self, ctx: &RequestContext) -> Result<&HotelTable, SearchError> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        ctx.run(self.table.get_or_init(|| self.load())).await
    }

    async fn load(&self) -> HotelTable {
        let (rows, degraded) = match self.reader.find_all_hotels().await {
            Ok(rows) => (rows, None),
            Err(e) => {
                log::warn!("Failed to load hotel metadata, recommending from partial data: {e}");
                self.stats.increment_error(ErrorType::RecommendationsDegraded);
                (Vec::new(), Some(e.to_string()))
            }
        };

        let hotels: BTreeMap<String, HotelMeta> =
            rows.into_iter().map(|h| (h.id.clone(), h)).collect();
        log::info!("Loaded {} hotels for recommendations", hotels.len());
        self.stats.increment_info(InfoType::RecommendationsLoaded);

        HotelTable {
            state: SnapshotState {
                records: hotels.len(),
                degraded,
            },
            hotels,
        }
    }
}

#[derive(Clone, Copy)]
enum Best {
    Min,
    Max,
}

fn extremal<F>(hotels: &BTreeMap<String, HotelMeta>, metric: F, best: Best) -> Vec<String>
where
    F: Fn(&HotelMeta) -> f64,
{
    let start = match best {
        Best::Min => f64::INFINITY,
        Best::Max => f64::NEG_INFINITY,
    };
    let target = hotels.values().map(&metric).fold(start, |acc, v| match best {
        Best::Min => acc.min(v),
        Best::Max => acc.max(v),
    });

    hotels
        .values()
        .filter(|h| metric(*h) == target)
        .take(MAX_RECOMMENDATION_RESULTS)
        .map(|h| h.id.clone())
        .collect()
}

#[async_trait]
impl RecommendationService for RecommendationSelector {
    async fn get_recommendations(
        &self,
        ctx: &RequestContext,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, SearchError> {
        let hotel_ids = self
            .select_by(ctx, request.lat, request.lon, request.criterion)
            .await?;
        Ok(RecommendationResult { hotel_ids })
    }
}
