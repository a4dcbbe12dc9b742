//! Nearby-hotel search.
//!
//! [`GeoIndex`] answers K-nearest-neighbor queries over every hotel's
//! coordinates. The index is built on the first query from a full snapshot of
//! the point store and then kept for the life of the process; there is no
//! refresh path. A store failure during the build leaves a partial index
//! flagged as degraded instead of failing the request.

mod distance;
mod index;
mod types;

pub use distance::haversine_km;
pub use index::{GridIndex, Neighbor};
pub use types::{GeoPoint, GeoResult, NearbyRequest};

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::backend::{GeoPointReader, GeoService, RequestContext, SnapshotState};
use crate::config::{GEO_INDEX_RESOLUTION_KM, MAX_SEARCH_RADIUS_KM, MAX_SEARCH_RESULTS};
use crate::error_handling::{ErrorType, InfoType, SearchError, ServiceStats};

struct LoadedIndex {
    grid: GridIndex,
    state: SnapshotState,
}

/// Lazily built spatial index over the point store.
pub struct GeoIndex {
    reader: Arc<dyn GeoPointReader>,
    loaded: OnceCell<LoadedIndex>,
    stats: Arc<ServiceStats>,
}

impl GeoIndex {
    pub fn new(reader: Arc<dyn GeoPointReader>, stats: Arc<ServiceStats>) -> Self {
        GeoIndex {
            reader,
            loaded: OnceCell::new(),
            stats,
        }
    }

    /// Returns up to [`MAX_SEARCH_RESULTS`] hotel ids within
    /// [`MAX_SEARCH_RADIUS_KM`] of the point, nearest first.
    pub async fn nearby_ids(
        &self,
        ctx: &RequestContext,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<String>, SearchError> {
        let loaded = self.index(ctx).await?;
        let neighbors = loaded.grid.k_nearest(
            lat,
            lon,
            MAX_SEARCH_RESULTS,
            MAX_SEARCH_RADIUS_KM,
            accept_all,
        );
        log::debug!(
            "Nearby ({lat}, {lon}): {} of {} hotels",
            neighbors.len(),
            loaded.grid.len()
        );
        Ok(neighbors.into_iter().map(|n| n.point.id.clone()).collect())
    }

    /// State of the snapshot the index was built from, `None` before the first query.
    pub fn load_state(&self) -> Option<SnapshotState> {
        self.loaded.get().map(|l| l.state.clone())
    }

    pub fn is_degraded(&self) -> bool {
        self.loaded
            .get()
            .map(|l| l.state.is_degraded())
            .unwrap_or(false)
    }

    /// Concurrent first callers wait on the same build. If the building caller
    /// is cancelled the cell stays empty and the next caller builds instead.
    async fn index(&self, ctx: &RequestContext) -> Result<&LoadedIndex, SearchError> {
        if let Some(loaded) = self.loaded.get() {
            return Ok(loaded);
        }
        ctx.run(self.loaded.get_or_init(|| self.build())).await
    }

    async fn build(&self) -> LoadedIndex {
        let (points, degraded) = match self.reader.find_all_points().await {
            Ok(points) => (points, None),
            Err(e) => {
                log::warn!("Failed to load geo points, building index from partial data: {e}");
                self.stats.increment_error(ErrorType::GeoIndexDegraded);
                (Vec::new(), Some(e.to_string()))
            }
        };

        let grid = GridIndex::from_points(GEO_INDEX_RESOLUTION_KM, points);
        log::info!("Geo index built with {} hotels", grid.len());
        self.stats.increment_info(InfoType::GeoIndexBuilt);

        LoadedIndex {
            state: SnapshotState {
                records: grid.len(),
                degraded,
            },
            grid,
        }
    }
}

/// Candidate filter for nearby queries. Every indexed hotel is eligible.
fn accept_all(_: &GeoPoint) -> bool {
    true
}

#[async_trait]
impl GeoService for GeoIndex {
    async fn nearby(
        &self,
        ctx: &RequestContext,
        request: &NearbyRequest,
    ) -> Result<GeoResult, SearchError> {
        let hotel_ids = self.nearby_ids(ctx, request.lat, request.lon).await?;
        Ok(GeoResult { hotel_ids })
    }
}
