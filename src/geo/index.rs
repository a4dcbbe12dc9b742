//! Grid-clustered spatial index.
//!
//! Points are bucketed into fixed-size latitude/longitude cells. A
//! K-nearest query scans only the block of cells that can contain a point
//! within the search radius, then ranks those candidates by great-circle
//! distance.

use std::collections::{HashMap, HashSet};

use super::distance::haversine_km;
use super::types::GeoPoint;
use crate::config::KM_PER_DEGREE;

/// A point returned by [`GridIndex::k_nearest`] with its distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<'a> {
    pub point: &'a GeoPoint,
    pub distance_km: f64,
}

type Cell = (i64, i64);

/// In-memory spatial index over hotel coordinates.
#[derive(Debug)]
pub struct GridIndex {
    cell_deg: f64,
    rows: i64,
    cols: i64,
    cells: HashMap<Cell, Vec<GeoPoint>>,
    ids: HashSet<String>,
}

impl GridIndex {
    /// Creates an empty index whose cells are `resolution_km` on a side
    /// (measured along a meridian).
    pub fn new(resolution_km: f64) -> Self {
        let cell_deg = (resolution_km / KM_PER_DEGREE).clamp(1e-4, 90.0);
        GridIndex {
            cell_deg,
            rows: (180.0 / cell_deg).ceil() as i64,
            cols: (360.0 / cell_deg).ceil() as i64,
            cells: HashMap::new(),
            ids: HashSet::new(),
        }
    }

    /// Builds an index from a point set. Later duplicates of an id are ignored.
    pub fn from_points(resolution_km: f64, points: impl IntoIterator<Item = GeoPoint>) -> Self {
        let mut index = GridIndex::new(resolution_km);
        for point in points {
            index.add(point);
        }
        index
    }

    /// Adds a point. Returns `false` if the id is already indexed or the
    /// coordinates are not finite.
    pub fn add(&mut self, point: GeoPoint) -> bool {
        if !point.lat.is_finite() || !point.lon.is_finite() {
            log::warn!("Skipping hotel {} with invalid coordinates", point.id);
            return false;
        }
        if !self.ids.insert(point.id.clone()) {
            log::debug!("Duplicate geo point for hotel {}", point.id);
            return false;
        }
        let cell = (self.row_of(point.lat), self.col_of(point.lon));
        self.cells.entry(cell).or_default().push(point);
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns up to `k` points within `max_km` of the query that pass
    /// `accept`, nearest first. Equal distances are ordered by id.
    pub fn k_nearest<F>(&self, lat: f64, lon: f64, k: usize, max_km: f64, accept: F) -> Vec<Neighbor<'_>>
    where
        F: Fn(&GeoPoint) -> bool,
    {
        if k == 0 || self.is_empty() || !lat.is_finite() || !lon.is_finite() {
            return Vec::new();
        }

        let mut found: Vec<Neighbor<'_>> = self
            .candidate_cells(lat, lon, max_km)
            .into_iter()
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .filter(|p| accept(*p))
            .filter_map(|p| {
                let distance_km = haversine_km(lat, lon, p.lat, p.lon);
                (distance_km <= max_km).then_some(Neighbor {
                    point: p,
                    distance_km,
                })
            })
            .collect();

        found.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.point.id.cmp(&b.point.id))
        });
        found.truncate(k);
        found
    }

    /// Cells overlapping the bounding box of the search circle.
    fn candidate_cells(&self, lat: f64, lon: f64, max_km: f64) -> Vec<Cell> {
        let lat_span = max_km / KM_PER_DEGREE;
        let first_row = self.row_of(lat - lat_span);
        let last_row = self.row_of(lat + lat_span);

        // widest longitude span happens at the poleward edge of the box
        let edge_lat = (lat.abs() + lat_span).min(90.0);
        let cos = edge_lat.to_radians().cos();
        let lon_span = if cos > 1e-9 {
            max_km / (KM_PER_DEGREE * cos)
        } else {
            f64::INFINITY
        };

        let columns: Vec<i64> = if lon_span >= 180.0 {
            (0..self.cols).collect()
        } else {
            let base = normalize_lon(lon) + 180.0;
            let first = ((base - lon_span) / self.cell_deg).floor() as i64;
            let last = ((base + lon_span) / self.cell_deg).floor() as i64;
            if last - first + 1 >= self.cols {
                (0..self.cols).collect()
            } else {
                (first..=last).map(|c| c.rem_euclid(self.cols)).collect()
            }
        };

        let mut cells = Vec::with_capacity(((last_row - first_row + 1) as usize) * columns.len());
        for row in first_row..=last_row {
            for &col in &columns {
                cells.push((row, col));
            }
        }
        cells
    }

    fn row_of(&self, lat: f64) -> i64 {
        let row = ((lat.clamp(-90.0, 90.0) + 90.0) / self.cell_deg).floor() as i64;
        row.clamp(0, self.rows - 1)
    }

    fn col_of(&self, lon: f64) -> i64 {
        (((normalize_lon(lon) + 180.0) / self.cell_deg).floor() as i64).rem_euclid(self.cols)
    }
}

/// Maps any longitude into [-180, 180).
fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
