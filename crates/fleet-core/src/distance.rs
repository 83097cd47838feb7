//! Pairwise distances between mission route centroids.

use std::collections::HashMap;

use crate::geo::haversine_distance;
use crate::models::Mission;

/// Fallback distance in meters for mission pairs absent from the matrix.
///
/// Not an "infeasible" marker: a sentinel-priced candidate still takes part
/// in greedy minimum selection and can be chosen if the budget covers it.
pub const SENTINEL_DISTANCE_M: f64 = 100_000.0;

/// Symmetric lookup of geodesic distances between mission centroids.
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    entries: HashMap<(i64, i64), f64>,
}

impl DistanceMatrix {
    /// Precompute every unordered pair for the candidate mission set.
    pub fn build(missions: &[Mission]) -> Self {
        let mut matrix = Self::default();
        for (i, a) in missions.iter().enumerate() {
            for b in &missions[i + 1..] {
                let (lat_a, lon_a) = a.route.centroid();
                let (lat_b, lon_b) = b.route.centroid();
                matrix.insert(a.id, b.id, haversine_distance(lat_a, lon_a, lat_b, lon_b));
            }
        }
        matrix
    }

    pub fn insert(&mut self, a: i64, b: i64, meters: f64) {
        self.entries.insert(Self::key(a, b), meters);
    }

    /// Distance from `from` to mission `to`.
    ///
    /// `None` means the drone's base and always costs 0. A pair missing
    /// from the matrix returns [`SENTINEL_DISTANCE_M`].
    pub fn distance(&self, from: Option<i64>, to: i64) -> f64 {
        let Some(origin) = from else {
            return 0.0;
        };
        self.entries
            .get(&Self::key(origin, to))
            .copied()
            .unwrap_or(SENTINEL_DISTANCE_M)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(a: i64, b: i64) -> (i64, i64) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}
