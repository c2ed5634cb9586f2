// Seeded k-means — linfa-clustering with a per-fit Xoshiro generator.
//
// k at or above the number of distinct points is solved directly.

use std::collections::HashSet;

use linfa::traits::Fit;
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use tracing::debug;

use super::traits::Clusterer;
use super::{validate_points, ClusterError};

/// Lloyd's k-means with k-means++ initialisation and several restarts,
/// keeping the run with the lowest inertia.
#[derive(Debug, Clone)]
pub struct KMeansClusterer {
    /// Number of independent initialisations (best inertia wins)
    pub n_runs: usize,
    /// Iteration cap for a single run
    pub max_iterations: u64,
    /// Convergence tolerance on centroid movement
    pub tolerance: f64,
}

impl Default for KMeansClusterer {
    fn default() -> Self {
        Self {
            n_runs: 10,
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }
}

impl Clusterer for KMeansClusterer {
    fn fit(&self, points: &[Vec<f64>], k: usize, seed: u64) -> Result<Vec<Vec<f64>>, ClusterError> {
        let dim = validate_points(points, k)?;

        if let Some(centroids) = exact_partition(points, k) {
            debug!(k, n = points.len(), "k covers every distinct point, skipping k-means");
            return Ok(centroids);
        }

        let flat: Vec<f64> = points.iter().flatten().copied().collect();
        let data = Array2::from_shape_vec((points.len(), dim), flat)
            .map_err(|e| ClusterError::Fit(e.to_string()))?;
        let dataset = DatasetBase::from(data);

        let rng = Xoshiro256Plus::seed_from_u64(seed);
        let model = KMeans::params_with_rng(k, rng)
            .n_runs(self.n_runs)
            .max_n_iterations(self.max_iterations)
            .tolerance(self.tolerance)
            .fit(&dataset)
            .map_err(|e| ClusterError::Fit(e.to_string()))?;

        let centroids: Vec<Vec<f64>> = model
            .centroids()
            .outer_iter()
            .map(|row| row.to_vec())
            .collect();

        debug!(k, n = points.len(), dim, seed, "Fitted k-means centroids");

        Ok(centroids)
    }
}

/// Centroids for the case where `k` reaches the number of distinct points:
/// distinct points in first-occurrence order, then repeated points in index
/// order, truncated to `k`. Returns `None` when k-means actually has work to do.
fn exact_partition(points: &[Vec<f64>], k: usize) -> Option<Vec<Vec<f64>>> {
    let mut seen: HashSet<Vec<u64>> = HashSet::with_capacity(points.len());
    let mut distinct = Vec::new();
    let mut repeated = Vec::new();

    for point in points {
        let key: Vec<u64> = point.iter().map(|v| v.to_bits()).collect();
        if seen.insert(key) {
            distinct.push(point.clone());
        } else {
            repeated.push(point.clone());
        }
    }

    if k < distinct.len() {
        return None;
    }

    Some(distinct.into_iter().chain(repeated).take(k).collect())
}
