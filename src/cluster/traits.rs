// Clusterer trait — the swap-ready abstraction over the k-means backend.
//
// Implementations must be deterministic for a fixed seed: same points, same k
// and same seed give the same centroids in the same order.

use std::sync::Arc;

use super::ClusterError;

/// Trait for partitioning embeddings into `k` clusters.
pub trait Clusterer {
    /// Fit `k` clusters over `points` and return their centroids, one per
    /// cluster, enumerated in cluster label order.
    fn fit(&self, points: &[Vec<f64>], k: usize, seed: u64) -> Result<Vec<Vec<f64>>, ClusterError>;
}

/// Shared clusterers fit through the pointer, so one backend can serve
/// every per-request selector.
impl<C: Clusterer + ?Sized> Clusterer for Arc<C> {
    fn fit(&self, points: &[Vec<f64>], k: usize, seed: u64) -> Result<Vec<Vec<f64>>, ClusterError> {
        (**self).fit(points, k, seed)
    }
}
