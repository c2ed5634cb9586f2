// Sentence selection — seeded clustering plus greedy nearest-sentence assignment.
//
// The Clusterer trait hides the k-means backend. ClusterSelector turns an
// embedding matrix into a sorted set of representative sentence indices.

pub mod kmeans;
pub mod selector;
pub mod traits;

use thiserror::Error;

/// Failures of the clustering stage. Surfaced to callers unchanged; never retried.
#[derive(Debug, Error, PartialEq)]
pub enum ClusterError {
    #[error("cannot cluster an empty embedding matrix")]
    EmptyInput,

    #[error("invalid cluster count {k} for {n} embeddings")]
    InvalidClusterCount { k: usize, n: usize },

    #[error("embedding row {row} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("embedding row {row} contains a non-finite value at column {col}")]
    NonFiniteValue { row: usize, col: usize },

    #[error("k-means fit failed: {0}")]
    Fit(String),
}

/// Check that `points` is a non-empty, rectangular, finite matrix and that
/// `k` is a usable cluster count for it. Returns the embedding dimension.
pub fn validate_points(points: &[Vec<f64>], k: usize) -> Result<usize, ClusterError> {
    let first = points.first().ok_or(ClusterError::EmptyInput)?;
    let dim = first.len();

    if k == 0 || k > points.len() {
        return Err(ClusterError::InvalidClusterCount { k, n: points.len() });
    }

    for (row, point) in points.iter().enumerate() {
        if point.len() != dim {
            return Err(ClusterError::DimensionMismatch {
                row,
                expected: dim,
                found: point.len(),
            });
        }
        if let Some(col) = point.iter().position(|v| !v.is_finite()) {
            return Err(ClusterError::NonFiniteValue { row, col });
        }
    }

    Ok(dim)
}

/// Euclidean distance between two vectors of equal length.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
