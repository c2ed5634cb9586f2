// Sentence selector — cluster count, seeded fit, greedy nearest-unique pick.
//
// The pick is greedy in centroid order, not a minimum-cost matching.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::kmeans::KMeansClusterer;
use super::traits::Clusterer;
use super::{euclidean_distance, ClusterError};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 12345;

/// Number of clusters for `n` sentences.
///
/// An explicit count wins and is clamped to `n`; otherwise `floor(n * ratio)`
/// with a floor of one cluster. Zero only for an explicit zero or empty input.
pub fn determine_cardinality(n: usize, ratio: f64, explicit_count: Option<usize>) -> usize {
    if n == 0 {
        return 0;
    }

    match explicit_count {
        Some(count) => count.min(n),
        None => ((n as f64 * ratio).floor() as usize).clamp(1, n),
    }
}

/// Map each centroid (by enumeration order) to the nearest sentence not
/// already claimed by an earlier centroid.
///
/// Sentences are scanned in ascending index order and a candidate replaces
/// the current best only when strictly closer, so ties go to the lower index.
pub fn assign_nearest_unique(
    centroids: &[Vec<f64>],
    embeddings: &[Vec<f64>],
) -> BTreeMap<usize, usize> {
    let mut used: HashSet<usize> = HashSet::with_capacity(centroids.len());
    let mut assignment = BTreeMap::new();

    for (cluster_id, centroid) in centroids.iter().enumerate() {
        let mut best: Option<(usize, f64)> = None;

        for (index, embedding) in embeddings.iter().enumerate() {
            if used.contains(&index) {
                continue;
            }
            let distance = euclidean_distance(embedding, centroid);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((index, distance)),
            }
        }

        match best {
            Some((index, _)) => {
                used.insert(index);
                assignment.insert(cluster_id, index);
            }
            None => debug!(cluster_id, "No unused sentence left for centroid"),
        }
    }

    assignment
}

/// Per-request sentence selector. Holds no fitted state between calls;
/// build one per summarization and drop it afterwards.
#[derive(Debug, Clone)]
pub struct ClusterSelector<C: Clusterer = KMeansClusterer> {
    clusterer: C,
    seed: u64,
}

impl ClusterSelector<KMeansClusterer> {
    /// Selector backed by the default k-means clusterer.
    pub fn new(seed: u64) -> Self {
        Self::with_clusterer(KMeansClusterer::default(), seed)
    }
}

impl<C: Clusterer> ClusterSelector<C> {
    pub fn with_clusterer(clusterer: C, seed: u64) -> Self {
        Self { clusterer, seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Select representative sentence indices, sorted ascending and unique.
    ///
    /// Returns an empty list without clustering when the cardinality is zero
    /// (explicit zero count or no embeddings).
    pub fn select(
        &self,
        embeddings: &[Vec<f64>],
        ratio: f64,
        explicit_count: Option<usize>,
    ) -> Result<Vec<usize>, ClusterError> {
        let k = determine_cardinality(embeddings.len(), ratio, explicit_count);
        if k == 0 {
            debug!(n = embeddings.len(), "Cluster cardinality is zero, nothing to select");
            return Ok(Vec::new());
        }

        let centroids = self.clusterer.fit(embeddings, k, self.seed)?;
        let assignment = assign_nearest_unique(&centroids, embeddings);

        let mut indices: Vec<usize> = assignment.into_values().collect();
        indices.sort_unstable();
        indices.dedup();

        debug!(n = embeddings.len(), k, selected = ?indices, "Selected representative sentences");

        Ok(indices)
    }
}
