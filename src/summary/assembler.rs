// End-to-end extractive summarization.
//
// Stages run strictly in order and nothing survives between calls: every
// summarize() builds its own ClusterSelector and drops it when done.
// Collaborators, the clustering backend included, are shared read-only
// behind Arc.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::cluster::kmeans::KMeansClusterer;
use crate::cluster::selector::{ClusterSelector, DEFAULT_SEED};
use crate::cluster::traits::Clusterer;
use crate::embed::traits::{LayerSelection, SentenceEmbedder};
use crate::segment::traits::{SentenceSegmenter, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};

/// Default share of candidate sentences kept when no explicit count is given.
pub const DEFAULT_SENT_RATIO: f64 = 0.2;

/// Per-call summarization knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryParams {
    /// Share of candidate sentences to keep (ignored when `num_sentences` is set)
    pub sent_ratio: f64,
    /// Exact number of sentences to keep, clamped to the candidate count
    pub num_sentences: Option<usize>,
    /// Exclusive lower bound on sentence length, in characters
    pub min_length: usize,
    /// Exclusive upper bound on sentence length, in characters
    pub max_length: usize,
    /// Always include the first candidate sentence
    pub use_first_sent: bool,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            sent_ratio: DEFAULT_SENT_RATIO,
            num_sentences: None,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            use_first_sent: true,
        }
    }
}

/// A finished summary along with how it was built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Selected sentences joined with single spaces, in document order
    pub text: String,
    /// Indices into the candidate sentences, ascending
    pub selected: Vec<usize>,
    /// Number of sentences that survived segmentation and length filtering
    pub candidate_count: usize,
}

impl Summary {
    fn empty() -> Self {
        Self {
            text: String::new(),
            selected: Vec::new(),
            candidate_count: 0,
        }
    }
}

/// Orchestrates the summarization pipeline over injected collaborators.
#[derive(Clone)]
pub struct SummaryAssembler {
    segmenter: Arc<dyn SentenceSegmenter>,
    embedder: Arc<dyn SentenceEmbedder>,
    clusterer: Arc<dyn Clusterer + Send + Sync>,
    layers: LayerSelection,
    seed: u64,
}

impl SummaryAssembler {
    pub fn new(segmenter: Arc<dyn SentenceSegmenter>, embedder: Arc<dyn SentenceEmbedder>) -> Self {
        Self {
            segmenter,
            embedder,
            clusterer: Arc::new(KMeansClusterer::default()),
            layers: LayerSelection::default(),
            seed: DEFAULT_SEED,
        }
    }

    /// Hidden layer(s) the embedder pools sentence vectors from.
    pub fn with_layers(mut self, layers: LayerSelection) -> Self {
        self.layers = layers;
        self
    }

    /// Clustering backend; k-means unless replaced.
    pub fn with_clusterer(mut self, clusterer: Arc<dyn Clusterer + Send + Sync>) -> Self {
        self.clusterer = clusterer;
        self
    }

    /// Seed threaded into every clustering fit.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Summarize `content`, returning only the summary text.
    pub async fn summarize(&self, content: &str, params: &SummaryParams) -> Result<String> {
        Ok(self.summarize_detailed(content, params).await?.text)
    }

    /// Summarize `content`, returning the text plus the selected indices.
    ///
    /// No candidate sentences is not an error: the summary is empty.
    pub async fn summarize_detailed(&self, content: &str, params: &SummaryParams) -> Result<Summary> {
        let sentences = self
            .segmenter
            .segment(content, params.min_length, params.max_length)
            .context("Sentence segmentation failed")?;

        if sentences.is_empty() {
            debug!("No sentences within length bounds, returning empty summary");
            return Ok(Summary::empty());
        }

        let embeddings = self
            .embedder
            .embed(&sentences, &self.layers)
            .await
            .context("Sentence embedding failed")?;

        if embeddings.len() != sentences.len() {
            anyhow::bail!(
                "Embedder returned {} vectors for {} sentences",
                embeddings.len(),
                sentences.len()
            );
        }

        let selector = ClusterSelector::with_clusterer(Arc::clone(&self.clusterer), self.seed);
        let selected = selector.select(&embeddings, params.sent_ratio, params.num_sentences)?;
        let selected = apply_lead_policy(selected, params.use_first_sent);

        let text = join_sentences(&sentences, &selected);

        debug!(
            candidates = sentences.len(),
            selected = ?selected,
            summary_chars = text.chars().count(),
            "Assembled summary"
        );

        Ok(Summary {
            text,
            selected,
            candidate_count: sentences.len(),
        })
    }
}

/// Force the lead sentence (index 0) into a sorted selection when requested.
/// With `use_first_sent` false the selection passes through untouched.
pub fn apply_lead_policy(mut selected: Vec<usize>, use_first_sent: bool) -> Vec<usize> {
    if use_first_sent && selected.first() != Some(&0) {
        selected.insert(0, 0);
    }
    selected
}

/// Join the sentences at `indices` (ascending) with single spaces.
pub fn join_sentences(sentences: &[String], indices: &[usize]) -> String {
    indices
        .iter()
        .filter_map(|&i| sentences.get(i).map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
