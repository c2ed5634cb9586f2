// Composition tests — the full summarization pipeline with deterministic
// collaborators.
//
// Segmentation -> Embedding -> Selection -> Lead policy -> Join, without
// model files: embeddings come from a fixed table keyed by position.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use precis::cluster::selector::{ClusterSelector, DEFAULT_SEED};
use precis::cluster::traits::Clusterer;
use precis::cluster::ClusterError;
use precis::embed::traits::{LayerSelection, SentenceEmbedder};
use precis::segment::rules::RuleSegmenter;
use precis::segment::traits::SentenceSegmenter;
use precis::summary::assembler::{SummaryAssembler, SummaryParams};

/// Segmenter returning a fixed list regardless of input.
struct FixedSegmenter(Vec<String>);

impl SentenceSegmenter for FixedSegmenter {
    fn segment(&self, _text: &str, _min: usize, _max: usize) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

struct FailingSegmenter;

impl SentenceSegmenter for FailingSegmenter {
    fn segment(&self, _text: &str, _min: usize, _max: usize) -> Result<Vec<String>> {
        anyhow::bail!("segmenter offline")
    }
}

/// Embedder returning row `i` of a table for sentence `i`.
struct TableEmbedder(Vec<Vec<f64>>);

#[async_trait]
impl SentenceEmbedder for TableEmbedder {
    async fn embed(&self, sentences: &[String], _layers: &LayerSelection) -> Result<Vec<Vec<f64>>> {
        Ok(self.0.iter().take(sentences.len()).cloned().collect())
    }
}

struct FailingEmbedder;

#[async_trait]
impl SentenceEmbedder for FailingEmbedder {
    async fn embed(&self, _: &[String], _: &LayerSelection) -> Result<Vec<Vec<f64>>> {
        anyhow::bail!("embedding backend unavailable")
    }
}

/// Embedder that remembers the layer selection of its last call.
#[derive(Default)]
struct RecordingEmbedder {
    layers: Mutex<Option<LayerSelection>>,
}

#[async_trait]
impl SentenceEmbedder for RecordingEmbedder {
    async fn embed(&self, sentences: &[String], layers: &LayerSelection) -> Result<Vec<Vec<f64>>> {
        *self.layers.lock().unwrap() = Some(layers.clone());
        Ok((0..sentences.len()).map(|i| vec![i as f64]).collect())
    }
}

/// Clusterer that records the seed and k it was asked for and returns
/// fixed centroids.
struct RecordingClusterer {
    centroids: Vec<Vec<f64>>,
    calls: Mutex<Vec<(usize, u64)>>,
}

impl RecordingClusterer {
    fn new(centroids: Vec<Vec<f64>>) -> Self {
        Self {
            centroids,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl Clusterer for RecordingClusterer {
    fn fit(&self, _points: &[Vec<f64>], k: usize, seed: u64) -> Result<Vec<Vec<f64>>, ClusterError> {
        self.calls.lock().unwrap().push((k, seed));
        Ok(self.centroids.iter().take(k).cloned().collect())
    }
}

fn sentences(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Sentence number {i}.")).collect()
}

/// Two well-separated groups: indices 0..3 near the origin, 3..6 far away.
fn grouped_table() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 0.0],
        vec![0.2, 0.1],
        vec![0.1, 0.3],
        vec![8.0, 8.0],
        vec![8.1, 7.9],
        vec![7.8, 8.2],
    ]
}

fn assembler(n: usize, table: Vec<Vec<f64>>) -> SummaryAssembler {
    SummaryAssembler::new(
        Arc::new(FixedSegmenter(sentences(n))),
        Arc::new(TableEmbedder(table)),
    )
}

// ============================================================
// Short-circuits
// ============================================================

#[tokio::test]
async fn empty_segmentation_gives_empty_summary() {
    let asm = SummaryAssembler::new(
        Arc::new(FixedSegmenter(vec![])),
        Arc::new(FailingEmbedder),
    );
    let summary = asm.summarize("anything", &SummaryParams::default()).await.unwrap();
    assert_eq!(summary, "");
}

#[tokio::test]
async fn zero_sentences_with_lead_policy_keeps_first() {
    let asm = assembler(6, grouped_table());
    let params = SummaryParams {
        num_sentences: Some(0),
        ..SummaryParams::default()
    };
    let summary = asm.summarize_detailed("text", &params).await.unwrap();
    assert_eq!(summary.selected, vec![0]);
    assert_eq!(summary.text, "Sentence number 0.");
}

#[tokio::test]
async fn zero_sentences_without_lead_policy_is_empty() {
    let asm = assembler(6, grouped_table());
    let params = SummaryParams {
        num_sentences: Some(0),
        use_first_sent: false,
        ..SummaryParams::default()
    };
    let summary = asm.summarize_detailed("text", &params).await.unwrap();
    assert!(summary.selected.is_empty());
    assert_eq!(summary.text, "");
    assert_eq!(summary.candidate_count, 6);
}

// ============================================================
// Lead policy and ordering
// ============================================================

#[tokio::test]
async fn lead_policy_always_includes_first_sentence() {
    let asm = assembler(6, grouped_table());
    for ratio in [0.2, 0.4, 0.6, 1.0] {
        let params = SummaryParams {
            sent_ratio: ratio,
            ..SummaryParams::default()
        };
        let summary = asm.summarize_detailed("text", &params).await.unwrap();
        assert_eq!(summary.selected.first(), Some(&0), "ratio = {ratio}");
        assert!(summary.selected.windows(2).all(|w| w[0] < w[1]));
    }
}

#[tokio::test]
async fn without_lead_policy_output_equals_raw_selection() {
    let table = grouped_table();
    let asm = assembler(6, table.clone());
    let params = SummaryParams {
        sent_ratio: 0.4,
        use_first_sent: false,
        ..SummaryParams::default()
    };
    let summary = asm.summarize_detailed("text", &params).await.unwrap();
    let raw = ClusterSelector::new(DEFAULT_SEED)
        .select(&table, 0.4, None)
        .unwrap();
    assert_eq!(summary.selected, raw);
}

#[tokio::test]
async fn summary_joins_selected_sentences_in_document_order() {
    let asm = assembler(6, grouped_table());
    let params = SummaryParams {
        sent_ratio: 0.4,
        use_first_sent: false,
        ..SummaryParams::default()
    };
    let summary = asm.summarize_detailed("text", &params).await.unwrap();

    assert_eq!(summary.selected.len(), 2);
    assert!(summary.selected[0] < 3 && summary.selected[1] >= 3);
    let expected = format!(
        "Sentence number {}. Sentence number {}.",
        summary.selected[0], summary.selected[1]
    );
    assert_eq!(summary.text, expected);
}

#[tokio::test]
async fn explicit_count_is_clamped_to_candidates() {
    let asm = assembler(4, grouped_table());
    let params = SummaryParams {
        num_sentences: Some(10),
        ..SummaryParams::default()
    };
    let summary = asm.summarize_detailed("text", &params).await.unwrap();
    assert_eq!(summary.selected, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn pipeline_is_deterministic() {
    let asm = assembler(6, grouped_table());
    let params = SummaryParams {
        sent_ratio: 0.5,
        ..SummaryParams::default()
    };
    let first = asm.summarize("text", &params).await.unwrap();
    for _ in 0..3 {
        assert_eq!(asm.summarize("text", &params).await.unwrap(), first);
    }
}

// ============================================================
// Configuration reaches the collaborators
// ============================================================

#[tokio::test]
async fn layer_selection_is_passed_to_the_embedder() {
    let embedder = Arc::new(RecordingEmbedder::default());
    let asm = SummaryAssembler::new(Arc::new(FixedSegmenter(sentences(5))), embedder.clone())
        .with_layers(LayerSelection::Many(vec![-2, -1]));

    asm.summarize("text", &SummaryParams::default()).await.unwrap();

    assert_eq!(
        *embedder.layers.lock().unwrap(),
        Some(LayerSelection::Many(vec![-2, -1]))
    );
}

#[tokio::test]
async fn default_layer_selection_is_the_last_layer() {
    let embedder = Arc::new(RecordingEmbedder::default());
    let asm = SummaryAssembler::new(Arc::new(FixedSegmenter(sentences(3))), embedder.clone());

    asm.summarize("text", &SummaryParams::default()).await.unwrap();

    assert_eq!(
        *embedder.layers.lock().unwrap(),
        Some(LayerSelection::Single(-1))
    );
}

#[tokio::test]
async fn configured_seed_reaches_every_fit() {
    let clusterer = Arc::new(RecordingClusterer::new(vec![vec![4.0, 4.0], vec![0.0, 0.0]]));
    let asm = assembler(6, grouped_table())
        .with_clusterer(clusterer.clone())
        .with_seed(987);
    let params = SummaryParams {
        sent_ratio: 0.4,
        ..SummaryParams::default()
    };

    asm.summarize("text", &params).await.unwrap();
    asm.summarize("text", &params).await.unwrap();

    assert_eq!(*clusterer.calls.lock().unwrap(), vec![(2, 987), (2, 987)]);
}

#[tokio::test]
async fn default_seed_is_used_when_none_configured() {
    let clusterer = Arc::new(RecordingClusterer::new(vec![vec![0.0, 0.0]]));
    let asm = assembler(6, grouped_table()).with_clusterer(clusterer.clone());

    asm.summarize("text", &SummaryParams::default()).await.unwrap();

    assert_eq!(*clusterer.calls.lock().unwrap(), vec![(1, DEFAULT_SEED)]);
}

#[tokio::test]
async fn seeded_selection_matches_selector_with_same_seed() {
    // Loosely spread points, where the k-means++ start depends on the seed.
    let table: Vec<Vec<f64>> = (0..12)
        .map(|i| {
            let x = i as f64;
            vec![(x * 1.7).sin() * 3.0, (x * 0.9).cos() * 3.0]
        })
        .collect();
    let params = SummaryParams {
        sent_ratio: 0.34,
        use_first_sent: false,
        ..SummaryParams::default()
    };

    for seed in [1, 42, 31337] {
        let summary = assembler(12, table.clone())
            .with_seed(seed)
            .summarize_detailed("text", &params)
            .await
            .unwrap();
        let direct = ClusterSelector::new(seed).select(&table, 0.34, None).unwrap();
        assert_eq!(summary.selected, direct, "seed = {seed}");
    }
}

#[tokio::test]
async fn injected_clusterer_centroids_drive_selection() {
    // Centroids sit on sentences 4 and 1, in that label order.
    let clusterer = Arc::new(RecordingClusterer::new(vec![vec![8.1, 7.9], vec![0.2, 0.1]]));
    let asm = assembler(6, grouped_table()).with_clusterer(clusterer);
    let params = SummaryParams {
        num_sentences: Some(2),
        use_first_sent: false,
        ..SummaryParams::default()
    };

    let summary = asm.summarize_detailed("text", &params).await.unwrap();

    assert_eq!(summary.selected, vec![1, 4]);
    assert_eq!(summary.text, "Sentence number 1. Sentence number 4.");
}

// ============================================================
// Error propagation
// ============================================================

#[tokio::test]
async fn segmenter_failure_propagates() {
    let asm = SummaryAssembler::new(Arc::new(FailingSegmenter), Arc::new(FailingEmbedder));
    let err = asm
        .summarize("text", &SummaryParams::default())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("segmenter offline"));
}

#[tokio::test]
async fn embedder_failure_propagates() {
    let asm = SummaryAssembler::new(
        Arc::new(FixedSegmenter(sentences(3))),
        Arc::new(FailingEmbedder),
    );
    let err = asm
        .summarize("text", &SummaryParams::default())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("embedding backend unavailable"));
}

#[tokio::test]
async fn clustering_failure_is_recoverable_by_type() {
    let table = vec![vec![0.0, 0.0], vec![f64::NAN, 1.0], vec![1.0, 1.0]];
    let asm = assembler(3, table);
    let err = asm
        .summarize("text", &SummaryParams::default())
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<ClusterError>(),
        Some(&ClusterError::NonFiniteValue { row: 1, col: 0 })
    );
}

#[tokio::test]
async fn short_embedding_matrix_is_an_error() {
    let asm = assembler(6, vec![vec![0.0, 0.0]]);
    let err = asm
        .summarize("text", &SummaryParams::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("1 vectors for 6 sentences"));
}

// ============================================================
// Rule segmenter in the loop
// ============================================================

#[tokio::test]
async fn rule_segmenter_feeds_the_pipeline() {
    let text = "
        The main asteroid belt lies between the orbits of Mars and Jupiter.
        Too short.
        The Kuiper belt begins just beyond the orbit of Neptune and includes Pluto.
        Far beyond it lies the Oort cloud, a spherical reservoir of comets.
    ";
    let asm = SummaryAssembler::new(
        Arc::new(RuleSegmenter::new().unwrap()),
        Arc::new(TableEmbedder(vec![
            vec![0.0, 0.0],
            vec![5.0, 5.0],
            vec![5.1, 5.0],
        ])),
    );
    let params = SummaryParams {
        num_sentences: Some(1),
        use_first_sent: true,
        ..SummaryParams::default()
    };
    let summary = asm.summarize_detailed(text, &params).await.unwrap();

    assert_eq!(summary.candidate_count, 3, "\"Too short.\" is filtered out");
    assert_eq!(summary.selected.first(), Some(&0));
    assert!(summary
        .text
        .starts_with("The main asteroid belt lies between the orbits of Mars and Jupiter."));
}
