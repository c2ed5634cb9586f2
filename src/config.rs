use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

use crate::cluster::selector::DEFAULT_SEED;
use crate::embed::traits::LayerSelection;
use crate::segment::traits::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default, so an empty environment is a valid configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing model.onnx and tokenizer.json
    pub model_dir: PathBuf,
    /// Seed threaded into every clustering fit
    pub seed: u64,
    /// Hidden layer(s) sentence vectors are pooled from
    pub layers: LayerSelection,
    /// Default exclusive lower bound on sentence length
    pub min_length: usize,
    /// Default exclusive upper bound on sentence length
    pub max_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: crate::embed::download::default_model_dir(),
            seed: DEFAULT_SEED,
            layers: LayerSelection::default(),
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. Unset keys fall
    /// back to defaults; set but unparseable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let model_dir = lookup("PRECIS_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_dir);

        let seed = match lookup("PRECIS_SEED") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("PRECIS_SEED must be a non-negative integer, got {v:?}"))?,
            None => defaults.seed,
        };

        let layers = match lookup("PRECIS_LAYERS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("PRECIS_LAYERS is not a valid layer selection: {v:?}"))?,
            None => defaults.layers,
        };

        let min_length = match lookup("PRECIS_MIN_LENGTH") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("PRECIS_MIN_LENGTH must be an integer, got {v:?}"))?,
            None => defaults.min_length,
        };

        let max_length = match lookup("PRECIS_MAX_LENGTH") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("PRECIS_MAX_LENGTH must be an integer, got {v:?}"))?,
            None => defaults.max_length,
        };

        if max_length <= min_length.saturating_add(1) {
            warn!(
                min_length,
                max_length, "Sentence length bounds leave no room; every summary will be empty"
            );
        }

        Ok(Self {
            model_dir,
            seed,
            layers,
            min_length,
            max_length,
        })
    }

    /// Check that the embedding model files are present.
    /// Call this before any operation that embeds sentences.
    pub fn require_model(&self) -> Result<()> {
        if !crate::embed::download::model_files_present(&self.model_dir) {
            anyhow::bail!(
                "Embedding model files not found in {}\n\
                 Run `precis download-model` to download them,\n\
                 or set PRECIS_MODEL_DIR to a directory containing model.onnx and tokenizer.json.",
                self.model_dir.display()
            );
        }
        Ok(())
    }
}
