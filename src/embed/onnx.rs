// Local ONNX sentence encoder.
//
// Each sentence is tokenized, run through a BERT-family encoder, and
// mean-pooled over its real tokens (attention mask weighted). When the model
// was exported with per-layer outputs (`hidden_states.0` .. `hidden_states.N`)
// any layer can be selected; otherwise only the final hidden state exists and
// the selection resolves against that single layer. Several selected layers
// are pooled individually and then averaged.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::debug;

use super::traits::{LayerSelection, SentenceEmbedder};

/// Sentence embedder backed by an ONNX Runtime session.
///
/// Arc<Mutex<Session>> because Session::run takes &mut self and inference is
/// moved onto spawn_blocking, which needs 'static handles.
pub struct OnnxEmbedder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxEmbedder {
    /// Load the encoder and tokenizer from `model_dir`.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in the directory.
    /// Run `precis download-model` first if they don't exist.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            anyhow::bail!(
                "Embedding model not found: {}\nRun `precis download-model` to download it.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Embedding tokenizer not found: {}\nRun `precis download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!(
                    "Failed to load embedding model from {}",
                    model_path.display()
                )
            })?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load embedding tokenizer: {}", e))?;

        debug!("Loaded sentence embedding model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl SentenceEmbedder for OnnxEmbedder {
    async fn embed(&self, sentences: &[String], layers: &LayerSelection) -> Result<Vec<Vec<f64>>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let sentences = sentences.to_vec();
        let layers = layers.clone();

        tokio::task::spawn_blocking(move || embed_sync(&session, &tokenizer, &sentences, &layers))
            .await
            .context("spawn_blocking panicked")?
    }
}

/// Tokenize, run inference, and pool. Called from spawn_blocking.
fn embed_sync(
    session: &Arc<Mutex<Session>>,
    tokenizer: &Arc<Tokenizer>,
    sentences: &[String],
    layers: &LayerSelection,
) -> Result<Vec<Vec<f64>>> {
    let encodings: Vec<_> = sentences
        .iter()
        .map(|s| {
            tokenizer
                .encode(s.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch_size = encodings.len();
    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);

    if max_len == 0 {
        anyhow::bail!("Tokenizer produced no tokens for any of {batch_size} sentences");
    }

    // BERT inputs, right-padded to max_len (pad token id 0, mask 0).
    let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut token_type_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

    for enc in &encodings {
        let ids = enc.get_ids();
        let mask = enc.get_attention_mask();
        let pad_len = max_len - ids.len();

        input_ids_flat.extend(ids.iter().map(|&id| id as i64));
        attention_mask_flat.extend(mask.iter().map(|&m| m as i64));
        token_type_ids_flat.extend(std::iter::repeat_n(0i64, ids.len()));

        input_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
        attention_mask_flat.extend(std::iter::repeat_n(0i64, pad_len));
        token_type_ids_flat.extend(std::iter::repeat_n(0i64, pad_len));
    }

    let shape = [batch_size as i64, max_len as i64];

    let input_ids_tensor =
        Tensor::from_array((shape, input_ids_flat)).context("Failed to create input_ids tensor")?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat.clone()))
        .context("Failed to create attention_mask tensor")?;
    let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids_flat))
        .context("Failed to create token_type_ids tensor")?;

    // Each entry is one layer's [batch, seq_len, dim] output, flattened.
    let hidden_layers: Vec<Vec<f32>> = {
        let mut session = session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            })
            .context("Embedding ONNX inference failed")?;

        let mut collected = Vec::new();
        loop {
            let name = format!("hidden_states.{}", collected.len());
            let Some(value) = outputs.get(name.as_str()) else {
                break;
            };
            let (_shape, data) = value
                .try_extract_tensor::<f32>()
                .with_context(|| format!("Failed to extract {name} tensor"))?;
            collected.push(data.to_vec());
        }

        if collected.is_empty() {
            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("Failed to extract embedding output tensor")?;
            collected.push(data.to_vec());
        }

        collected
    };

    let selected = layers.resolve(hidden_layers.len())?;
    let embeddings = pool_layers(
        &hidden_layers,
        &selected,
        &attention_mask_flat,
        batch_size,
        max_len,
    )?;

    debug!(
        batch_size,
        layers = %layers,
        available_layers = hidden_layers.len(),
        "Computed sentence embeddings"
    );

    Ok(embeddings)
}

/// Mean-pool the selected layers over unmasked tokens, then average the
/// per-layer vectors. `mask` is `[batch, seq_len]` flattened; each layer is
/// `[batch, seq_len, dim]` flattened.
pub fn pool_layers(
    hidden_layers: &[Vec<f32>],
    selected: &[usize],
    mask: &[i64],
    batch_size: usize,
    seq_len: usize,
) -> Result<Vec<Vec<f64>>> {
    let tokens = batch_size * seq_len;
    if tokens == 0 || selected.is_empty() {
        return Ok(vec![Vec::new(); batch_size]);
    }

    let dim = hidden_layers
        .get(selected[0])
        .map(|layer| layer.len() / tokens)
        .context("Selected layer missing from model output")?;

    let mut embeddings = vec![vec![0.0_f64; dim]; batch_size];

    for &layer_idx in selected {
        let layer = hidden_layers
            .get(layer_idx)
            .context("Selected layer missing from model output")?;
        if layer.len() != tokens * dim {
            anyhow::bail!(
                "Hidden layer {} has {} values, expected {} ({}x{}x{})",
                layer_idx,
                layer.len(),
                tokens * dim,
                batch_size,
                seq_len,
                dim
            );
        }

        for (i, embedding) in embeddings.iter_mut().enumerate() {
            let mut sum = vec![0.0_f64; dim];
            let mut mask_sum = 0.0_f64;

            for j in 0..seq_len {
                let mask_val = mask[i * seq_len + j] as f64;
                if mask_val > 0.0 {
                    mask_sum += mask_val;
                    let offset = (i * seq_len + j) * dim;
                    for (k, s) in sum.iter_mut().enumerate() {
                        *s += layer[offset + k] as f64 * mask_val;
                    }
                }
            }

            if mask_sum > 0.0 {
                for (e, s) in embedding.iter_mut().zip(sum) {
                    *e += s / mask_sum;
                }
            }
        }
    }

    let layer_count = selected.len() as f64;
    for embedding in &mut embeddings {
        for v in embedding.iter_mut() {
            *v /= layer_count;
        }
    }

    Ok(embeddings)
}
