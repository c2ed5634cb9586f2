// Sentence embedder trait and hidden-layer selection.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;

/// Which hidden layer(s) a sentence vector is pooled from. Negative indices
/// count from the last layer (`-1` is the final hidden state).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSelection {
    Single(i32),
    Many(Vec<i32>),
}

impl Default for LayerSelection {
    fn default() -> Self {
        LayerSelection::Single(-1)
    }
}

impl LayerSelection {
    pub fn indices(&self) -> Vec<i32> {
        match self {
            LayerSelection::Single(i) => vec![*i],
            LayerSelection::Many(v) => v.clone(),
        }
    }

    /// Resolve against a model exposing `layer_count` layers, returning
    /// non-negative positions in selection order.
    pub fn resolve(&self, layer_count: usize) -> Result<Vec<usize>> {
        let indices = self.indices();
        if indices.is_empty() {
            anyhow::bail!("Layer selection is empty");
        }

        indices
            .into_iter()
            .map(|i| {
                let resolved = if i < 0 {
                    layer_count as i64 + i as i64
                } else {
                    i as i64
                };
                if resolved < 0 || resolved >= layer_count as i64 {
                    anyhow::bail!(
                        "Layer {} out of range: model exposes {} hidden layer(s)",
                        i,
                        layer_count
                    );
                }
                Ok(resolved as usize)
            })
            .collect()
    }
}

impl FromStr for LayerSelection {
    type Err = anyhow::Error;

    /// Parses `-2` or a comma-separated list such as `-4,-3,-2,-1`.
    fn from_str(s: &str) -> Result<Self> {
        let parsed: Vec<i32> = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<i32>()
                    .map_err(|e| anyhow::anyhow!("Invalid layer index {:?}: {}", part.trim(), e))
            })
            .collect::<Result<_>>()?;

        match parsed.as_slice() {
            [] => anyhow::bail!("Layer selection is empty"),
            [single] if !s.contains(',') => Ok(LayerSelection::Single(*single)),
            _ => Ok(LayerSelection::Many(parsed)),
        }
    }
}

impl fmt::Display for LayerSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.indices().iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Trait for turning sentences into fixed-dimension vectors.
///
/// Row `i` of the result must correspond to `sentences[i]`, and every row
/// must have the same dimension.
#[async_trait]
pub trait SentenceEmbedder: Send + Sync {
    async fn embed(&self, sentences: &[String], layers: &LayerSelection) -> Result<Vec<Vec<f64>>>;
}
