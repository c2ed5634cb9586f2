// Model download helper for the ONNX sentence encoder.
//
// Fetches all-MiniLM-L6-v2 (ONNX export + tokenizer) from HuggingFace into a
// platform-appropriate directory (~/.local/share/precis/models/ on Linux) so
// it persists across runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// HuggingFace repo for the sentence embedding model.
const EMBEDDING_HF_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// Remote paths within the repo, and the local names they are stored under.
const REMOTE_MODEL_FILE: &str = "onnx/model.onnx";
pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Returns the default directory for storing model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("precis")
        .join("models")
}

/// Check whether both model files exist in `dir`.
pub fn model_files_present(dir: &Path) -> bool {
    dir.join(MODEL_FILE).exists() && dir.join(TOKENIZER_FILE).exists()
}

/// A file fetched from the model repo: its path in the repo and the name it
/// is stored under locally.
struct ModelFile {
    remote: &'static str,
    local: &'static str,
}

const MODEL_FILES: [ModelFile; 2] = [
    ModelFile {
        remote: TOKENIZER_FILE,
        local: TOKENIZER_FILE,
    },
    ModelFile {
        remote: REMOTE_MODEL_FILE,
        local: MODEL_FILE,
    },
];

/// Download the encoder and tokenizer into `dir`, skipping files that
/// already exist.
pub async fn download_model(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    let client = reqwest::Client::new();

    for file in &MODEL_FILES {
        let dest = dir.join(file.local);
        if dest.exists() {
            info!(file = file.local, "Model file already present, skipping");
            continue;
        }
        let url = format!("{EMBEDDING_HF_URL}/{}", file.remote);
        download_file(&client, &url, &dest).await?;
    }

    Ok(())
}

async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("Failed to download {url}"))?;

    let pb = match response.content_length() {
        Some(size) => ProgressBar::new(size).with_style(
            ProgressStyle::default_bar()
                .template("  {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                .expect("valid template")
                .progress_chars("=> "),
        ),
        None => ProgressBar::new_spinner(),
    };
    pb.set_message(
        dest.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read response body from {url}"))?;
    pb.set_position(bytes.len() as u64);

    std::fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;
    pb.finish_and_clear();

    info!(url, dest = %dest.display(), bytes = bytes.len(), "Downloaded model file");
    Ok(())
}
