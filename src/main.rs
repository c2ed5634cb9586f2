use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, info};

use precis::config::Config;
use precis::embed::onnx::OnnxEmbedder;
use precis::segment::rules::RuleSegmenter;
use precis::summary::assembler::{SummaryAssembler, SummaryParams, DEFAULT_SENT_RATIO};

/// Precis: extractive text summarization.
///
/// Splits a document into sentences, embeds them, clusters the embeddings,
/// and keeps the sentence closest to each cluster centre.
#[derive(Parser)]
#[command(name = "precis", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a text file (or stdin when no file is given)
    Summarize {
        /// File to summarize; reads stdin when omitted
        file: Option<PathBuf>,

        /// Share of sentences to keep, in [0.05, 1.0] (default: 0.2)
        #[arg(long, default_value_t = DEFAULT_SENT_RATIO)]
        ratio: f64,

        /// Exact number of sentences to keep, in [1, 999] (overrides --ratio)
        #[arg(long)]
        num_sentences: Option<i64>,

        /// Drop sentences this short or shorter, in characters
        #[arg(long)]
        min_length: Option<usize>,

        /// Drop sentences this long or longer, in characters
        #[arg(long)]
        max_length: Option<usize>,

        /// Don't force the first sentence into the summary
        #[arg(long)]
        no_first_sent: bool,

        /// Also print which sentences were selected
        #[arg(long)]
        show_indices: bool,

        /// Print the summary and selected indices as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download the ONNX sentence embedding model (~90 MB)
    DownloadModel,

    /// Serve the summarization API over HTTP
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 8000)
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("precis=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summarize {
            file,
            ratio,
            num_sentences,
            min_length,
            max_length,
            no_first_sent,
            show_indices,
            json,
        } => {
            let config = Config::load()?;
            config.require_model()?;

            let content = read_input(file.as_deref())?;
            debug!(
                chars = content.chars().count(),
                preview = %precis::output::preview(&content, 60),
                "Read input"
            );
            precis::summary::validation::validate_ranges(&content, num_sentences, ratio)?;

            let params = SummaryParams {
                sent_ratio: ratio,
                // validate_ranges guarantees [1, 999]
                num_sentences: num_sentences.map(|n| n as usize),
                min_length: min_length.unwrap_or(config.min_length),
                max_length: max_length.unwrap_or(config.max_length),
                use_first_sent: !no_first_sent,
            };

            let assembler = create_assembler(&config)?;
            let summary = assembler.summarize_detailed(&content, &params).await?;

            if json {
                precis::output::terminal::display_summary_json(&summary)?;
            } else {
                precis::output::terminal::display_summary(&summary, show_indices);
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading ONNX embedding model...");
            println!("  Destination: {}", model_dir.display());

            precis::embed::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `precis summarize <file>`.");
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_model()?;
            let assembler = create_assembler(&config)?;

            precis::web::run_server(config, assembler, port, &bind).await?;
        }
    }

    Ok(())
}

/// Build the summarizer with the local ONNX embedder and rule-based segmenter.
fn create_assembler(config: &Config) -> Result<SummaryAssembler> {
    let embedder = OnnxEmbedder::load(&config.model_dir)?;
    let segmenter = RuleSegmenter::new().context("Invalid sentence boundary pattern")?;
    info!(
        model_dir = %config.model_dir.display(),
        layers = %config.layers,
        seed = config.seed,
        "Loaded summarizer"
    );

    Ok(
        SummaryAssembler::new(Arc::new(segmenter), Arc::new(embedder))
            .with_layers(config.layers.clone())
            .with_seed(config.seed),
    )
}

fn read_input(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}
