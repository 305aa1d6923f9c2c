// SYNOID Highlights Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use synoid_highlights::agent::gpt_oss_bridge::{CompletionProvider, OpenAiCompatibleClient};
use synoid_highlights::agent::highlights::{
    update_with_range, HighlightRange, HighlightSelector, HighlightStrategy, SelectionOptions,
};
use synoid_highlights::agent::transcription::TranscriptBundle;
use synoid_highlights::server;
use synoid_highlights::state::KernelState;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "synoid-highlights")]
#[command(about = "SYNOID Highlight Engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick highlight clips from a transcript
    Select {
        /// Transcript JSON (`{language?, segments: [...]}`)
        #[arg(short, long)]
        transcript: PathBuf,

        /// Pin the number of highlights
        #[arg(short, long)]
        count: Option<usize>,

        /// Media duration in seconds, if longer than the transcript
        #[arg(short, long)]
        duration: Option<f64>,

        /// Language for the generated titles
        #[arg(short, long)]
        language: Option<String>,

        /// Extra instructions for the model
        #[arg(long)]
        instructions: Option<String>,

        /// Short description of the video
        #[arg(long)]
        description: Option<String>,

        /// Ranges to avoid, as START-END seconds
        #[arg(long, value_parser = parse_range, num_args = 1..)]
        exclude: Vec<HighlightRange>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rebuild one highlight from a manually edited range
    Range {
        #[arg(short, long)]
        transcript: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        start: f64,

        #[arg(long, allow_hyphen_values = true)]
        end: f64,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Start the editor REST backend
    Serve {
        /// Port to run the server on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,hyper=warn,reqwest=warn");
    }
    tracing_subscriber::fmt::init();

    info!("--- SYNOID HIGHLIGHT ENGINE v{} ---", env!("CARGO_PKG_VERSION"));

    let args = Cli::parse();
    let strategy = HighlightStrategy::load();

    match args.command {
        Commands::Select {
            transcript,
            count,
            duration,
            language,
            instructions,
            description,
            exclude,
            output,
        } => {
            let bundle = TranscriptBundle::load(&transcript)?;
            let provider = OpenAiCompatibleClient::from_env()?;
            info!("[HIGHLIGHT] Using model {}", provider.model());

            let selector = HighlightSelector::new(Arc::new(provider), strategy);
            let options = SelectionOptions {
                instructions,
                description,
                language,
                duration_seconds: duration,
                max_highlights: count,
                exclude_ranges: exclude,
            };
            let highlights = selector.select(&bundle, &options).await?;
            emit(&json!({ "highlights": highlights }), output.as_deref())?;
        }
        Commands::Range {
            transcript,
            start,
            end,
            title,
            duration,
        } => {
            let bundle = TranscriptBundle::load(&transcript)?;
            let highlight = update_with_range(
                &bundle.segments,
                start,
                end,
                title.as_deref(),
                duration,
                &strategy,
            );
            emit(&highlight, None)?;
        }
        Commands::Serve { port } => {
            info!("🌐 Starting SYNOID highlight backend on port {}...", port);

            let provider: Option<Arc<dyn CompletionProvider>> =
                match OpenAiCompatibleClient::from_env() {
                    Ok(client) => {
                        info!("[LLM] Completion provider ready ({})", client.model());
                        Some(Arc::new(client))
                    }
                    Err(e) => {
                        warn!("[LLM] {}. Highlight selection will answer 503.", e);
                        None
                    }
                };

            let state = Arc::new(KernelState::new(strategy, provider));
            server::start_server(port, state).await?;
        }
    }

    Ok(())
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!("✅ Wrote {:?}", path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// `START-END` in seconds, e.g. `12.5-40`.
fn parse_range(raw: &str) -> Result<HighlightRange, String> {
    let (start, end) = raw
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got '{}'", raw))?;
    let start: f64 = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start in '{}'", raw))?;
    let end: f64 = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end in '{}'", raw))?;
    let range = HighlightRange::new(start, end);
    if range.is_valid() {
        Ok(range)
    } else {
        Err(format!("'{}' is not a forward range", raw))
    }
}
