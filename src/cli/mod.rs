//! Command-line interface.

pub mod polish;
pub mod serve;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use idiom_polish::cache::IdiomStore;
use idiom_polish::config::Config;
use idiom_polish::polish::{PolishOptions, Polisher};
use idiom_polish::providers::{LLMProvider, OpenAIProvider};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "idiom-polish", version, about = "Turn internet slang into classical idioms")]
pub struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Path to the SQLite cache (overrides POLISH_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Runtime worker threads
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Polish a single phrase and print the document
    Polish {
        /// Text to polish
        text: String,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the default.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("idiom_polish=info,tower_http=info,info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Open the store and model client described by `config`.
pub fn build_polisher(config: &Config) -> Result<Polisher> {
    let store = IdiomStore::open(&config.cache.path)
        .with_context(|| format!("Failed to open cache at {}", config.cache.path.display()))?;
    info!(path = %store.location(), "Idiom cache ready");

    let provider = OpenAIProvider::from_config(&config.llm)
        .context("Failed to build model client")?
        .map(|p| {
            info!(model = %p.model(), "Model client configured");
            Arc::new(p) as Arc<dyn LLMProvider>
        });
    if provider.is_none() {
        warn!("LLM_API_KEY is not set; requests that miss the cache get guidance documents");
    }

    Ok(Polisher::new(store, provider, PolishOptions::from(config)))
}
