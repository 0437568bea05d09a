//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod crawl;
mod init;
mod sources;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "jokecrawl")]
#[command(about = "Joke post and comment aggregator")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init,

    /// Run one crawl cycle over the configured sources
    Crawl {
        /// Only crawl these source keys (repeatable)
        #[arg(short, long = "source")]
        sources: Vec<String>,
    },

    /// List configured sources and their comment adapters
    Sources,
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_path(path).await?,
        None => Config::load().await?,
    };
    if let Some(path) = &config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }
    Ok(config)
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref()).await?;

    match cli.command {
        Commands::Init => init::cmd_init(&config).await,
        Commands::Crawl { sources } => crawl::cmd_crawl(&config, &sources).await,
        Commands::Sources => sources::cmd_sources(&config).await,
    }
}
