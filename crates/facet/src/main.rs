//! Facet CLI - responsive image variants and format-aware markup.
//!
//! `facet build` turns source rasters into WebP plus PNG-or-JPEG variants at
//! every breakpoint, writes one manifest per image and a registry mapping
//! each source name to its manifest. `facet render` resolves a name through
//! that registry and prints the `<img>` element.
//!
//! # Usage
//!
//! ```bash
//! # Build every png/jpg under ./assets into ./dist
//! facet build ./assets --out-dir ./dist
//!
//! # Echo the manifests as JSON Lines while building
//! facet build ./assets --emit jsonl
//!
//! # Render markup for one image
//! facet render large_original.png --alt "A large original"
//!
//! # View configuration
//! facet config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Facet - responsive image variants and format-aware markup.
#[derive(Parser, Debug)]
#[command(name = "facet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "FACET_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate variants, manifests and the registry
    Build(cli::build::BuildArgs),

    /// Resolve a reference and print its image markup
    Render(cli::render::RenderArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match &cli.config {
        Some(path) => facet_core::Config::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {:?}: {}", path, e))?,
        None => match facet_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `facet config path`."
                );
                facet_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Facet v{}", facet_core::VERSION);

    match cli.command {
        Commands::Build(args) => cli::build::execute(args, config).await,
        Commands::Render(args) => cli::render::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config).await,
    }
}
