//! # Clause Harness CLI (`clh`)
//!
//! ## Usage
//!
//! ```bash
//! clh --config ./config/clh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `clh ingest <FILES..>` | Parse, normalize and save each document as JSON |
//! | `clh chunk <FILES..>` | Emit chunks as JSON Lines |
//! | `clh analyze` | Ingest the whole corpus and write an analysis report |
//! | `clh init` | Create the SQLite database and schema |
//! | `clh index <FILES..>` | Ingest, chunk and upsert into SQLite |
//!
//! Logs go to stderr; set `RUST_LOG=debug` for per-document detail.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use clause_harness::{config, migrate, pipeline, stats};

/// Clause Harness: legal agreement ingestion and chunking.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/clh.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "clh",
    about = "Clause Harness: segment, classify and chunk legal agreements",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/clh.toml`. Built-in defaults apply when that
    /// file does not exist.
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, normalize and save documents.
    ///
    /// Each document is written to `<output.dir>/<document_id>.json`.
    /// Files that fail are reported and skipped.
    Ingest {
        /// Source files (.xml, .pdf, .txt).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print corpus statistics as JSON.
        #[arg(long)]
        stats: bool,
    },

    /// Ingest documents and emit their chunks as JSON Lines.
    Chunk {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Ingest and chunk every supported file under the corpus root.
    Analyze {
        /// Corpus root; overrides `[corpus].root`.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Write the report to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Ingest, chunk and upsert documents into SQLite.
    ///
    /// Re-indexing unchanged documents does not add rows.
    Index {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest { files, stats } => {
            pipeline::run_ingest(&cfg, &files, stats).await?;
        }
        Commands::Chunk { files, output } => {
            pipeline::run_chunk(&cfg, &files, output.as_deref()).await?;
        }
        Commands::Analyze { root, output } => {
            stats::run_analyze(&cfg, root.as_deref(), output.as_deref()).await?;
        }
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Index { files } => {
            pipeline::run_index(&cfg, &files).await?;
        }
    }

    Ok(())
}
