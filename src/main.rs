//! # jsonrag CLI (`jrag`)
//!
//! The `jrag` binary is the primary interface for jsonrag. It provides
//! commands for database initialization, JSON ingestion, querying, and
//! chunk retrieval.
//!
//! ## Usage
//!
//! ```bash
//! jrag --config ./config/jrag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `jrag init` | Create the SQLite database and run schema migrations |
//! | `jrag ingest <file>` | Repair, chunk, and store a JSON file |
//! | `jrag ask "<query>"` | Answer a natural-language query |
//! | `jrag get <id>` | Retrieve a stored chunk by UUID |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! jrag init --config ./config/jrag.toml
//!
//! # Ingest a MongoDB-flavored export
//! jrag ingest ./exports/health.json
//!
//! # Preview chunking without writing
//! jrag ingest ./exports/health.json --dry-run
//!
//! # Direct date lookup
//! jrag ask "What happened yesterday?"
//!
//! # Generative answer over retrieved context
//! jrag ask "Summarize my glucose readings"
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use jsonrag::{config, get, ingest, migrate, query};

/// jsonrag CLI — query large, messy JSON exports locally.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/jrag.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "jrag",
    about = "jsonrag — repair, chunk, store, and query large JSON exports",
    version,
    long_about = "jsonrag ingests JSON documents (including malformed MongoDB-style exports) \
    by repairing their format, splitting them into bounded chunks with extracted metadata, \
    and storing them in SQLite. Queries are answered directly from the store when they carry \
    a date, and via retrieval plus a language model otherwise."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/jrag.toml`. Database, chunking, retrieval,
    /// and llm settings are read from this file.
    #[arg(long, global = true, default_value = "./config/jrag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables
    /// (chunks, aggregates). This command is idempotent — running it
    /// multiple times is safe.
    Init,

    /// Ingest a JSON file.
    ///
    /// Repairs common format defects (unquoted keys, single quotes,
    /// Mongo type wrappers), splits the document into bounded chunks,
    /// extracts metadata, and stores each chunk.
    Ingest {
        /// Path to the JSON file.
        file: PathBuf,

        /// Dry run — show chunk counts without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },

    /// Answer a natural-language query.
    ///
    /// Date-bearing queries are answered directly from stored chunks;
    /// everything else goes through retrieval plus the configured
    /// language model. Always prints a response.
    Ask {
        /// The query string.
        query: String,
    },

    /// Retrieve a chunk by its UUID.
    ///
    /// Prints the chunk's metadata and full content.
    Get {
        /// Chunk UUID.
        id: String,
    },
}

/// Route tracing output to stderr so stdout stays clean for command
/// output. Filter with `RUST_LOG` (default: warn).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest { file, dry_run } => {
            ingest::run_ingest(&cfg, &file, dry_run).await?;
        }
        Commands::Ask { query } => {
            query::run_ask(&cfg, &query).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
    }

    Ok(())
}
