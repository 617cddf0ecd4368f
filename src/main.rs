//! # reelsync CLI
//!
//! The `reelsync` binary imports a CSV manifest of conference session
//! videos: each content row becomes a published CMS record with its video
//! uploaded to object storage.
//!
//! ## Usage
//!
//! ```bash
//! reelsync --config ./config/reelsync.toml import --file sessions.csv
//! ```
//!
//! Storage credentials come from `AWS_ACCESS_KEY_ID` /
//! `AWS_SECRET_ACCESS_KEY` (optional `AWS_SESSION_TOKEN`); CMS credentials
//! from `REELSYNC_CMS_USER` / `REELSYNC_CMS_PASSWORD`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use reelsync::{config, import};

/// reelsync — batch-import conference session videos from a CSV manifest
/// into a CMS, with idempotent object-storage uploads.
#[derive(Parser)]
#[command(
    name = "reelsync",
    about = "Batch-import conference session videos from a CSV manifest",
    version,
    long_about = "reelsync reads a CSV manifest of conference sessions (section marker rows \
    followed by content rows), uploads each referenced video to an object-storage bucket \
    unless it is already there, and creates or updates a published CMS record per session \
    with embed markup, series tags, and video metadata."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Bucket, CMS, and category settings are read from this file;
    /// credentials come from the environment.
    #[arg(long, global = true, default_value = "./config/reelsync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV manifest.
    ///
    /// Rows are processed in order, one at a time. A row with a single
    /// populated field starts a new section; every other row is a session.
    /// Re-running the same manifest updates existing records in place and
    /// skips videos already present in the bucket.
    Import {
        /// Path to the CSV manifest file.
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Import { file } => {
            import::run_import(&cfg, &file).await?;
        }
    }

    Ok(())
}
