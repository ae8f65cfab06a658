//! Pressroom: publish CMS content as a static site.
//!
//! # Usage
//!
//! ```text
//! pressroom publish [--document-id <id> --document-type <type>] [--output-dir <dir>] [--templates <dir>] [--dry-run]
//! pressroom status [--output-dir <dir>] [--json]
//! ```
//!
//! Every option can also be supplied through the environment
//! (`SANITY_PROJECT_ID`, `GITHUB_TOKEN`, `OUTPUT_DIR`, ...); see `--help`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{publish::PublishArgs, status::StatusArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "pressroom",
    version,
    about = "Render Sanity content to static HTML and publish it",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish one document, or rebuild the whole site when no document is given.
    Publish(PublishArgs),

    /// Show what the published manifest contains.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Publish(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
