//! graphdelta CLI
//!
//! Compares a test snapshot of an object graph against its reference
//! snapshot and reports added, deleted, modified and changed objects.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;
mod config;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use commands::DiffArgs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Diff ran and found no failing differences
const EXIT_PASSED: u8 = 0;
/// Diff ran and found failing differences
const EXIT_FAILED: u8 = 1;
/// Diff could not run: missing snapshot, no root, bad config
const EXIT_PRECONDITION: u8 = 2;

#[derive(Parser)]
#[command(name = "graphdelta")]
#[command(about = "graphdelta - regression diffs between object graph snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff a test snapshot against its reference
    Diff(DiffArgs),
    /// Print structural counts of one snapshot
    Inspect {
        /// Path to snapshot file
        #[arg(short, long)]
        snapshot: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("graphdelta=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Commands::Diff(args) => commands::diff(&args).await,
        Commands::Inspect { snapshot } => commands::inspect(&snapshot).await.map(|()| true),
    };

    if let Err(report) = &outcome {
        eprintln!("Error: {:?}", report);
    }
    Ok(ExitCode::from(exit_status(&outcome)))
}

/// Map a run outcome to the process exit status
fn exit_status(outcome: &Result<bool>) -> u8 {
    match outcome {
        Ok(true) => EXIT_PASSED,
        Ok(false) => EXIT_FAILED,
        Err(_) => EXIT_PRECONDITION,
    }
}
