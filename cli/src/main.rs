//! gastro-grid command-line front end.
//!
//! Operates on one data directory holding the audit trail, the SOP set and
//! the last integrity result.
//!
//! Usage:
//!   grid --data-dir ./kitchen check-temp --kind cold --value 6.5 --key ^fridge.1
//!   grid --data-dir ./kitchen verify
//!   grid --data-dir ./kitchen sop-new --sop-id SOP-COOL --title Cooling --version 1.1
//!   grid --data-dir ./kitchen export --out audit-export.json

mod commands;
mod config;
mod kernel;

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{commands::Command, config::GridConfig, kernel::Kernel};

/// HACCP audit trail, integrity checks and SOP versioning.
#[derive(Parser)]
#[command(
    name = "grid",
    about = "HACCP audit trail and SOP registry",
    long_about = "Records HACCP-relevant actions in a SHA-256 hash-chained audit trail,\n\
                  validates readings against critical control points, verifies chain\n\
                  integrity, seals exports, and versions SOP documents."
)]
struct Cli {
    /// Directory holding audit.jsonl, sops.json, state.json and grid.toml.
    #[arg(long, default_value = ".grid")]
    data_dir: PathBuf,

    /// Configuration file; defaults to <DATA_DIR>/grid.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    debug!(data_dir = %cli.data_dir.display(), "starting");

    let result = GridConfig::load(cli.config.as_deref(), &cli.data_dir)
        .and_then(|config| Kernel::open(&cli.data_dir, config))
        .and_then(|kernel| commands::run(&kernel, cli.command, &mut std::io::stdout()));

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
