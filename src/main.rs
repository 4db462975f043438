//! cvssx - CVSS extension scoring CLI
//!
//! Evaluates CVSS vectors against organization-defined extension rules,
//! producing a final score, severity band, and rule-by-rule audit trail.

use anyhow::Result;
use clap::Parser;
use cvssx::cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; RUST_LOG overrides --log-level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run(args)
}
