//! Ledgersight CLI - bank statement analyzer
//!
//! Usage:
//!   ledgersight analyze statement.csv            Print the JSON report
//!   ledgersight analyze statement.csv --pretty   Human-friendly JSON

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            seed,
            pretty,
            no_classifier,
            merge_rare,
        } => commands::cmd_analyze(&file, seed, pretty, no_classifier, merge_rare),
    }
}
