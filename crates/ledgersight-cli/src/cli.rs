//! CLI argument definitions using clap
//!
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ledgersight - Analyze bank statement exports
#[derive(Parser)]
#[command(name = "ledgersight")]
#[command(about = "Bank statement analyzer: totals, categories, anomalies", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a statement CSV and print the JSON report
    Analyze {
        /// CSV file to analyze
        file: PathBuf,

        /// Seed for the randomized model fits
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,

        /// Skip classifier training and evaluation
        #[arg(long)]
        no_classifier: bool,

        /// Merge rare categories into "Other" and upsample them during
        /// classifier training
        #[arg(long)]
        merge_rare: bool,
    },
}
