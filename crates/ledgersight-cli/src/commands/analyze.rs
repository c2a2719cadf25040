//! The `analyze` command

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use ledgersight_core::{AnalysisConfig, Analyzer, RawTable};

/// Read a statement CSV, run the analysis, print the JSON report.
///
/// Exits non-zero when the analysis produced a failure report so shell
/// pipelines can tell the two apart without parsing JSON.
pub fn cmd_analyze(
    file: &Path,
    seed: u64,
    pretty: bool,
    no_classifier: bool,
    merge_rare: bool,
) -> Result<()> {
    let reader = File::open(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let table = RawTable::from_csv(reader)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let mut config = AnalysisConfig {
        seed,
        train_classifier: !no_classifier,
        ..AnalysisConfig::default()
    };
    config.classifier.merge_rare_categories = merge_rare;

    let report = Analyzer::new(config).analyze(&table);

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    if report.is_success() {
        Ok(())
    } else {
        // The failure detail is already in the JSON on stdout
        std::process::exit(1)
    }
}
