//! Ledgersight Core Library
//!
//! Analysis pipeline for personal bank-statement exports:
//! - Table normalization into a canonical transaction schema
//! - Description → category classifier (TF-IDF + linear SVC)
//! - Financial aggregation (totals, top transactions, category views)
//! - Per-category outlier detection (isolation forest)
//! - An orchestrator that assembles the final JSON-ready report
//!
//! The core consumes a parsed table and returns a report; file upload,
//! persistence, and rendering belong to callers.
//!
//! ```no_run
//! use ledgersight_core::{analyze, RawTable};
//!
//! let table = RawTable::from_csv(std::io::stdin())?;
//! let report = analyze(&table);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod analyze;
pub mod anomaly;
pub mod classify;
pub mod config;
pub mod error;
pub mod ml;
pub mod models;
pub mod normalize;
pub mod table;

pub use aggregate::Aggregates;
pub use analyze::{analyze, Analyzer};
pub use anomaly::AnomalyDetector;
pub use classify::TrainedClassifier;
pub use config::{AnalysisConfig, AnomalyConfig, ClassifierConfig};
pub use error::{Error, Result};
pub use models::{
    AnalysisReport, AnalysisSummary, CategoryBreakdown, ClassifierReport, FlaggedTransaction,
    TopTransaction, Transaction,
};
pub use table::RawTable;
