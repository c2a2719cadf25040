//! Domain models for Ledgersight

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A single normalized statement row.
///
/// Produced by the normalizer, so the invariants already hold:
/// `money_out >= 0`, `fee >= 0`, and `category` is non-blank (rows
/// without a category are dropped during normalization).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Source date string, possibly empty; never reinterpreted
    pub date: String,
    pub description: String,
    pub category: String,
    pub money_in: f64,
    pub money_out: f64,
    pub fee: f64,
}

/// One entry in the top money-in/money-out lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopTransaction {
    pub description: String,
    pub amount: f64,
    pub date: String,
}

/// A transaction flagged as an outlier within its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedTransaction {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
}

/// Ordered category → spend pairs.
///
/// Serialized as a JSON object that preserves insertion order, so the
/// top-spend view renders descending without the caller re-sorting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryBreakdown(pub Vec<(String, f64)>);

impl CategoryBreakdown {
    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, spend)| spend).sum()
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, spend)| *spend)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for CategoryBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, spend) in &self.0 {
            map.serialize_entry(category, spend)?;
        }
        map.end()
    }
}

/// Evaluation of the trained category classifier.
///
/// Not part of the serialized report; callers that want it read it off
/// the summary directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierReport {
    /// Held-out accuracy in [0, 1]
    pub accuracy: f64,
    /// Class labels the model was trained on, sorted
    pub classes: Vec<String>,
    /// Rows in the training partition, before any upsampling
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Successful analysis output.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub success: bool,
    pub total_income: f64,
    pub total_expenditure: f64,
    pub net_balance: f64,
    pub money_in_transactions: Vec<TopTransaction>,
    pub money_out_transactions: Vec<TopTransaction>,
    /// Top-spend view of the per-category sums
    pub category_summary: CategoryBreakdown,
    /// Top categories plus an "Other" bucket covering the rest
    pub category_pie_summary: CategoryBreakdown,
    pub anomalies: Vec<FlaggedTransaction>,
    /// Classifier evaluation, absent when training was skipped or failed
    #[serde(skip)]
    pub classifier: Option<ClassifierReport>,
}

/// Terminal result of an analysis run.
///
/// Serializes to `{"success": true, ...summary}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Summary(AnalysisSummary),
    Failure { success: bool, error: String },
}

impl AnalysisReport {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            success: false,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Summary(_))
    }

    pub fn summary(&self) -> Option<&AnalysisSummary> {
        match self {
            Self::Summary(summary) => Some(summary),
            Self::Failure { .. } => None,
        }
    }
}
