//! In-process models for the analysis pipeline
//!
//! Small, deterministic implementations of the three models the
//! pipeline needs: a TF-IDF vectorizer, a one-vs-rest linear SVM, and
//! an isolation forest. All randomness comes in through the caller's
//! RNG so a fixed seed reproduces fits exactly.

pub mod forest;
pub mod svm;
pub mod tfidf;

use crate::error::{Error, Result};

/// An ordered set of named numeric feature columns.
///
/// The anomaly detector fits on a single `money_out` column today, but
/// models take the matrix form so adding features never changes their
/// interface.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Build a one-column matrix.
    pub fn single(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            names: vec![name.into()],
            rows: values.into_iter().map(|value| vec![value]).collect(),
        }
    }

    /// Build a matrix from named columns of equal length.
    pub fn new(names: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == names.len()));
        Self { names, rows }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.names
    }

    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }

    /// Reject empty or non-finite data before a model fit.
    pub fn validate(&self) -> Result<()> {
        if self.rows.is_empty() || self.names.is_empty() {
            return Err(Error::ModelFit("empty feature matrix".to_string()));
        }
        for row in &self.rows {
            if row.iter().any(|value| !value.is_finite()) {
                return Err(Error::ModelFit(
                    "non-finite value in feature matrix".to_string(),
                ));
            }
        }
        Ok(())
    }
}
