//! Analysis configuration
//!
//! Every stochastic step in the pipeline (train/test split, training
//! shuffles, isolation forest sampling) draws from the seed configured
//! here, so two runs over the same table produce identical reports.

/// Top-level configuration for a statement analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Seed for all randomized steps
    pub seed: u64,
    /// How many top money-in/money-out transactions to report
    pub top_transactions: usize,
    /// How many categories the top-spend and pie views keep
    pub top_categories: usize,
    /// How many flagged transactions the final anomaly list keeps
    pub max_anomalies: usize,
    /// Whether to train and evaluate the category classifier
    pub train_classifier: bool,
    pub classifier: ClassifierConfig,
    pub anomaly: AnomalyConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            top_transactions: 3,
            top_categories: 5,
            max_anomalies: 5,
            train_classifier: true,
            classifier: ClassifierConfig::default(),
            anomaly: AnomalyConfig::default(),
        }
    }
}

/// Configuration for the description → category classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Fraction of categorized rows held out for evaluation
    pub test_fraction: f64,
    /// Merge rare categories into "Other" and upsample them in training
    pub merge_rare_categories: bool,
    /// A category with fewer examples than this is rare
    pub rare_category_min: usize,
    /// Training epochs for the linear SVM
    pub epochs: usize,
    /// L2 regularization strength
    pub lambda: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            merge_rare_categories: false,
            rare_category_min: 3,
            epochs: 40,
            lambda: 1e-2,
        }
    }
}

/// Configuration for per-category outlier detection.
#[derive(Debug, Clone)]
pub struct AnomalyConfig {
    /// Minimum qualifying rows before a category gets a verdict
    pub min_category_rows: usize,
    /// Expected share of outliers per eligible category
    pub contamination: f64,
    /// Number of isolation trees in the ensemble
    pub trees: usize,
    /// Subsample size cap per tree
    pub max_samples: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_category_rows: 10,
            contamination: 0.05,
            trees: 100,
            max_samples: 256,
        }
    }
}
