//! Analysis pipeline orchestration
//!
//! Runs normalize → classify → aggregate → detect over a raw table and
//! assembles the final report. Failures in normalization surface as a
//! failure report; a classifier training failure only costs the
//! classifier evaluation, the monetary report still comes out.

use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::anomaly::AnomalyDetector;
use crate::classify::TrainedClassifier;
use crate::config::AnalysisConfig;
use crate::models::{AnalysisReport, AnalysisSummary, ClassifierReport};
use crate::table::RawTable;

/// Statement analyzer. Holds configuration only; every call to
/// [`Analyzer::analyze`] is independent and the report belongs to the
/// caller.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a parsed statement table.
    pub fn analyze(&self, table: &RawTable) -> AnalysisReport {
        let transactions = match crate::normalize::normalize(table) {
            Ok(transactions) => transactions,
            Err(error) => {
                warn!("Normalization failed: {}", error);
                return AnalysisReport::failure(error.to_string());
            }
        };

        let classifier = self.train_classifier(&transactions);

        let aggregates = aggregate(
            &transactions,
            self.config.top_transactions,
            self.config.top_categories,
        );

        let detector = AnomalyDetector::new(self.config.anomaly.clone(), self.config.seed);
        let anomalies = detector.detect(&transactions, self.config.max_anomalies);

        info!(
            "Analysis complete: {} transactions, income {:.2}, expenditure {:.2}, {} anomalies",
            transactions.len(),
            aggregates.total_income,
            aggregates.total_expenditure,
            anomalies.len()
        );

        AnalysisReport::Summary(AnalysisSummary {
            success: true,
            total_income: aggregates.total_income,
            total_expenditure: aggregates.total_expenditure,
            net_balance: aggregates.net_balance,
            money_in_transactions: aggregates.money_in_transactions,
            money_out_transactions: aggregates.money_out_transactions,
            category_summary: aggregates.top_spend,
            category_pie_summary: aggregates.pie,
            anomalies,
            classifier,
        })
    }

    fn train_classifier(
        &self,
        transactions: &[crate::models::Transaction],
    ) -> Option<ClassifierReport> {
        if !self.config.train_classifier {
            return None;
        }
        match TrainedClassifier::train(transactions, &self.config.classifier, self.config.seed) {
            Ok(classifier) => {
                let report = classifier.report().clone();
                info!(
                    "Classifier accuracy: {:.3} over {} held-out rows",
                    report.accuracy, report.test_rows
                );
                Some(report)
            }
            Err(error) => {
                // The monetary report is still worth producing
                warn!("Classifier training skipped: {}", error);
                None
            }
        }
    }
}

/// Analyze with the default configuration.
pub fn analyze(table: &RawTable) -> AnalysisReport {
    Analyzer::default().analyze(table)
}
