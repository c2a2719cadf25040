//! Per-category outlier detection
//!
//! Each spending category gets its own isolation forest over the
//! `money_out` amounts of its qualifying rows, so a routine rent
//! payment never looks anomalous just because groceries run smaller.
//! Categories with too few rows get no verdict at all, and a category
//! whose fit fails is skipped rather than failing the run.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::config::AnomalyConfig;
use crate::ml::forest::IsolationForest;
use crate::ml::FeatureMatrix;
use crate::models::{FlaggedTransaction, Transaction};

/// Per-category outlier detector.
pub struct AnomalyDetector {
    config: AnomalyConfig,
    seed: u64,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    /// Flag outliers and return the `max_anomalies` largest by amount.
    pub fn detect(
        &self,
        transactions: &[Transaction],
        max_anomalies: usize,
    ) -> Vec<FlaggedTransaction> {
        // Only outgoing spend is an anomaly candidate
        let candidates: Vec<&Transaction> = transactions
            .iter()
            .filter(|tx| tx.money_out > 0.0)
            .collect();

        let mut flagged: Vec<&Transaction> = Vec::new();
        for (category, members) in partition_by_category(&candidates) {
            if members.len() < self.config.min_category_rows {
                // Too little data for a verdict; leave the category unflagged
                debug!(
                    "Skipping category '{}': {} qualifying rows (< {})",
                    category,
                    members.len(),
                    self.config.min_category_rows
                );
                continue;
            }
            match self.flag_category(&members) {
                Ok(outliers) => {
                    debug!(
                        "Category '{}': {}/{} rows flagged",
                        category,
                        outliers.len(),
                        members.len()
                    );
                    flagged.extend(outliers);
                }
                Err(error) => {
                    // One bad category must not blank the whole report
                    warn!("Skipping anomaly detection for '{}': {}", category, error);
                }
            }
        }

        flagged.sort_by(|a, b| b.money_out.total_cmp(&a.money_out));
        flagged.truncate(max_anomalies);
        flagged
            .into_iter()
            .map(|tx| FlaggedTransaction {
                description: tx.description.clone(),
                amount: tx.money_out,
                category: tx.category.clone(),
                date: tx.date.clone(),
            })
            .collect()
    }

    /// Fit one category and return its flagged members.
    ///
    /// The forest runs on a named feature matrix; `money_out` is the
    /// only feature today. At most `ceil(contamination * n)` rows are
    /// flagged, and only those scoring strictly above the contamination
    /// quantile: a category of identical recurring amounts scores every
    /// row the same and therefore flags nothing.
    fn flag_category<'a>(
        &self,
        members: &[&'a Transaction],
    ) -> crate::error::Result<Vec<&'a Transaction>> {
        let matrix = FeatureMatrix::single(
            "money_out",
            members.iter().map(|tx| tx.money_out).collect(),
        );

        // Fresh RNG per category: flags stay identical no matter which
        // other categories exist in the statement
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let forest =
            IsolationForest::fit(&matrix, self.config.trees, self.config.max_samples, &mut rng)?;

        let scores: Vec<f64> = (0..matrix.n_rows())
            .map(|row| forest.score(matrix.row(row)))
            .collect();

        let budget = (self.config.contamination * members.len() as f64).ceil() as usize;
        let mut order: Vec<usize> = (0..members.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        // Cutoff is the first score past the budget; rows tying it are
        // within the data's bulk and stay normal
        let cutoff = order.get(budget).map(|&index| scores[index]);
        let mut flagged: Vec<usize> = order
            .into_iter()
            .take(budget)
            .filter(|&index| cutoff.is_none_or(|c| scores[index] > c))
            .collect();
        flagged.sort_unstable();

        Ok(flagged.into_iter().map(|index| members[index]).collect())
    }
}

/// Group candidate rows by category in first-occurrence order.
fn partition_by_category<'a>(
    candidates: &[&'a Transaction],
) -> Vec<(String, Vec<&'a Transaction>)> {
    let mut groups: Vec<(String, Vec<&Transaction>)> = Vec::new();
    for &tx in candidates {
        match groups.iter_mut().find(|(category, _)| *category == tx.category) {
            Some((_, members)) => members.push(tx),
            None => groups.push((tx.category.clone(), vec![tx])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(description: &str, category: &str, money_out: f64) -> Transaction {
        Transaction {
            date: "2024-01-01".to_string(),
            description: description.to_string(),
            category: category.to_string(),
            money_in: 0.0,
            money_out,
            fee: 0.0,
        }
    }

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(AnomalyConfig::default(), 42)
    }

    #[test]
    fn test_small_category_never_flagged() {
        // 9 qualifying rows, one wildly larger: still below the
        // 10-row eligibility threshold
        let mut statement: Vec<Transaction> = (0..8)
            .map(|i| tx(&format!("T{i}"), "Groceries", 100.0 + i as f64))
            .collect();
        statement.push(tx("HUGE", "Groceries", 99999.0));

        assert!(detector().detect(&statement, 5).is_empty());
    }

    #[test]
    fn test_outlier_in_eligible_category_flagged() {
        // 12 rows, one at 100x the others
        let mut statement: Vec<Transaction> = (0..11)
            .map(|i| tx(&format!("T{i}"), "Groceries", 95.0 + i as f64))
            .collect();
        statement.push(tx("SPREE", "Groceries", 10000.0));

        let anomalies = detector().detect(&statement, 5);
        assert!(anomalies
            .iter()
            .any(|a| a.description == "SPREE" && a.category == "Groceries"));
    }

    #[test]
    fn test_identical_recurring_payments_not_flagged() {
        // 12 subscription charges at the same amount: every row scores
        // the same, so none sits outside the bulk and none is flagged
        let statement: Vec<Transaction> = (0..12)
            .map(|i| tx(&format!("NETFLIX {i}"), "Entertainment", 9.99))
            .collect();

        assert!(detector().detect(&statement, 5).is_empty());
    }

    #[test]
    fn test_fee_only_rows_are_not_candidates() {
        let statement: Vec<Transaction> = (0..15)
            .map(|i| Transaction {
                fee: 5.0,
                ..tx(&format!("T{i}"), "Fees", 0.0)
            })
            .collect();
        assert!(detector().detect(&statement, 5).is_empty());
    }

    #[test]
    fn test_categories_partition_independently() {
        // Rent rows are all ~12000; a 12000 grocery row is the outlier
        // among groceries even though it is routine for rent
        let mut statement: Vec<Transaction> = (0..12)
            .map(|i| tx(&format!("RENT{i}"), "Rent", 12000.0 + i as f64))
            .collect();
        for i in 0..11 {
            statement.push(tx(&format!("SPAR{i}"), "Groceries", 300.0 + i as f64));
        }
        statement.push(tx("SPAR SPLURGE", "Groceries", 12000.0));

        let anomalies = detector().detect(&statement, 5);
        assert!(anomalies.iter().any(|a| a.description == "SPAR SPLURGE"));
        assert!(!anomalies.iter().any(|a| a.category == "Rent" && a.amount > 12010.0));
    }

    #[test]
    fn test_top_five_by_amount() {
        let mut statement = Vec::new();
        for (category, base) in [("A", 10.0), ("B", 20.0), ("C", 30.0)] {
            for i in 0..19 {
                statement.push(tx(&format!("{category}{i}"), category, base + i as f64 * 0.1));
            }
            statement.push(tx(&format!("{category} BIG"), category, base * 1000.0));
        }
        let anomalies = detector().detect(&statement, 5);

        assert!(anomalies.len() <= 5);
        // Descending by amount
        for pair in anomalies.windows(2) {
            assert!(pair[0].amount >= pair[1].amount);
        }
        // The three giant rows dominate the list
        assert!(anomalies.iter().any(|a| a.description == "C BIG"));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let mut statement: Vec<Transaction> = (0..30)
            .map(|i| tx(&format!("T{i}"), "Groceries", 50.0 + (i as f64 * 7.3) % 40.0))
            .collect();
        statement.push(tx("BLOWOUT", "Groceries", 4000.0));

        let a = detector().detect(&statement, 5);
        let b = detector().detect(&statement, 5);
        assert_eq!(a, b);
    }
}
