//! Category classification from transaction descriptions
//!
//! Validates that descriptions predict spending categories: split the
//! categorized rows 80/20, vectorize with TF-IDF fitted on the training
//! side only, train a class-balanced linear SVC, and score held-out
//! accuracy. Optionally merges rare categories into "Other" and
//! upsamples that bucket in the training partition.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use crate::ml::svm::{LinearSvc, SvmParams};
use crate::ml::tfidf::TfidfVectorizer;
use crate::models::{ClassifierReport, Transaction};

/// Label used for merged rare categories.
const OTHER_LABEL: &str = "Other";

/// A trained description → category model with its evaluation.
pub struct TrainedClassifier {
    vectorizer: TfidfVectorizer,
    model: LinearSvc,
    classes: Vec<String>,
    report: ClassifierReport,
}

impl TrainedClassifier {
    /// Train on the categorized transactions.
    ///
    /// Needs at least 2 rows (so both split sides are non-empty) and at
    /// least 2 distinct categories.
    pub fn train(
        transactions: &[Transaction],
        config: &ClassifierConfig,
        seed: u64,
    ) -> Result<Self> {
        let mut labels: Vec<String> = transactions
            .iter()
            .map(|tx| tx.category.clone())
            .collect();
        let descriptions: Vec<String> = transactions
            .iter()
            .map(|tx| tx.description.clone())
            .collect();

        if config.merge_rare_categories {
            merge_rare(&mut labels, config.rare_category_min);
        }

        if labels.len() < 2 {
            return Err(Error::Training(format!(
                "need at least 2 categorized rows to split, got {}",
                labels.len()
            )));
        }
        let mut distinct: Vec<&String> = labels.iter().collect();
        distinct.sort();
        distinct.dedup();
        if distinct.len() < 2 {
            return Err(Error::Training(
                "need at least 2 distinct categories to train".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (mut train_idx, test_idx) = split(labels.len(), config.test_fraction, &mut rng);
        // Report the split size, not the index count after upsampling
        let split_train_rows = train_idx.len();
        if config.merge_rare_categories {
            upsample_other(&labels, &mut train_idx, &mut rng);
        }

        let train_docs: Vec<String> = train_idx
            .iter()
            .map(|&i| descriptions[i].clone())
            .collect();
        let vectorizer =
            TfidfVectorizer::fit(&train_docs).map_err(|e| Error::Training(e.to_string()))?;

        // Class set comes from the training side; held-out rows with a
        // class the model never saw simply count as misses
        let mut classes: Vec<String> = train_idx.iter().map(|&i| labels[i].clone()).collect();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(Error::Training(
                "training partition collapsed to a single category".to_string(),
            ));
        }
        let class_index: HashMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(index, class)| (class.as_str(), index))
            .collect();

        let train_rows: Vec<_> = train_docs
            .iter()
            .map(|doc| vectorizer.transform(doc))
            .collect();
        let train_labels: Vec<usize> = train_idx
            .iter()
            .map(|&i| class_index[labels[i].as_str()])
            .collect();
        let sample_weights = balanced_weights(&train_labels, classes.len());

        let model = LinearSvc::train(
            &train_rows,
            &train_labels,
            classes.len(),
            &sample_weights,
            vectorizer.vocabulary_size(),
            SvmParams {
                epochs: config.epochs,
                lambda: config.lambda,
            },
            &mut rng,
        )
        .map_err(|e| Error::Training(e.to_string()))?;

        let mut correct = 0usize;
        for &i in &test_idx {
            let predicted = model.predict(&vectorizer.transform(&descriptions[i]));
            if class_index.get(labels[i].as_str()) == Some(&predicted) {
                correct += 1;
            }
        }
        let accuracy = correct as f64 / test_idx.len() as f64;
        debug!(
            "Classifier trained: {} classes, {}/{} held-out correct",
            classes.len(),
            correct,
            test_idx.len()
        );

        let report = ClassifierReport {
            accuracy,
            classes: classes.clone(),
            train_rows: split_train_rows,
            test_rows: test_idx.len(),
        };

        Ok(Self {
            vectorizer,
            model,
            classes,
            report,
        })
    }

    /// Predict a category for a free-form description.
    pub fn predict(&self, description: &str) -> &str {
        let vector = self.vectorizer.transform(description);
        &self.classes[self.model.predict(&vector)]
    }

    pub fn report(&self) -> &ClassifierReport {
        &self.report
    }
}

/// Replace categories with fewer than `min_count` examples by "Other".
fn merge_rare(labels: &mut [String], min_count: usize) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels.iter() {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }
    let rare: Vec<String> = counts
        .iter()
        .filter(|(_, &count)| count < min_count)
        .map(|(&label, _)| label.to_string())
        .collect();
    for label in labels.iter_mut() {
        if rare.iter().any(|r| r == label) {
            *label = OTHER_LABEL.to_string();
        }
    }
}

/// Shuffled train/test index split; the test side gets
/// `ceil(n * test_fraction)` rows, and both sides stay non-empty.
fn split<R: Rng>(n: usize, test_fraction: f64, rng: &mut R) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    let n_test = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);
    let test = indices.split_off(n - n_test);
    (indices, test)
}

/// Upsample the "Other" bucket in the training partition, with
/// replacement, to match the size of the rest. Test rows are untouched.
fn upsample_other<R: Rng>(labels: &[String], train_idx: &mut Vec<usize>, rng: &mut R) {
    let other: Vec<usize> = train_idx
        .iter()
        .copied()
        .filter(|&i| labels[i] == OTHER_LABEL)
        .collect();
    let common_count = train_idx.len() - other.len();
    if other.is_empty() || common_count <= other.len() {
        return;
    }

    train_idx.retain(|&i| labels[i] != OTHER_LABEL);
    for _ in 0..common_count {
        train_idx.push(other[rng.gen_range(0..other.len())]);
    }
}

/// Balanced class weights: `n_samples / (n_classes * count(class))`,
/// looked up per sample.
fn balanced_weights(labels: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &label in labels {
        counts[label] += 1;
    }
    let n = labels.len() as f64;
    labels
        .iter()
        .map(|&label| n / (n_classes as f64 * counts[label] as f64))
        .collect()
}
