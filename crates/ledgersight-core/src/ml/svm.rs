//! One-vs-rest linear support-vector classifier
//!
//! Trained by seeded stochastic subgradient descent on the hinge loss
//! with L2 regularization (Pegasos schedule). Per-sample weights carry
//! the class-balanced weighting, so small categories contribute as much
//! to the loss as large ones.

use rand::seq::SliceRandom;
use rand::Rng;

use super::tfidf::SparseVector;
use crate::error::{Error, Result};

/// A trained linear classifier over sparse input vectors.
#[derive(Debug)]
pub struct LinearSvc {
    /// One weight vector per class
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    n_classes: usize,
}

/// Training parameters; callers usually take these from
/// `ClassifierConfig`.
#[derive(Debug, Clone, Copy)]
pub struct SvmParams {
    pub epochs: usize,
    pub lambda: f64,
}

impl LinearSvc {
    /// Train on `rows` with class labels in `0..n_classes`.
    ///
    /// `sample_weights` scales each sample's hinge loss; pass the
    /// balanced class weight of the sample's true class.
    pub fn train<R: Rng>(
        rows: &[SparseVector],
        labels: &[usize],
        n_classes: usize,
        sample_weights: &[f64],
        dimension: usize,
        params: SvmParams,
        rng: &mut R,
    ) -> Result<Self> {
        if rows.is_empty() || rows.len() != labels.len() || rows.len() != sample_weights.len() {
            return Err(Error::ModelFit("inconsistent training data".to_string()));
        }
        if n_classes < 2 {
            return Err(Error::ModelFit(
                "linear SVC needs at least 2 classes".to_string(),
            ));
        }

        let mut weights = Vec::with_capacity(n_classes);
        let mut bias = Vec::with_capacity(n_classes);
        let mut order: Vec<usize> = (0..rows.len()).collect();

        for class in 0..n_classes {
            let (w, b) = train_binary(
                rows,
                labels,
                sample_weights,
                class,
                dimension,
                params,
                &mut order,
                rng,
            );
            weights.push(w);
            bias.push(b);
        }

        Ok(Self {
            weights,
            bias,
            n_classes,
        })
    }

    /// Signed distance to each class hyperplane.
    pub fn decision_function(&self, row: &SparseVector) -> Vec<f64> {
        (0..self.n_classes)
            .map(|class| dot(&self.weights[class], row) + self.bias[class])
            .collect()
    }

    /// Predicted class index: the hyperplane with the largest margin,
    /// lowest index on ties.
    pub fn predict(&self, row: &SparseVector) -> usize {
        let scores = self.decision_function(row);
        let mut best = 0;
        for (class, &score) in scores.iter().enumerate() {
            if score > scores[best] {
                best = class;
            }
        }
        best
    }
}

/// Pegasos on one one-vs-rest binary problem.
///
/// The weight vector is kept as `scale * accum` so the per-step shrink
/// stays O(1) and updates stay sparse.
#[allow(clippy::too_many_arguments)]
fn train_binary<R: Rng>(
    rows: &[SparseVector],
    labels: &[usize],
    sample_weights: &[f64],
    class: usize,
    dimension: usize,
    params: SvmParams,
    order: &mut [usize],
    rng: &mut R,
) -> (Vec<f64>, f64) {
    let mut accum = vec![0.0f64; dimension];
    let mut scale = 1.0f64;
    let mut b = 0.0f64;
    let mut t = 0usize;

    for _ in 0..params.epochs {
        order.shuffle(rng);
        for &i in order.iter() {
            t += 1;
            let eta = 1.0 / (params.lambda * t as f64);
            let y = if labels[i] == class { 1.0 } else { -1.0 };
            let margin = y * (scale * dot(&accum, &rows[i]) + b);

            // Shrink weights and bias alike; the intercept is part of
            // the regularized vector, as in liblinear
            scale *= 1.0 - eta * params.lambda;
            b *= 1.0 - eta * params.lambda;
            if scale < 1e-9 {
                for value in accum.iter_mut() {
                    *value *= scale;
                }
                scale = 1.0;
            }

            if margin < 1.0 {
                let step = eta * sample_weights[i] * y;
                for &(index, value) in &rows[i] {
                    accum[index] += step * value / scale;
                }
                b += step;
            }
        }
    }

    let weights = accum.into_iter().map(|value| value * scale).collect();
    (weights, b)
}

fn dot(dense: &[f64], sparse: &SparseVector) -> f64 {
    sparse
        .iter()
        .map(|&(index, value)| dense[index] * value)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params() -> SvmParams {
        SvmParams {
            epochs: 40,
            lambda: 1e-2,
        }
    }

    /// Two well-separated classes on two sparse dimensions.
    fn toy_data() -> (Vec<SparseVector>, Vec<usize>) {
        let rows = vec![
            vec![(0, 1.0)],
            vec![(0, 0.9), (1, 0.1)],
            vec![(0, 1.0), (1, 0.05)],
            vec![(1, 1.0)],
            vec![(0, 0.1), (1, 0.9)],
            vec![(1, 0.95)],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        (rows, labels)
    }

    #[test]
    fn test_separable_classes_learned() {
        let (rows, labels) = toy_data();
        let weights = vec![1.0; rows.len()];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let model =
            LinearSvc::train(&rows, &labels, 2, &weights, 2, params(), &mut rng).unwrap();

        assert_eq!(model.predict(&vec![(0, 1.0)]), 0);
        assert_eq!(model.predict(&vec![(1, 1.0)]), 1);
    }

    #[test]
    fn test_training_is_deterministic() {
        let (rows, labels) = toy_data();
        let weights = vec![1.0; rows.len()];

        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let model_a =
            LinearSvc::train(&rows, &labels, 2, &weights, 2, params(), &mut rng_a).unwrap();
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);
        let model_b =
            LinearSvc::train(&rows, &labels, 2, &weights, 2, params(), &mut rng_b).unwrap();

        let probe = vec![(0, 0.5), (1, 0.5)];
        assert_eq!(model_a.decision_function(&probe), model_b.decision_function(&probe));
    }

    #[test]
    fn test_single_class_rejected() {
        let rows = vec![vec![(0, 1.0)]];
        let labels = vec![0];
        let weights = vec![1.0];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(LinearSvc::train(&rows, &labels, 1, &weights, 1, params(), &mut rng).is_err());
    }

    #[test]
    fn test_three_way_classification() {
        let rows: Vec<SparseVector> = (0..15)
            .map(|i| vec![((i % 3) as usize, 1.0)])
            .collect();
        let labels: Vec<usize> = (0..15).map(|i| i % 3).collect();
        let weights = vec![1.0; rows.len()];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let model =
            LinearSvc::train(&rows, &labels, 3, &weights, 3, params(), &mut rng).unwrap();

        for class in 0..3 {
            assert_eq!(model.predict(&vec![(class, 1.0)]), class);
        }
    }
}
