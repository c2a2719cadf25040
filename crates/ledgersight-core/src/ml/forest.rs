//! Isolation forest outlier model
//!
//! An ensemble of randomly built partition trees. Points that isolate
//! in few splits score close to 1; points deep in the data's bulk score
//! near 0.5 or below. The fit is deterministic for a given RNG seed.

use rand::seq::index::sample;
use rand::Rng;

use super::FeatureMatrix;
use crate::error::Result;

const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_9;

#[derive(Debug)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

/// A fitted isolation forest.
#[derive(Debug)]
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit `n_trees` trees, each on a subsample of at most
    /// `max_samples` rows drawn without replacement.
    pub fn fit<R: Rng>(
        data: &FeatureMatrix,
        n_trees: usize,
        max_samples: usize,
        rng: &mut R,
    ) -> Result<Self> {
        data.validate()?;
        if n_trees == 0 {
            return Err(crate::error::Error::ModelFit(
                "isolation forest needs at least one tree".to_string(),
            ));
        }

        let sample_size = max_samples.min(data.n_rows()).max(1);
        // Grown past this depth, further splits carry no isolation signal
        let max_depth = (sample_size as f64).log2().ceil().max(1.0) as usize;

        let mut trees = Vec::with_capacity(n_trees);
        for _ in 0..n_trees {
            let indices = sample(rng, data.n_rows(), sample_size).into_vec();
            trees.push(build_tree(data, &indices, 0, max_depth, rng));
        }

        Ok(Self { trees, sample_size })
    }

    /// Anomaly score in (0, 1); higher is more anomalous.
    pub fn score(&self, row: &[f64]) -> f64 {
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| path_length(tree, row, 0))
            .sum();
        let mean_path = total / self.trees.len() as f64;
        2f64.powf(-mean_path / average_path_length(self.sample_size))
    }
}

fn build_tree<R: Rng>(
    data: &FeatureMatrix,
    indices: &[usize],
    depth: usize,
    max_depth: usize,
    rng: &mut R,
) -> Node {
    if indices.len() <= 1 || depth >= max_depth {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    // Features with any spread at this node; constant columns cannot split
    let splittable: Vec<usize> = (0..data.n_features())
        .filter(|&feature| {
            let (min, max) = column_range(data, indices, feature);
            max > min
        })
        .collect();
    if splittable.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let feature = splittable[rng.gen_range(0..splittable.len())];
    let (min, max) = column_range(data, indices, feature);
    let threshold = rng.gen_range(min..max);

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&index| data.row(index)[feature] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(data, &left, depth + 1, max_depth, rng)),
        right: Box::new(build_tree(data, &right, depth + 1, max_depth, rng)),
    }
}

fn column_range(data: &FeatureMatrix, indices: &[usize], feature: usize) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &index in indices {
        let value = data.row(index)[feature];
        min = min.min(value);
        max = max.max(value);
    }
    (min, max)
}

fn path_length(node: &Node, row: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] <= *threshold {
                path_length(left, row, depth + 1)
            } else {
                path_length(right, row, depth + 1)
            }
        }
    }
}

/// Expected path length of an unsuccessful BST search over `n` points;
/// the normalization constant from the isolation forest paper.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_MASCHERONI) - 2.0 * (n - 1.0) / n
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fit(values: Vec<f64>, seed: u64) -> (IsolationForest, FeatureMatrix) {
        let matrix = FeatureMatrix::single("money_out", values);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let forest = IsolationForest::fit(&matrix, 100, 256, &mut rng).unwrap();
        (forest, matrix)
    }

    #[test]
    fn test_extreme_point_scores_highest() {
        let mut values: Vec<f64> = (0..20).map(|i| 50.0 + i as f64).collect();
        values.push(5000.0);
        let (forest, matrix) = fit(values, 42);

        let scores: Vec<f64> = (0..matrix.n_rows())
            .map(|row| forest.score(matrix.row(row)))
            .collect();
        let top = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(index, _)| index)
            .unwrap();
        assert_eq!(top, 20);
        assert!(scores[20] > 0.6);
    }

    #[test]
    fn test_scores_are_deterministic() {
        let values: Vec<f64> = (0..30).map(|i| (i as f64) * 3.0 + 10.0).collect();
        let (forest_a, matrix) = fit(values.clone(), 9);
        let (forest_b, _) = fit(values, 9);

        for row in 0..matrix.n_rows() {
            assert_eq!(forest_a.score(matrix.row(row)), forest_b.score(matrix.row(row)));
        }
    }

    #[test]
    fn test_constant_data_fits_without_splitting() {
        let (forest, matrix) = fit(vec![25.0; 15], 1);
        // All points share one leaf, so all scores are equal
        let first = forest.score(matrix.row(0));
        for row in 1..matrix.n_rows() {
            assert_eq!(forest.score(matrix.row(row)), first);
        }
    }

    #[test]
    fn test_non_finite_data_rejected() {
        let matrix = FeatureMatrix::single("money_out", vec![1.0, f64::INFINITY]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(IsolationForest::fit(&matrix, 10, 256, &mut rng).is_err());
    }
}
