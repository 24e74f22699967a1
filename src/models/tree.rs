//! Binary classification decision tree used by the forest.
//!
//! Leaves store the class-1 fraction of the samples that reached them, so
//! tree predictions are probabilities and the forest can average them.
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::ModelError;

#[derive(Debug, Clone)]
pub(crate) enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of features considered per split; `None` means all.
    pub max_features: Option<usize>,
    n_features: usize,
    feature_importances: Option<Vec<f64>>,
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            n_features: 0,
            feature_importances: None,
        }
    }

    pub fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rng: &mut StdRng,
    ) -> Result<(), ModelError> {
        if x.nrows() != y.len() {
            return Err(ModelError::Shape {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(ModelError::Fit("empty training matrix".to_string()));
        }

        self.n_features = x.ncols();
        let mut importances = vec![0.0; self.n_features];
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0, &mut importances, rng));

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(importances);
        Ok(())
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut StdRng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let parent_impurity = gini(y, indices);

        let should_stop = n_samples < self.min_samples_split
            || parent_impurity == 0.0
            || self.max_depth.map_or(false, |d| depth >= d);
        if should_stop {
            return TreeNode::Leaf {
                value: positive_fraction(y, indices),
            };
        }

        let Some((feature_idx, threshold, gain)) = self.find_best_split(x, y, indices, rng) else {
            return TreeNode::Leaf {
                value: positive_fraction(y, indices),
            };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] <= threshold);
        if left_indices.len() < self.min_samples_leaf || right_indices.len() < self.min_samples_leaf
        {
            return TreeNode::Leaf {
                value: positive_fraction(y, indices),
            };
        }

        importances[feature_idx] += n_samples as f64 * gain;

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1, importances, rng));
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1, importances, rng));

        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut StdRng,
    ) -> Option<(usize, f64, f64)> {
        let n_features = x.ncols();
        let candidates: Vec<usize> = match self.max_features {
            Some(k) if k < n_features => {
                let mut all: Vec<usize> = (0..n_features).collect();
                all.shuffle(rng);
                all.truncate(k.max(1));
                all
            }
            _ => (0..n_features).collect(),
        };

        let parent_impurity = gini(y, indices);
        let n = indices.len() as f64;

        let mut best: Option<(usize, f64, f64)> = None;
        for feature_idx in candidates {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let mut left_n = 0usize;
                let mut left_pos = 0usize;
                let mut right_n = 0usize;
                let mut right_pos = 0usize;
                for &i in indices {
                    if x[[i, feature_idx]] <= threshold {
                        left_n += 1;
                        left_pos += (y[i] >= 0.5) as usize;
                    } else {
                        right_n += 1;
                        right_pos += (y[i] >= 0.5) as usize;
                    }
                }

                if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                    continue;
                }

                let weighted = (left_n as f64 * gini_counts(left_n, left_pos)
                    + right_n as f64 * gini_counts(right_n, right_pos))
                    / n;
                let gain = parent_impurity - weighted;

                if gain > 0.0 && best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((feature_idx, threshold, gain));
                }
            }
        }
        best
    }

    /// Class-1 probability per row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let root = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        let proba: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let row: Vec<f64> = x.row(i).to_vec();
                predict_sample(root, &row)
            })
            .collect();
        Ok(Array1::from_vec(proba))
    }

    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }
}

fn predict_sample(node: &TreeNode, sample: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value } => *value,
        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
        } => {
            if sample[*feature_idx] <= *threshold {
                predict_sample(left, sample)
            } else {
                predict_sample(right, sample)
            }
        }
    }
}

fn positive_fraction(y: &Array1<f64>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let pos = indices.iter().filter(|&&i| y[i] >= 0.5).count();
    pos as f64 / indices.len() as f64
}

fn gini(y: &Array1<f64>, indices: &[usize]) -> f64 {
    let pos = indices.iter().filter(|&&i| y[i] >= 0.5).count();
    gini_counts(indices.len(), pos)
}

/// Binary gini impurity from sample and positive counts: 2 p (1 - p).
fn gini_counts(n: usize, pos: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = pos as f64 / n as f64;
    2.0 * p * (1.0 - p)
}
