//! Random forest: bootstrap-sampled decision trees fit in parallel, each
//! with its own derived seed so training is deterministic end to end.
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::ForestConfig;
use crate::error::ModelError;
use crate::models::tree::DecisionTree;
use crate::models::{check_xy, Classifier};

pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    feature_importances: Option<Vec<f64>>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            feature_importances: None,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn compute_feature_importances(&mut self, n_features: usize) {
        if self.trees.is_empty() {
            return;
        }
        let mut total = vec![0.0; n_features];
        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (slot, &value) in total.iter_mut().zip(imp.iter()) {
                    *slot += value;
                }
            }
        }
        let n_trees = self.trees.len() as f64;
        for value in &mut total {
            *value /= n_trees;
        }
        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for value in &mut total {
                *value /= sum;
            }
        }
        self.feature_importances = Some(total);
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_xy(x, y)?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let max_features = (n_features as f64).sqrt().ceil() as usize;
        let base_seed = self.config.seed;

        let trees: Vec<Result<DecisionTree, ModelError>> = (0..self.config.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));

                let sample_indices: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                let mut tree = DecisionTree::new();
                tree.max_depth = self.config.max_depth;
                tree.min_samples_split = self.config.min_samples_split;
                tree.min_samples_leaf = self.config.min_samples_leaf;
                tree.max_features = Some(max_features.max(1));

                tree.fit(&x_boot, &y_boot, &mut rng)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees.into_iter().collect::<Result<Vec<_>, _>>()?;
        self.compute_feature_importances(n_features);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }

        let mut proba = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            proba = proba + tree.predict_proba(x)?;
        }
        Ok(proba / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        "Random Forest"
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        self.feature_importances.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_estimators: 25,
            max_depth: Some(4),
            seed: 42,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn learns_a_separable_problem() {
        let x = array![
            [0.0, 0.1],
            [0.1, 0.0],
            [0.2, 0.2],
            [0.1, 0.1],
            [1.0, 1.1],
            [1.1, 1.0],
            [1.2, 1.2],
            [1.0, 1.0],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut forest = RandomForest::new(small_config());
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.n_trees(), 25);

        let proba = forest.predict_proba(&x).unwrap();
        assert!(proba[0] < 0.5, "class-0 sample scored {}", proba[0]);
        assert!(proba[7] > 0.5, "class-1 sample scored {}", proba[7]);
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn fit_is_deterministic_for_a_seed() {
        let x = Array2::from_shape_fn((30, 3), |(r, c)| ((r * 7 + c * 3) % 13) as f64);
        let y = Array1::from_shape_fn(30, |i| ((i * 5) % 2) as f64);

        let mut a = RandomForest::new(small_config());
        let mut b = RandomForest::new(small_config());
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn importances_normalize_to_one() {
        let x = array![
            [0.0, 5.0],
            [0.5, 5.0],
            [1.5, 5.0],
            [2.0, 5.0],
            [0.2, 5.0],
            [1.8, 5.0],
        ];
        let y = array![0.0, 0.0, 1.0, 1.0, 0.0, 1.0];

        let mut forest = RandomForest::new(small_config());
        forest.fit(&x, &y).unwrap();

        let importances = forest.feature_importances().unwrap();
        let sum: f64 = importances.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "importances sum to {}", sum);
        assert!(importances[0] > importances[1]);
    }
}
