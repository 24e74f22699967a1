//! Gradient boosting classifier wrapping the `gbdt` crate.
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};

use crate::config::GbdtConfig;
use crate::error::ModelError;
use crate::models::{check_xy, Classifier};

pub struct GradientBoosting {
    config: GbdtConfig,
    model: Option<GBDT>,
    n_features: usize,
}

impl GradientBoosting {
    pub fn new(config: GbdtConfig) -> Self {
        Self {
            config,
            model: None,
            n_features: 0,
        }
    }

    fn row_features(x: &Array2<f64>, row: usize) -> Vec<f32> {
        x.row(row).iter().map(|&v| v as f32).collect()
    }
}

impl Classifier for GradientBoosting {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_xy(x, y)?;

        let mut config = Config::new();
        config.set_feature_size(x.ncols());
        config.set_max_depth(self.config.max_depth);
        config.set_iterations(self.config.iterations);
        config.set_shrinkage(self.config.shrinkage);
        config.set_loss("LogLikelyhood");
        config.set_debug(false);
        config.set_training_optimization_level(2);

        let mut gbdt = GBDT::new(&config);

        // Log-likelihood loss wants labels in {1, -1}.
        let mut train: DataVec = DataVec::new();
        for row in 0..x.nrows() {
            let label = if y[row] >= 0.5 { 1.0 } else { -1.0 };
            train.push(Data::new_training_data(
                Self::row_features(x, row),
                1.0,
                label,
                None,
            ));
        }

        gbdt.fit(&mut train);

        self.model = Some(gbdt);
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let model = self.model.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(ModelError::Shape {
                expected: format!("{} columns", self.n_features),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut test: DataVec = DataVec::new();
        for row in 0..x.nrows() {
            test.push(Data::new_training_data(
                Self::row_features(x, row),
                1.0,
                0.0,
                None,
            ));
        }

        // Under log-likelihood loss `predict` already applies the logistic
        // transform; the clamp guards the [0, 1] contract.
        let predictions = model.predict(&test);
        Ok(Array1::from_vec(
            predictions
                .iter()
                .map(|&p| (p as f64).clamp(0.0, 1.0))
                .collect(),
        ))
    }

    fn name(&self) -> &str {
        "Gradient Boosting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn fits_and_scores_a_separable_problem() {
        let x = array![
            [0.1, 1.0],
            [0.4, 0.8],
            [0.2, 1.2],
            [0.3, 0.9],
            [2.1, -1.0],
            [2.4, -0.8],
            [2.2, -1.2],
            [2.3, -0.9],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut model = GradientBoosting::new(GbdtConfig {
            max_depth: 3,
            iterations: 20,
            shrinkage: 0.1,
        });
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(proba[0] < proba[4]);
    }

    #[test]
    fn predict_before_fit_is_not_fitted() {
        let model = GradientBoosting::new(GbdtConfig::default());
        let err = model.predict_proba(&array![[0.0]]).unwrap_err();
        assert!(matches!(err, ModelError::NotFitted));
    }
}
