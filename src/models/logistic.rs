//! L2-regularized logistic regression, fit by batch gradient descent.
use ndarray::{Array1, Array2};

use crate::config::LogisticConfig;
use crate::error::ModelError;
use crate::models::{check_xy, Classifier};

pub struct LogisticRegression {
    config: LogisticConfig,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn new(config: LogisticConfig) -> Self {
        Self {
            config,
            coefficients: None,
            intercept: 0.0,
        }
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Fitted coefficients, one per encoded column.
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_xy(x, y)?;

        let n_samples = x.nrows() as f64;
        let mut weights: Array1<f64> = Array1::zeros(x.ncols());
        let mut bias = 0.0f64;

        let lr = self.config.learning_rate;
        let l2 = self.config.l2;

        for iter in 0..self.config.max_iter {
            let linear = x.dot(&weights) + bias;
            let predictions = Self::sigmoid(&linear);

            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples) + &(l2 * &weights);
            let db = errors.sum() / n_samples;

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.config.tol {
                log::debug!("Logistic regression converged after {} iterations", iter);
                break;
            }

            weights = weights - lr * &dw;
            bias -= lr * db;
        }

        if weights.iter().any(|w| !w.is_finite()) || !bias.is_finite() {
            return Err(ModelError::Fit("gradient descent diverged".to_string()));
        }

        self.coefficients = Some(weights);
        self.intercept = bias;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let weights = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != weights.len() {
            return Err(ModelError::Shape {
                expected: format!("{} columns", weights.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        let linear = x.dot(weights) + self.intercept;
        Ok(Self::sigmoid(&linear))
    }

    fn name(&self) -> &str {
        "Logistic Regression"
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        self.coefficients
            .as_ref()
            .map(|w| w.iter().map(|c| c.abs()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn separable_data_fits_cleanly() {
        let x = array![
            [-2.0, -1.5],
            [-1.5, -2.0],
            [-1.0, -1.0],
            [1.0, 1.5],
            [1.5, 1.0],
            [2.0, 2.0],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = LogisticRegression::new(LogisticConfig::default());
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[0] < 0.5);
        assert!(proba[5] > 0.5);
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn predict_before_fit_is_not_fitted() {
        let model = LogisticRegression::new(LogisticConfig::default());
        let err = model.predict_proba(&array![[1.0]]).unwrap_err();
        assert!(matches!(err, ModelError::NotFitted));
    }

    #[test]
    fn importances_are_absolute_coefficients() {
        let x = array![[-1.0, 0.0], [-0.5, 0.0], [0.5, 0.0], [1.0, 0.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut model = LogisticRegression::new(LogisticConfig::default());
        model.fit(&x, &y).unwrap();

        let importances = model.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        assert!(importances[0] > importances[1]);
        assert!(importances.iter().all(|v| *v >= 0.0));
    }
}
