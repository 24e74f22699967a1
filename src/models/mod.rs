pub mod factory;
pub mod forest;
pub mod gbdt;
pub mod logistic;
mod tree;

use ndarray::{Array1, Array2};

use crate::error::ModelError;

/// The contract every slate member implements. Targets are 0/1;
/// predictions are class-1 probabilities.
///
/// `Send + Sync` is part of the contract: once fitted, models are read
/// concurrently by inference without locking.
pub trait Classifier: Send + Sync {
    /// Fit on the scaled training partition.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError>;

    /// Class-1 probability per row, in [0, 1].
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;

    /// Human readable name used in the registry and logs.
    fn name(&self) -> &str;

    /// Per-encoded-column importances, when the variant supports them.
    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

fn check_xy(x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
    if x.nrows() != y.len() {
        return Err(ModelError::Shape {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(ModelError::Fit("empty training matrix".to_string()));
    }
    Ok(())
}
