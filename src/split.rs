//! Seeded train/test partitioning and feature standardization.
//!
//! The split must be reproducible: the same seed and input always yield
//! the same partition. The scaler is fit on the training partition only
//! and applied, never re-fit, to test data and inference inputs.
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Train/test partitions of the conditioned data.
#[derive(Debug, Clone)]
pub struct SplitData {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Seeded random split. The test partition takes `ceil(n * test_fraction)`
/// rows of the shuffled index order.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_fraction: f64,
    seed: u64,
) -> SplitData {
    let n_samples = x.nrows();
    let mut indices: Vec<usize> = (0..n_samples).collect();

    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n_samples as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(n_samples);
    let (test_idx, train_idx) = indices.split_at(n_test);

    SplitData {
        x_train: x.select(Axis(0), train_idx),
        x_test: x.select(Axis(0), test_idx),
        y_train: y.select(Axis(0), train_idx),
        y_test: y.select(Axis(0), test_idx),
    }
}

/// Per-column mean/std standardization.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl StandardScaler {
    /// Minimum stddev to avoid division by zero on constant columns.
    const MIN_STD: f64 = 1e-12;

    /// Fit from a matrix where rows are samples and columns are features.
    pub fn fit(x: &Array2<f64>) -> Self {
        let (nrows, ncols) = x.dim();
        assert!(nrows > 0 && ncols > 0, "fit requires a non-empty matrix");

        let n = nrows as f64;
        let mut mean = Array1::zeros(ncols);
        for row in x.rows() {
            mean = mean + row.to_owned();
        }
        mean.mapv_inplace(|v| v / n);

        let mut var = Array1::<f64>::zeros(ncols);
        for row in x.rows() {
            for (c, &value) in row.iter().enumerate() {
                let d = value - mean[c];
                var[c] += d * d;
            }
        }
        let std = var.mapv(|v| (v / n).sqrt().max(Self::MIN_STD));

        StandardScaler { mean, std }
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = x.clone();
        for mut row in out.rows_mut() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = (*value - self.mean[c]) / self.std[c];
            }
        }
        out
    }

    pub fn transform_row(&self, row: &Array1<f64>) -> Array1<f64> {
        (row - &self.mean) / &self.std
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }

    pub fn fit_transform(x: &Array2<f64>) -> (Self, Array2<f64>) {
        let scaler = Self::fit(x);
        let transformed = scaler.transform(x);
        (scaler, transformed)
    }
}
