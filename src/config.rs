use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Central configuration for the training pipeline.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PipelineConfig {
    /// Path to the CSV dataset read once at startup.
    pub dataset_path: PathBuf,
    /// Name of the binary target column.
    pub target_column: String,
    /// Fraction of rows held out for testing.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub split_seed: u64,
    /// Hyper-parameters for the fixed model slate.
    pub models: ModelSlateConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("heart.csv"),
            target_column: "Target".to_string(),
            test_fraction: 0.2,
            split_seed: 42,
            models: ModelSlateConfig::default(),
        }
    }
}

/// Hyper-parameters for each member of the model slate. Slate order is
/// fixed by [`ModelKind::slate`], not by this struct.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ModelSlateConfig {
    pub logistic: LogisticConfig,
    pub forest: ForestConfig,
    pub gbdt: GbdtConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogisticConfig {
    pub learning_rate: f64,
    /// L2 regularization strength.
    pub l2: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            l2: 0.01,
            max_iter: 1000,
            tol: 1e-6,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GbdtConfig {
    pub max_depth: u32,
    pub iterations: usize,
    pub shrinkage: f32,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            iterations: 100,
            shrinkage: 0.1,
        }
    }
}

/// The classifier variants the trainer compares.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Logistic,
    Forest,
    GradientBoosting,
}

impl ModelKind {
    /// The fixed slate, in training and tie-break order.
    pub fn slate() -> [ModelKind; 3] {
        [
            ModelKind::Logistic,
            ModelKind::Forest,
            ModelKind::GradientBoosting,
        ]
    }

    /// Display name used in the registry and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Logistic => "Logistic Regression",
            ModelKind::Forest => "Random Forest",
            ModelKind::GradientBoosting => "Gradient Boosting",
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic" | "logistic regression" => Ok(ModelKind::Logistic),
            "forest" | "random forest" => Ok(ModelKind::Forest),
            "gbdt" | "gradient boosting" => Ok(ModelKind::GradientBoosting),
            _ => Err(format!("Unknown model kind: {}", s)),
        }
    }
}
