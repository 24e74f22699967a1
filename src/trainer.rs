//! Slate training, scoring, and best-model selection.
//!
//! Each slate member is fitted and scored independently: one model's
//! failure is logged and recorded as zero accuracy without disturbing the
//! rest. Training fails as a whole only when nothing could be fitted.
use ndarray::{Array1, Array2};

use crate::error::TrainError;
use crate::metrics;
use crate::models::Classifier;

/// One trained (or failed) slate member.
pub struct ModelEntry {
    name: String,
    /// Held-out test accuracy, as a percentage.
    accuracy: f64,
    fitted: bool,
    classifier: Box<dyn Classifier>,
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry")
            .field("name", &self.name)
            .field("accuracy", &self.accuracy)
            .field("fitted", &self.fitted)
            .finish_non_exhaustive()
    }
}

impl ModelEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

/// All slate members in training order, plus the best-model pointer.
/// Created once at startup, read-only afterwards.
#[derive(Debug)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
    best: usize,
}

impl ModelRegistry {
    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn best(&self) -> &ModelEntry {
        &self.entries[self.best]
    }

    pub fn best_name(&self) -> &str {
        self.best().name()
    }

    /// Name/accuracy pairs for registry introspection.
    pub fn accuracies(&self) -> Vec<(&str, f64)> {
        self.entries
            .iter()
            .map(|e| (e.name(), e.accuracy()))
            .collect()
    }
}

/// Fit every slate member on the scaled training partition and score it on
/// the held-out test partition.
pub fn train_models(
    slate: Vec<Box<dyn Classifier>>,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
) -> Result<ModelRegistry, TrainError> {
    let truth = metrics::to_labels(&y_test.to_vec());
    let mut entries = Vec::with_capacity(slate.len());

    for mut model in slate {
        let name = model.name().to_string();
        let scored = model
            .fit(x_train, y_train)
            .and_then(|_| model.predict_proba(x_test));

        match scored {
            Ok(proba) => {
                let pred = metrics::classify(&proba.to_vec(), 0.5);
                let accuracy = metrics::accuracy(&truth, &pred) * 100.0;
                log::info!("{}: test accuracy {:.2}%", name, accuracy);
                entries.push(ModelEntry {
                    name,
                    accuracy,
                    fitted: true,
                    classifier: model,
                });
            }
            Err(err) => {
                log::warn!("{} failed to train: {}; recording 0 accuracy", name, err);
                entries.push(ModelEntry {
                    name,
                    accuracy: 0.0,
                    fitted: false,
                    classifier: model,
                });
            }
        }
    }

    // Strictly-highest accuracy among fitted members; earlier slate
    // position wins ties.
    let mut best: Option<usize> = None;
    for (idx, entry) in entries.iter().enumerate() {
        if !entry.fitted {
            continue;
        }
        match best {
            Some(current) if entries[current].accuracy >= entry.accuracy => {}
            _ => best = Some(idx),
        }
    }

    let best = best.ok_or(TrainError::NoModels)?;
    log::info!(
        "Best model: {} ({:.2}%)",
        entries[best].name(),
        entries[best].accuracy()
    );

    Ok(ModelRegistry { entries, best })
}
