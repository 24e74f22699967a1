use crate::config::{ModelKind, ModelSlateConfig};
use crate::models::forest::RandomForest;
use crate::models::gbdt::GradientBoosting;
use crate::models::logistic::LogisticRegression;
use crate::models::Classifier;

/// Build one boxed classifier for a slate member.
pub fn build_model(kind: ModelKind, config: &ModelSlateConfig) -> Box<dyn Classifier> {
    match kind {
        ModelKind::Logistic => Box::new(LogisticRegression::new(config.logistic.clone())),
        ModelKind::Forest => Box::new(RandomForest::new(config.forest.clone())),
        ModelKind::GradientBoosting => Box::new(GradientBoosting::new(config.gbdt.clone())),
    }
}

/// The full fixed slate, in training and tie-break order.
pub fn build_slate(config: &ModelSlateConfig) -> Vec<Box<dyn Classifier>> {
    ModelKind::slate()
        .into_iter()
        .map(|kind| build_model(kind, config))
        .collect()
}
