//! Integration tests for evaluation metrics and configuration defaults.
use std::str::FromStr;

use heartrisk::config::{ModelKind, PipelineConfig};
use heartrisk::metrics::{
    accuracy, classify, evaluate, precision_recall_curve, roc_curve, ConfusionMatrix,
};

#[test]
fn accuracy_counts_matches() {
    let truth = [1, 0, 1, 0];
    let pred = [1, 0, 0, 0];
    assert!((accuracy(&truth, &pred) - 0.75).abs() < 1e-12);
    assert_eq!(accuracy(&[], &[]), 0.0);
}

#[test]
fn evaluate_summarizes_a_good_classifier() {
    let truth = [0, 0, 0, 1, 1, 1];
    let proba = [0.1, 0.2, 0.6, 0.4, 0.8, 0.9];
    let m = evaluate(&truth, &proba, 0.5);

    assert!((m.accuracy - 4.0 / 6.0).abs() < 1e-12);
    assert!(m.precision > 0.0 && m.precision <= 1.0);
    assert!(m.recall > 0.0 && m.recall <= 1.0);
    assert!(m.f1 > 0.0 && m.f1 <= 1.0);
    assert!(m.roc_auc > 0.5 && m.roc_auc <= 1.0);
}

#[test]
fn roc_curve_starts_at_origin_and_ends_at_one_one() {
    let truth = [0, 1, 0, 1, 1];
    let proba = [0.2, 0.3, 0.5, 0.7, 0.9];
    let roc = roc_curve(&truth, &proba);

    assert_eq!((roc.fpr[0], roc.tpr[0]), (0.0, 0.0));
    let last = roc.fpr.len() - 1;
    assert_eq!((roc.fpr[last], roc.tpr[last]), (1.0, 1.0));
    assert_eq!(roc.fpr.len(), roc.tpr.len());
    assert_eq!(roc.fpr.len(), roc.thresholds.len());
}

#[test]
fn pr_curve_full_recall_at_lowest_threshold() {
    let truth = [0, 1, 1, 0];
    let proba = [0.1, 0.9, 0.6, 0.4];
    let pr = precision_recall_curve(&truth, &proba);

    assert_eq!(pr.recall.last().copied(), Some(1.0));
    assert!(pr.precision.iter().all(|p| (0.0..=1.0).contains(p)));
    assert_eq!(pr.precision[0], 1.0); // highest-scored sample is positive
}

#[test]
fn confusion_matrix_degenerate_rates() {
    let cm = ConfusionMatrix::from_predictions(&[0, 0], &[0, 0]);
    assert_eq!(cm.precision(), 0.0);
    assert_eq!(cm.recall(), 0.0);
    assert_eq!(cm.f1(), 0.0);
}

#[test]
fn classify_is_monotone_in_threshold() {
    let proba = [0.3, 0.5, 0.8];
    let low = classify(&proba, 0.2);
    let high = classify(&proba, 0.9);
    for (l, h) in low.iter().zip(high.iter()) {
        assert!(l >= h, "raising the threshold flipped 0 -> 1");
    }
}

#[test]
fn pipeline_defaults_match_the_deployment() {
    let config = PipelineConfig::default();
    assert_eq!(config.dataset_path.to_str(), Some("heart.csv"));
    assert_eq!(config.target_column, "Target");
    assert!((config.test_fraction - 0.2).abs() < 1e-12);
    assert_eq!(config.split_seed, 42);
}

#[test]
fn model_kind_parses_common_spellings() {
    assert_eq!(ModelKind::from_str("logistic").unwrap(), ModelKind::Logistic);
    assert_eq!(
        ModelKind::from_str("Random Forest").unwrap(),
        ModelKind::Forest
    );
    assert_eq!(
        ModelKind::from_str("gbdt").unwrap(),
        ModelKind::GradientBoosting
    );
    assert!(ModelKind::from_str("perceptron").is_err());
}

#[test]
fn slate_is_three_models_in_fixed_order() {
    let names: Vec<&str> = ModelKind::slate().iter().map(|k| k.name()).collect();
    assert_eq!(
        names,
        vec!["Logistic Regression", "Random Forest", "Gradient Boosting"]
    );
}
