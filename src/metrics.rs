//! Evaluation metrics over held-out predictions.
//!
//! Everything operates on plain label/probability slices so the trainer,
//! the registry, and any chart-building caller share one implementation.
//! The positive class is 1 throughout.
use serde::{Deserialize, Serialize};

/// Threshold probabilities into 0/1 labels; the threshold is inclusive.
pub fn classify(proba: &[f64], threshold: f64) -> Vec<u8> {
    proba
        .iter()
        .map(|&p| if p >= threshold { 1 } else { 0 })
        .collect()
}

/// Map 0.0/1.0 targets to labels.
pub fn to_labels(y: &[f64]) -> Vec<u8> {
    y.iter().map(|&v| if v >= 0.5 { 1 } else { 0 }).collect()
}

pub fn accuracy(truth: &[u8], pred: &[u8]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth.iter().zip(pred.iter()).filter(|(t, p)| t == p).count();
    correct as f64 / truth.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(truth: &[u8], pred: &[u8]) -> Self {
        let mut cm = ConfusionMatrix {
            true_negatives: 0,
            false_positives: 0,
            false_negatives: 0,
            true_positives: 0,
        };
        for (&t, &p) in truth.iter().zip(pred.iter()) {
            match (t, p) {
                (0, 0) => cm.true_negatives += 1,
                (0, _) => cm.false_positives += 1,
                (_, 0) => cm.false_negatives += 1,
                _ => cm.true_positives += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    pub fn precision(&self) -> f64 {
        let denom = self.true_positives + self.false_positives;
        if denom == 0 {
            return 0.0;
        }
        self.true_positives as f64 / denom as f64
    }

    pub fn recall(&self) -> f64 {
        let denom = self.true_positives + self.false_negatives;
        if denom == 0 {
            return 0.0;
        }
        self.true_positives as f64 / denom as f64
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }
}

/// ROC curve points, one per distinct score threshold, from the most
/// permissive operating point (0,0) to (1,1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// Area under the curve by trapezoidal rule.
    pub fn auc(&self) -> f64 {
        let mut area = 0.0;
        for w in self.fpr.windows(2).zip(self.tpr.windows(2)) {
            let (fpr, tpr) = w;
            area += (fpr[1] - fpr[0]) * (tpr[1] + tpr[0]) / 2.0;
        }
        area
    }
}

pub fn roc_curve(truth: &[u8], proba: &[f64]) -> RocCurve {
    let positives = truth.iter().filter(|&&t| t == 1).count();
    let negatives = truth.len() - positives;

    let mut order: Vec<usize> = (0..truth.len()).collect();
    order.sort_by(|&a, &b| {
        proba[b]
            .partial_cmp(&proba[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thresholds = vec![f64::INFINITY];

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0;
    while i < order.len() {
        let score = proba[order[i]];
        // Consume every sample tied at this score before emitting a point.
        while i < order.len() && proba[order[i]] == score {
            if truth[order[i]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        fpr.push(if negatives > 0 {
            fp as f64 / negatives as f64
        } else {
            0.0
        });
        tpr.push(if positives > 0 {
            tp as f64 / positives as f64
        } else {
            0.0
        });
        thresholds.push(score);
    }

    RocCurve {
        fpr,
        tpr,
        thresholds,
    }
}

/// Precision/recall pairs swept over score thresholds, high to low.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
}

pub fn precision_recall_curve(truth: &[u8], proba: &[f64]) -> PrCurve {
    let positives = truth.iter().filter(|&&t| t == 1).count();

    let mut order: Vec<usize> = (0..truth.len()).collect();
    order.sort_by(|&a, &b| {
        proba[b]
            .partial_cmp(&proba[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut precision = Vec::new();
    let mut recall = Vec::new();

    let mut tp = 0usize;
    let mut predicted = 0usize;
    let mut i = 0;
    while i < order.len() {
        let score = proba[order[i]];
        while i < order.len() && proba[order[i]] == score {
            if truth[order[i]] == 1 {
                tp += 1;
            }
            predicted += 1;
            i += 1;
        }
        precision.push(tp as f64 / predicted as f64);
        recall.push(if positives > 0 {
            tp as f64 / positives as f64
        } else {
            0.0
        });
    }

    PrCurve { precision, recall }
}

/// The summary numbers the model-insight view consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

pub fn evaluate(truth: &[u8], proba: &[f64], threshold: f64) -> ModelMetrics {
    let pred = classify(proba, threshold);
    let cm = ConfusionMatrix::from_predictions(truth, &pred);
    ModelMetrics {
        accuracy: accuracy(truth, &pred),
        precision: cm.precision(),
        recall: cm.recall(),
        f1: cm.f1(),
        roc_auc: roc_curve(truth, proba).auc(),
    }
}
