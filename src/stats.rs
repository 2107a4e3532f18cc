//! Binary classification scoring used for threshold selection.
//!
//! The whole pipeline optimizes a single objective: F-beta with beta = 0.5,
//! which weights precision twice as heavily as recall. Flagging a gap as an
//! intentional disabling event is a strong claim, so false positives cost
//! more than missed events.

/// Beta used for every threshold search and cross-validation score.
pub const DEFAULT_BETA: f64 = 0.5;

/// Confusion counts for binary {0,1} labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

/// Tally confusion counts between ground truth and predictions.
pub fn confusion_counts(y_true: &[u8], y_pred: &[u8]) -> ConfusionCounts {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "confusion counts require arrays of equal lengths"
    );

    let mut counts = ConfusionCounts {
        true_positives: 0,
        false_positives: 0,
        false_negatives: 0,
        true_negatives: 0,
    };
    for (&truth, &pred) in y_true.iter().zip(y_pred.iter()) {
        match (truth, pred) {
            (1, 1) => counts.true_positives += 1,
            (0, 1) => counts.false_positives += 1,
            (1, 0) => counts.false_negatives += 1,
            _ => counts.true_negatives += 1,
        }
    }
    counts
}

/// F-beta score for binary {0,1} labels.
///
/// F-beta = (1 + beta^2) * TP / ((1 + beta^2) * TP + beta^2 * FN + FP)
///
/// Returns 0.0 when the denominator is zero (no true positives and nothing
/// predicted or labeled positive), matching the scikit-learn zero-division
/// convention the labeled-gap analysis was calibrated against.
pub fn fbeta_score(y_true: &[u8], y_pred: &[u8], beta: f64) -> f64 {
    let counts = confusion_counts(y_true, y_pred);
    let beta_sq = beta * beta;

    let numerator = (1.0 + beta_sq) * counts.true_positives as f64;
    let denominator = numerator
        + beta_sq * counts.false_negatives as f64
        + counts.false_positives as f64;

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Mean of a score slice; 0.0 for an empty slice.
pub fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Standard error of the mean (sample standard deviation / sqrt(n)).
///
/// Returns 0.0 for fewer than two scores.
pub fn standard_error(scores: &[f64]) -> f64 {
    let n = scores.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(scores);
    let variance = scores.iter().map(|s| (s - m) * (s - m)).sum::<f64>() / (n - 1) as f64;
    (variance / n as f64).sqrt()
}
