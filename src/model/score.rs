// src/model/score.rs
use crate::analysis::Label;

/// Labels from malicious-class probabilities: malicious iff `p >= threshold`.
#[must_use]
pub fn predict_with_threshold(probas: &[f64], threshold: f64) -> Vec<Label> {
    probas
        .iter()
        .map(|&p| {
            if p >= threshold {
                Label::Malicious
            } else {
                Label::Benign
            }
        })
        .collect()
}

/// Confusion counts with `malicious` as the positive class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tn: usize,
    /// Share of correct predictions.
    pub detection: f64,
}

/// Compares predictions against ground truth.
///
/// Returns `None` when any true label is unknown, or there is nothing to score.
#[must_use]
pub fn score(truth: &[Label], predicted: &[Label]) -> Option<Score> {
    if truth.iter().any(|l| !l.is_known()) {
        tracing::warn!(
            "No ground truth given: unable to evaluate the accuracy of the predictions"
        );
        return None;
    }
    if truth.is_empty() {
        return None;
    }

    let (mut tp, mut fp, mut fn_, mut tn) = (0, 0, 0, 0);
    for (t, p) in truth.iter().zip(predicted) {
        match (t, p) {
            (Label::Malicious, Label::Malicious) => tp += 1,
            (Label::Benign, Label::Malicious) => fp += 1,
            (Label::Malicious, _) => fn_ += 1,
            _ => tn += 1,
        }
    }
    let total = tp + fp + fn_ + tn;
    #[allow(clippy::cast_precision_loss)]
    let detection = (tp + tn) as f64 / total as f64;
    Some(Score {
        tp,
        fp,
        fn_,
        tn,
        detection,
    })
}
