//! Binary classification metrics

use crate::error::{Result, TurnoverError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Confusion counts for a binary problem (positive class = 1)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut cm = Self::default();

        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => cm.tp += 1,
                (false, true) => cm.fp += 1,
                (false, false) => cm.tn += 1,
                (true, false) => cm.fn_ += 1,
            }
        }

        cm
    }

    /// `[[tn, fp], [fn, tp]]`, rows are actual classes, columns predicted
    pub fn to_nested(&self) -> [[usize; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }
}

/// Metrics reported for a fitted classifier on a labelled set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub auc: f64,
    pub confusion: ConfusionMatrix,
    pub n_samples: usize,
}

impl ClassificationMetrics {
    /// Compute every metric from labels, hard predictions and positive-class
    /// scores. Fails when the labels hold a single class (AUC is undefined).
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>, y_score: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() || y_true.len() != y_score.len() {
            return Err(TurnoverError::Shape {
                expected: format!("{} predictions and scores", y_true.len()),
                actual: format!("{} predictions, {} scores", y_pred.len(), y_score.len()),
            });
        }
        if y_true.is_empty() {
            return Err(TurnoverError::Compute("no samples to score".to_string()));
        }

        let confusion = ConfusionMatrix::from_predictions(y_true, y_pred);
        let auc = roc_auc(y_true, y_score)?;

        Ok(Self {
            accuracy: accuracy(&confusion),
            precision: precision(&confusion),
            recall: recall(&confusion),
            f1_score: f1_score(&confusion),
            auc,
            confusion,
            n_samples: y_true.len(),
        })
    }
}

pub fn accuracy(cm: &ConfusionMatrix) -> f64 {
    ratio(cm.tp + cm.tn, cm.total())
}

pub fn precision(cm: &ConfusionMatrix) -> f64 {
    ratio(cm.tp, cm.tp + cm.fp)
}

pub fn recall(cm: &ConfusionMatrix) -> f64 {
    ratio(cm.tp, cm.tp + cm.fn_)
}

pub fn f1_score(cm: &ConfusionMatrix) -> f64 {
    let p = precision(cm);
    let r = recall(cm);
    if p + r > 0.0 {
        2.0 * p * r / (p + r)
    } else {
        0.0
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Area under the ROC curve via the rank-sum statistic; tied scores share
/// their average rank.
pub fn roc_auc(y_true: &Array1<f64>, y_score: &Array1<f64>) -> Result<f64> {
    let n_pos = y_true.iter().filter(|&&t| t > 0.5).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(TurnoverError::Compute(
            "AUC is undefined when only one class is present".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|&a, &b| {
        y_score[a]
            .partial_cmp(&y_score[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; order.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && y_score[order[j + 1]] == y_score[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1..=j+1 averaged
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(&t, _)| t > 0.5)
        .map(|(_, &r)| r)
        .sum();

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Ok((pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}
