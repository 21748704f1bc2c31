//! One-shot evaluation on the held-out split, run while loading

use super::LoadedModel;
use crate::data::Dataset;
use crate::error::{Result, TurnoverError};
use crate::inference::Classifier;
use crate::training::{ClassificationMetrics, StratifiedSplit, TrainTestSplit};
use ndarray::Axis;
use serde::Serialize;
use tracing::{info, warn};

/// Placeholder shown when evaluation could not run
pub const NOT_AVAILABLE: &str = "N/A";

/// Held-out metrics plus the split sizes they came from
#[derive(Debug, Clone)]
pub struct HeldOutEvaluation {
    pub metrics: ClassificationMetrics,
    pub total_samples: usize,
    pub train_size: usize,
    pub test_size: usize,
}

/// Re-split the full dataset and score the model on the test part.
pub fn evaluate_held_out(model: &LoadedModel, dataset: &Dataset, splitter: &StratifiedSplit) -> Result<HeldOutEvaluation> {
    if dataset.is_empty() {
        return Err(TurnoverError::Data("dataset is empty".to_string()));
    }
    let split = splitter.split(&dataset.targets()?)?;
    evaluate_split(model, dataset, &split)
}

/// Score the model on the test rows of an existing split.
///
/// The linear family is scaled on the full matrix before selecting rows,
/// the same order its artifacts were fitted in.
pub fn evaluate_split(model: &LoadedModel, dataset: &Dataset, split: &TrainTestSplit) -> Result<HeldOutEvaluation> {
    let y = dataset.targets()?;
    if let Some(&bad) = split.test_indices.iter().chain(&split.train_indices).find(|&&i| i >= y.len()) {
        return Err(TurnoverError::Data(format!("split index {} out of range for {} rows", bad, y.len())));
    }
    let x = match model {
        LoadedModel::Linear(linear) => linear.scaler().transform(&dataset.features())?,
        LoadedModel::Ensemble(_) => dataset.features(),
    };

    let x_test = x.select(Axis(0), &split.test_indices);
    let y_test = y.select(Axis(0), &split.test_indices);

    let (y_pred, y_score) = match model {
        LoadedModel::Linear(linear) => {
            let p1 = linear.positive_proba_scaled(&x_test)?;
            (p1.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }), p1)
        }
        LoadedModel::Ensemble(ensemble) => (ensemble.predict(&x_test)?, ensemble.positive_proba(&x_test)?),
    };

    let metrics = ClassificationMetrics::compute(&y_test, &y_pred, &y_score)?;

    Ok(HeldOutEvaluation {
        metrics,
        total_samples: dataset.len(),
        train_size: split.train_indices.len(),
        test_size: split.test_indices.len(),
    })
}

/// A value reported either as a count or as display text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reported {
    Count(usize),
    Text(String),
}

impl Reported {
    fn na() -> Self {
        Reported::Text(NOT_AVAILABLE.to_string())
    }
}

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reported::Count(n) => write!(f, "{}", n),
            Reported::Text(s) => f.write_str(s),
        }
    }
}

/// Fixed startup snapshot served by the info endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSnapshot {
    pub recall: String,
    pub f1_score: String,
    pub auc: String,
    pub total_samples: Reported,
    pub train_size: Reported,
    pub test_size: Reported,
}

impl EvaluationSnapshot {
    /// The "N/A" bundle. `total_samples` is still reported when the dataset loaded.
    pub fn unavailable(total_samples: Option<usize>) -> Self {
        Self {
            recall: NOT_AVAILABLE.to_string(),
            f1_score: NOT_AVAILABLE.to_string(),
            auc: NOT_AVAILABLE.to_string(),
            total_samples: total_samples.map(Reported::Count).unwrap_or_else(Reported::na),
            train_size: Reported::na(),
            test_size: Reported::na(),
        }
    }

    pub fn from_evaluation(eval: &HeldOutEvaluation) -> Self {
        Self {
            recall: format!("{:.4}", eval.metrics.recall),
            f1_score: format!("{:.4}", eval.metrics.f1_score),
            auc: format!("{:.4}", eval.metrics.auc),
            total_samples: Reported::Count(eval.total_samples),
            train_size: Reported::Count(eval.train_size),
            test_size: Reported::Count(eval.test_size),
        }
    }

    /// Run the held-out evaluation, degrading to the N/A bundle on any failure.
    pub fn compute(family: &str, model: Option<&LoadedModel>, dataset: Option<&Dataset>) -> Self {
        let total = dataset.map(Dataset::len);

        let (model, dataset) = match (model, dataset) {
            (Some(m), Some(d)) => (m, d),
            _ => {
                warn!(family, model_ready = model.is_some(), data_ready = dataset.is_some(), "Skipping evaluation");
                return Self::unavailable(total);
            }
        };

        match evaluate_held_out(model, dataset, &StratifiedSplit::default()) {
            Ok(eval) => {
                info!(
                    family,
                    recall = eval.metrics.recall,
                    f1 = eval.metrics.f1_score,
                    auc = eval.metrics.auc,
                    test_size = eval.test_size,
                    "Held-out evaluation complete"
                );
                Self::from_evaluation(&eval)
            }
            Err(e) => {
                warn!(family, error = %e, "Evaluation failed, reporting N/A");
                Self::unavailable(total)
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.recall != NOT_AVAILABLE
    }
}
