//! Out-of-sample evaluation against a second dataset file

use super::round_to;
use crate::data::DatasetLoader;
use crate::error::Result;
use crate::inference::Classifier;
use crate::training::ClassificationMetrics;
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct NewDataMetrics {
    pub accuracy: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub auc: f64,
    pub total_samples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewDataReport {
    pub metrics: NewDataMetrics,
    /// `[[tn, fp], [fn, tp]]`
    pub confusion_matrix: [[usize; 2]; 2],
}

/// Read `path` fresh and score `model` on every row.
///
/// Missing schema columns surface as [`crate::error::TurnoverError::MissingColumns`].
pub fn evaluate_new_data(model: &dyn Classifier, path: &Path) -> Result<NewDataReport> {
    let dataset = DatasetLoader::new().load(path)?;
    let y = dataset.targets()?;
    let x = dataset.features();

    let y_pred = model.predict(&x)?;
    let y_score = model.positive_proba(&x)?;
    let metrics = ClassificationMetrics::compute(&y, &y_pred, &y_score)?;

    info!(
        family = %model.family(),
        rows = metrics.n_samples,
        accuracy = metrics.accuracy,
        "New data evaluated"
    );

    Ok(NewDataReport {
        metrics: NewDataMetrics {
            accuracy: round_to(metrics.accuracy, 4),
            recall: round_to(metrics.recall, 4),
            f1_score: round_to(metrics.f1_score, 4),
            auc: round_to(metrics.auc, 4),
            total_samples: metrics.n_samples,
        },
        confusion_matrix: metrics.confusion.to_nested(),
    })
}
