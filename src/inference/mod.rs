//! Inference over the served model families
//!
//! Both families implement [`Classifier`], so serving code can run either
//! one through the same predict / predict_proba calls:
//! - [`LinearScaledModel`] scales raw features before a logistic regression
//! - [`TreeEnsembleModel`] feeds raw, name-checked features to a random forest

mod ensemble;
mod linear;

pub use ensemble::TreeEnsembleModel;
pub use linear::LinearScaledModel;

use crate::error::{Result, TurnoverError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Which served family a model belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    Logistic,
    Rf,
}

impl ModelFamily {
    /// Route prefix and artifact prefix for the family
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Logistic => "logistic",
            ModelFamily::Rf => "rf",
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fitted binary classifier over raw features in schema order.
pub trait Classifier: Send + Sync {
    fn family(&self) -> ModelFamily;

    /// Feature names the classifier reads, in column order
    fn feature_names(&self) -> &[String];

    /// Hard 0/1 class per row
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// `[p0, p1]` per row
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Probability of the positive class per row
    fn positive_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        if proba.ncols() != 2 {
            return Err(TurnoverError::Shape {
                expected: "2 probability columns".to_string(),
                actual: format!("{} probability columns", proba.ncols()),
            });
        }
        Ok(proba.column(1).to_owned())
    }
}

/// Turn positive-class probabilities into a `[p0, p1]` matrix.
pub(crate) fn two_column_proba(p1: &Array1<f64>) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((p1.len(), 2));
    for (mut row, &p) in out.rows_mut().into_iter().zip(p1.iter()) {
        row[0] = 1.0 - p;
        row[1] = p;
    }
    out
}
