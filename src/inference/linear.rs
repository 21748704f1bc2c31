//! Scaler + logistic regression

use super::{two_column_proba, Classifier, ModelFamily};
use crate::error::{Result, TurnoverError};
use crate::preprocessing::Scaler;
use crate::training::LogisticRegression;
use ndarray::{Array1, Array2};

/// Logistic regression that always sees standardized features.
#[derive(Debug, Clone)]
pub struct LinearScaledModel {
    scaler: Scaler,
    model: LogisticRegression,
}

impl LinearScaledModel {
    /// Pair a fitted scaler with a fitted model; widths must agree.
    pub fn new(scaler: Scaler, model: LogisticRegression) -> Result<Self> {
        if !scaler.is_fitted() || !model.is_fitted {
            return Err(TurnoverError::ModelNotFitted);
        }
        let n_model = model.n_features().unwrap_or(0);
        if scaler.params().len() != n_model {
            return Err(TurnoverError::Shape {
                expected: format!("scaler with {} columns", n_model),
                actual: format!("scaler with {} columns", scaler.params().len()),
            });
        }
        Ok(Self { scaler, model })
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn estimator(&self) -> &LogisticRegression {
        &self.model
    }

    /// Positive-class probability for rows that are already scaled
    pub fn positive_proba_scaled(&self, x_scaled: &Array2<f64>) -> Result<Array1<f64>> {
        self.model.predict_proba(x_scaled)
    }
}

impl Classifier for LinearScaledModel {
    fn family(&self) -> ModelFamily {
        ModelFamily::Logistic
    }

    fn feature_names(&self) -> &[String] {
        self.scaler.feature_names()
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scaled = self.scaler.transform(x)?;
        self.model.predict(&scaled)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let scaled = self.scaler.transform(x)?;
        let p1 = self.model.predict_proba(&scaled)?;
        Ok(two_column_proba(&p1))
    }
}
