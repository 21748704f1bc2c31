//! Feature scaling implementations

use crate::error::{Result, TurnoverError};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Type of scaler to use; recorded in the artifact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
}

/// Parameters for one fitted column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub center: f64, // mean
    pub scale: f64,  // std
}

/// Feature scaler fitted on an ordered set of columns.
///
/// Standard scaling uses the population standard deviation, so a scaler
/// fitted here matches one fitted offline with the usual z-score convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    feature_names: Vec<String>,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            feature_names: Vec::new(),
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Build an already-fitted scaler from known parameters.
    pub fn from_params(scaler_type: ScalerType, feature_names: Vec<String>, params: Vec<ScalerParams>) -> Result<Self> {
        if feature_names.len() != params.len() {
            return Err(TurnoverError::Shape {
                expected: format!("{} scaler params", feature_names.len()),
                actual: format!("{} scaler params", params.len()),
            });
        }
        if params.iter().any(|p| p.scale == 0.0 || !p.scale.is_finite() || !p.center.is_finite()) {
            return Err(TurnoverError::Input("scaler params must be finite with a non-zero scale".to_string()));
        }
        Ok(Self {
            scaler_type,
            feature_names,
            params,
            is_fitted: true,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fit the scaler to the columns of `x`, named by `feature_names`.
    pub fn fit(&mut self, x: &Array2<f64>, feature_names: &[String]) -> Result<&mut Self> {
        if x.ncols() != feature_names.len() {
            return Err(TurnoverError::Shape {
                expected: format!("{} columns", feature_names.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        if x.nrows() == 0 {
            return Err(TurnoverError::Data("cannot fit a scaler on zero rows".to_string()));
        }

        self.params = x
            .axis_iter(Axis(1))
            .map(|column| self.compute_params(&column.to_vec()))
            .collect();
        self.feature_names = feature_names.to_vec();
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform `x` column by column with the fitted parameters.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(TurnoverError::ModelNotFitted);
        }
        if x.ncols() != self.params.len() {
            return Err(TurnoverError::Shape {
                expected: format!("{} features", self.params.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut out = x.clone();
        for (mut column, params) in out.axis_iter_mut(Axis(1)).zip(self.params.iter()) {
            column.mapv_inplace(|v| (v - params.center) / params.scale);
        }
        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>, feature_names: &[String]) -> Result<Array2<f64>> {
        self.fit(x, feature_names)?;
        self.transform(x)
    }

    fn compute_params(&self, values: &[f64]) -> ScalerParams {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        ScalerParams {
            center: mean,
            scale: if std == 0.0 { 1.0 } else { std },
        }
    }
}
