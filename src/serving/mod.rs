//! Serving context
//!
//! Everything the HTTP layer reads is built once by [`ServingContext::load`]
//! and never mutated afterwards:
//! - the fitted model of each family (or its permanent `Unloaded` state)
//! - the chart sample
//! - the startup evaluation snapshot

pub mod chart;
pub mod evaluation;
pub mod info;
pub mod new_data;

pub use chart::{ChartData, ChartResponse};
pub use evaluation::{EvaluationSnapshot, HeldOutEvaluation, Reported};
pub use info::ModelInfoResponse;
pub use new_data::NewDataReport;

use crate::artifacts::{self, ArtifactPaths};
use crate::data::{Dataset, FeatureSchema};
use crate::error::{Result, TurnoverError};
use crate::inference::{Classifier, LinearScaledModel, ModelFamily, TreeEnsembleModel};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// A loaded model of either family
#[derive(Debug, Clone)]
pub enum LoadedModel {
    Linear(LinearScaledModel),
    Ensemble(TreeEnsembleModel),
}

impl LoadedModel {
    pub fn as_classifier(&self) -> &dyn Classifier {
        match self {
            LoadedModel::Linear(m) => m,
            LoadedModel::Ensemble(m) => m,
        }
    }
}

/// Readiness of a family's model
#[derive(Debug, Clone)]
pub enum PredictorState {
    Ready(LoadedModel),
    /// Load failed; stays this way until restart
    Unloaded,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub feature_names: Vec<String>,
    pub feature_values: [f64; 2],
    /// Positive-class probability as a percentage, two decimals
    pub prediction_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_class: Option<u8>,
}

/// One model family's predictor, chart sample and evaluation snapshot
#[derive(Debug, Clone)]
pub struct FamilyService {
    family: ModelFamily,
    predictor: PredictorState,
    chart: ChartData,
    evaluation: EvaluationSnapshot,
}

impl FamilyService {
    /// Build from already-loaded parts, running the startup evaluation.
    ///
    /// A family is all-or-nothing: without both the model and the dataset,
    /// the predictor, chart and evaluation are all left unloaded.
    pub fn new(family: ModelFamily, model: Option<LoadedModel>, dataset: Option<&Dataset>) -> Self {
        let (model, dataset) = match (model, dataset) {
            (Some(model), Some(dataset)) => (model, dataset),
            (model, dataset) => {
                warn!(
                    family = %family,
                    model_loaded = model.is_some(),
                    data_loaded = dataset.is_some(),
                    "Artifacts incomplete, family left unloaded"
                );
                return Self::unloaded(family);
            }
        };

        Self {
            family,
            evaluation: EvaluationSnapshot::compute(family.as_str(), Some(&model), Some(dataset)),
            chart: ChartData::from_dataset(dataset),
            predictor: PredictorState::Ready(model),
        }
    }

    /// Every part at its sentinel
    pub fn unloaded(family: ModelFamily) -> Self {
        Self {
            family,
            predictor: PredictorState::Unloaded,
            chart: ChartData::unloaded(),
            evaluation: EvaluationSnapshot::unavailable(None),
        }
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.predictor, PredictorState::Ready(_))
    }

    pub fn chart_ready(&self) -> bool {
        self.chart.is_loaded()
    }

    pub fn evaluation(&self) -> &EvaluationSnapshot {
        &self.evaluation
    }

    pub fn model(&self) -> Result<&LoadedModel> {
        match &self.predictor {
            PredictorState::Ready(model) => Ok(model),
            PredictorState::Unloaded => Err(TurnoverError::ModelNotLoaded),
        }
    }

    /// Single-row prediction for `(f1, f2)` in schema order.
    ///
    /// Any failure after the readiness check is reported as bad input.
    pub fn predict(&self, f1: f64, f2: f64) -> Result<PredictionResponse> {
        let model = self.model()?;
        self.predict_with(model, f1, f2).map_err(|e| {
            if e.is_client_error() {
                e
            } else {
                TurnoverError::Input(e.to_string())
            }
        })
    }

    fn predict_with(&self, model: &LoadedModel, f1: f64, f2: f64) -> Result<PredictionResponse> {
        if !f1.is_finite() || !f2.is_finite() {
            return Err(TurnoverError::Input("feature values must be finite".to_string()));
        }

        let row = FeatureSchema::row(f1, f2);
        let classifier = model.as_classifier();
        let p1 = classifier
            .positive_proba(&row)?
            .get(0)
            .copied()
            .ok_or_else(|| TurnoverError::Compute("empty prediction".to_string()))?;
        if !p1.is_finite() {
            return Err(TurnoverError::Compute(format!(
                "probability is not finite for f1={}, f2={}",
                f1, f2
            )));
        }

        let (feature_names, prediction_class) = match model {
            LoadedModel::Linear(_) => (
                FeatureSchema::DISPLAY_NAMES.iter().map(|s| s.to_string()).collect(),
                None,
            ),
            LoadedModel::Ensemble(ensemble) => {
                let class = ensemble.predict(&row)?.get(0).copied().unwrap_or(0.0);
                (ensemble.feature_names().to_vec(), Some(if class > 0.5 { 1 } else { 0 }))
            }
        };

        Ok(PredictionResponse {
            feature_names,
            feature_values: [f1, f2],
            prediction_probability: round_to(p1 * 100.0, 2),
            prediction_class,
        })
    }

    pub fn chart_data(&self) -> Result<ChartResponse> {
        self.chart.response()
    }

    pub fn model_info(&self) -> ModelInfoResponse {
        info::model_info(self.family, &self.evaluation)
    }
}

/// Immutable state shared by every request
#[derive(Debug, Clone)]
pub struct ServingContext {
    pub logistic: FamilyService,
    pub rf: FamilyService,
    new_data_path: PathBuf,
}

impl ServingContext {
    /// Load both families from `paths`. Never fails: anything missing leaves
    /// the affected family unloaded and is logged.
    pub fn load(paths: &ArtifactPaths) -> Self {
        let dataset = match artifacts::load_dataset(&paths.dataset) {
            Ok(ds) => {
                info!(rows = ds.len(), "Dataset loaded");
                Some(ds)
            }
            Err(e) => {
                error!(path = %paths.dataset.display(), error = %e, "Dataset failed to load");
                None
            }
        };

        let linear = match artifacts::load_linear_model(paths) {
            Ok(m) => Some(LoadedModel::Linear(m)),
            Err(e) => {
                error!(
                    model = %paths.logistic_model.display(),
                    scaler = %paths.logistic_scaler.display(),
                    error = %e,
                    "Logistic model failed to load"
                );
                None
            }
        };

        let ensemble = match artifacts::load_ensemble_model(paths) {
            Ok(m) => Some(LoadedModel::Ensemble(m)),
            Err(e) => {
                error!(
                    model = %paths.rf_model.display(),
                    features = %paths.rf_features.display(),
                    error = %e,
                    "Random forest failed to load"
                );
                None
            }
        };

        let ctx = Self::from_parts(linear, ensemble, dataset.as_ref(), paths.new_data.clone());
        info!(
            logistic_ready = ctx.logistic.is_ready(),
            rf_ready = ctx.rf.is_ready(),
            chart_ready = ctx.logistic.chart_ready(),
            "Serving context ready"
        );
        ctx
    }

    pub fn from_parts(
        linear: Option<LoadedModel>,
        ensemble: Option<LoadedModel>,
        dataset: Option<&Dataset>,
        new_data_path: PathBuf,
    ) -> Self {
        Self {
            logistic: FamilyService::new(ModelFamily::Logistic, linear, dataset),
            rf: FamilyService::new(ModelFamily::Rf, ensemble, dataset),
            new_data_path,
        }
    }

    pub fn family(&self, family: ModelFamily) -> &FamilyService {
        match family {
            ModelFamily::Logistic => &self.logistic,
            ModelFamily::Rf => &self.rf,
        }
    }

    pub fn new_data_path(&self) -> &std::path::Path {
        &self.new_data_path
    }

    /// Score the random forest on the secondary dataset, read on every call.
    pub fn evaluate_new_data(&self) -> Result<NewDataReport> {
        let model = self.rf.model()?;
        new_data::evaluate_new_data(model.as_classifier(), &self.new_data_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DatasetRecord;
    use crate::preprocessing::{Scaler, ScalerParams, ScalerType};
    use crate::training::LogisticRegression;
    use ndarray::{array, Array1};

    fn linear(center: [f64; 2], scale: [f64; 2], coefficients: Array1<f64>, intercept: f64) -> LoadedModel {
        let scaler = Scaler::from_params(
            ScalerType::Standard,
            FeatureSchema::names(),
            vec![
                ScalerParams { center: center[0], scale: scale[0] },
                ScalerParams { center: center[1], scale: scale[1] },
            ],
        )
        .unwrap();
        let model = LogisticRegression::from_coefficients(coefficients, intercept);
        LoadedModel::Linear(LinearScaledModel::new(scaler, model).unwrap())
    }

    fn toy_linear() -> LoadedModel {
        linear([3.0, 2.0], [2.0, 1.0], array![0.5, -0.25], 0.1)
    }

    fn small_dataset() -> Dataset {
        Dataset::from_records(
            (0..20)
                .map(|i| DatasetRecord {
                    stress_workload_amount: i as f64 / 2.0,
                    stress_org_climate_grievance: (i % 4) as f64,
                    turnover_intention: if i >= 10 { "有" } else { "沒有" }.to_string(),
                })
                .collect(),
        )
    }

    fn linear_ctx(model: LoadedModel) -> ServingContext {
        ServingContext::from_parts(Some(model), None, Some(&small_dataset()), PathBuf::from("unused.csv"))
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(58.661_757, 2), 58.66);
        assert_eq!(round_to(0.666_666, 4), 0.6667);
    }

    #[test]
    fn test_linear_prediction_fixture() {
        let ctx = linear_ctx(toy_linear());
        let resp = ctx.logistic.predict(5.0, 3.0).unwrap();

        assert_eq!(resp.prediction_probability, 58.66);
        assert_eq!(resp.feature_values, [5.0, 3.0]);
        assert_eq!(resp.feature_names, vec!["工作量壓力".to_string(), "組織風氣-申訴管道壓力".to_string()]);
        assert!(resp.prediction_class.is_none());

        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("prediction_class").is_none());
    }

    #[test]
    fn test_unloaded_family() {
        let ctx = ServingContext::from_parts(None, None, None, PathBuf::from("unused.csv"));

        assert!(matches!(ctx.rf.predict(1.0, 1.0), Err(TurnoverError::ModelNotLoaded)));
        assert!(matches!(ctx.logistic.chart_data(), Err(TurnoverError::DataNotLoaded)));
        assert!(matches!(ctx.evaluate_new_data(), Err(TurnoverError::ModelNotLoaded)));
        assert!(!ctx.logistic.evaluation().is_available());
    }

    #[test]
    fn test_non_finite_input_is_client_error() {
        let ctx = linear_ctx(toy_linear());
        let err = ctx.logistic.predict(f64::NAN, 1.0).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_overflowing_input_is_rejected() {
        // both terms overflow to opposite infinities after scaling
        let ctx = linear_ctx(linear([0.0, 0.0], [0.5, 0.5], array![10.0, -10.0], 0.0));
        let err = ctx.logistic.predict(1e307, 1e307).unwrap_err();
        assert!(matches!(err, TurnoverError::Input(_)));

        let ok = ctx.logistic.predict(1.0, 1.0).unwrap();
        assert!((0.0..=100.0).contains(&ok.prediction_probability));
    }

    #[test]
    fn test_missing_dataset_unloads_family() {
        let ctx = ServingContext::from_parts(Some(toy_linear()), None, None, PathBuf::from("unused.csv"));

        assert!(!ctx.logistic.is_ready());
        assert!(matches!(ctx.logistic.predict(5.0, 3.0), Err(TurnoverError::ModelNotLoaded)));
        assert!(matches!(ctx.logistic.chart_data(), Err(TurnoverError::DataNotLoaded)));
        assert_eq!(ctx.logistic.evaluation(), &EvaluationSnapshot::unavailable(None));
    }

    #[test]
    fn test_missing_model_unloads_chart() {
        let data = small_dataset();
        let ctx = ServingContext::from_parts(Some(toy_linear()), None, Some(&data), PathBuf::from("unused.csv"));

        assert!(ctx.logistic.is_ready());
        assert!(ctx.logistic.chart_ready());
        assert!(!ctx.rf.chart_ready());
        assert!(matches!(ctx.rf.chart_data(), Err(TurnoverError::DataNotLoaded)));
        assert_eq!(ctx.rf.evaluation().total_samples, Reported::Text("N/A".to_string()));
    }

    #[test]
    fn test_load_from_empty_dir_never_panics() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ServingContext::load(&ArtifactPaths::in_dir(dir.path()));
        assert!(!ctx.logistic.is_ready());
        assert!(!ctx.rf.is_ready());
        assert!(!ctx.rf.chart_ready());
    }
}
