//! Artifact storage
//!
//! Every fitted object lives in the models directory as a JSON envelope
//! (see [`envelope`]). The two datasets sit next to them as CSV files.

pub mod envelope;

pub use envelope::{load_artifact, save_artifact, Artifact, ArtifactEnvelope, FORMAT_VERSION};

use crate::data::{Dataset, DatasetLoader};
use crate::error::{Result, TurnoverError};
use crate::inference::{LinearScaledModel, TreeEnsembleModel};
use crate::preprocessing::Scaler;
use crate::training::{LogisticRegression, RandomForest};
use envelope::artifact_label;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LOGISTIC_MODEL_FILE: &str = "logistic_model.json";
pub const LOGISTIC_SCALER_FILE: &str = "logistic_scaler.json";
pub const RF_MODEL_FILE: &str = "rf_model.json";
pub const RF_FEATURES_FILE: &str = "rf_features.json";
pub const DATASET_FILE: &str = "turnover_data.csv";
pub const NEW_DATA_FILE: &str = "turnover_new_data.csv";

/// Locations of every artifact the service reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub logistic_model: PathBuf,
    pub logistic_scaler: PathBuf,
    pub rf_model: PathBuf,
    pub rf_features: PathBuf,
    pub dataset: PathBuf,
    pub new_data: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names under one models directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            logistic_model: dir.join(LOGISTIC_MODEL_FILE),
            logistic_scaler: dir.join(LOGISTIC_SCALER_FILE),
            rf_model: dir.join(RF_MODEL_FILE),
            rf_features: dir.join(RF_FEATURES_FILE),
            dataset: dir.join(DATASET_FILE),
            new_data: dir.join(NEW_DATA_FILE),
        }
    }

    pub fn with_new_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.new_data = path.into();
        self
    }
}

/// Load scaler + logistic regression and pair them.
pub fn load_linear_model(paths: &ArtifactPaths) -> Result<LinearScaledModel> {
    let model: LogisticRegression = load_artifact(&paths.logistic_model)?;
    let scaler: Scaler = load_artifact(&paths.logistic_scaler)?;
    debug!(model = %paths.logistic_model.display(), scaler = %paths.logistic_scaler.display(), "Linear artifacts read");

    LinearScaledModel::new(scaler, model)
        .map_err(|e| TurnoverError::load(artifact_label(&paths.logistic_model), e))
}

/// Load the forest and its feature list and pair them.
pub fn load_ensemble_model(paths: &ArtifactPaths) -> Result<TreeEnsembleModel> {
    let forest: RandomForest = load_artifact(&paths.rf_model)?;
    let features: Vec<String> = load_artifact(&paths.rf_features)?;
    debug!(model = %paths.rf_model.display(), features = %paths.rf_features.display(), "Ensemble artifacts read");

    if features.is_empty() {
        return Err(TurnoverError::load(artifact_label(&paths.rf_features), "feature list is empty"));
    }

    TreeEnsembleModel::new(forest, features)
        .map_err(|e| TurnoverError::load(artifact_label(&paths.rf_features), e))
}

/// Load a dataset CSV, reporting failures as load errors.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    DatasetLoader::new()
        .load(path)
        .map_err(|e| TurnoverError::load(artifact_label(path), e))
}

/// Write the linear family's two artifacts.
pub fn save_linear_model(paths: &ArtifactPaths, model: &LinearScaledModel) -> Result<()> {
    save_artifact(&paths.logistic_model, model.estimator())?;
    save_artifact(&paths.logistic_scaler, model.scaler())
}

/// Write the ensemble family's two artifacts.
pub fn save_ensemble_model(paths: &ArtifactPaths, forest: &RandomForest, feature_names: &[String]) -> Result<()> {
    save_artifact(&paths.rf_model, forest)?;
    save_artifact(&paths.rf_features, &feature_names.to_vec())
}
