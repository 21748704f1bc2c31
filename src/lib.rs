//! Turnover Insight - employee turnover-intention prediction service
//!
//! Serves two pre-fitted classifiers over a fixed two-feature dataset:
//! a logistic regression on standardized features and a random forest on
//! raw features, together with chart data and evaluation metrics.
//!
//! # Modules
//!
//! ## Core
//! - [`data`] - Feature schema, label encoding, CSV loading
//! - [`preprocessing`] - Feature scaling
//! - [`training`] - Logistic regression, random forest, stratified split, metrics
//! - [`inference`] - The `Classifier` capability and its two model families
//!
//! ## Serving
//! - [`artifacts`] - JSON artifact storage
//! - [`serving`] - Load-once serving context (predict, chart, info, evaluation)
//!
//! ## Services
//! - [`server`] - HTTP server
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod data;
pub mod preprocessing;
pub mod training;
pub mod inference;

// Serving
pub mod artifacts;
pub mod serving;

// Services
pub mod server;
pub mod cli;

pub use error::{Result, TurnoverError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, TurnoverError};

    // Data
    pub use crate::data::{Dataset, DatasetLoader, DatasetRecord, FeatureSchema};

    // Preprocessing
    pub use crate::preprocessing::{Scaler, ScalerParams, ScalerType};

    // Training
    pub use crate::training::{ClassificationMetrics, LogisticRegression, RandomForest, StratifiedSplit};

    // Inference
    pub use crate::inference::{Classifier, LinearScaledModel, ModelFamily, TreeEnsembleModel};

    // Serving
    pub use crate::artifacts::ArtifactPaths;
    pub use crate::serving::{LoadedModel, ServingContext};
    pub use crate::server::{create_router, AppState, ServerConfig};
}
