//! Model training module
//!
//! Provides the two classifier families served by the API:
//! - Logistic regression (fitted on standardized features)
//! - Random Forest over decision trees (fitted on raw features)
//!
//! plus the stratified split and the metrics used to evaluate them.

pub mod linear_models;
pub mod decision_tree;
pub mod random_forest;
pub mod split;
pub mod metrics;

pub use linear_models::LogisticRegression;
pub use decision_tree::{DecisionTree, TreeNode};
pub use random_forest::RandomForest;
pub use split::{StratifiedSplit, TrainTestSplit};
pub use metrics::{ClassificationMetrics, ConfusionMatrix};
