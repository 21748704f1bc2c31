//! Feature schema and label encoding for the turnover dataset

use crate::error::{Result, TurnoverError};
use ndarray::{Array1, Array2};

/// Workload-stress score column.
pub const FEATURE_WORKLOAD: &str = "stress_workload_amount";
/// Organizational-climate (grievance channel) stress score column.
pub const FEATURE_ORG_CLIMATE: &str = "stress_org_climate_grievance";
/// Categorical turnover-intention label column.
pub const TARGET_COLUMN: &str = "turnover_intention";

/// Label value meaning "has turnover intention" (positive class).
pub const LABEL_POSITIVE: &str = "有";
/// Label value meaning "no turnover intention".
pub const LABEL_NEGATIVE: &str = "沒有";

/// Ordered feature schema the models were trained on.
///
/// Order matters: both models read features positionally, and the forest
/// additionally checks the names recorded at fit time.
pub struct FeatureSchema;

impl FeatureSchema {
    pub const NAMES: [&'static str; 2] = [FEATURE_WORKLOAD, FEATURE_ORG_CLIMATE];

    /// Human-readable names shown next to a prediction.
    pub const DISPLAY_NAMES: [&'static str; 2] = ["工作量壓力", "組織風氣-申訴管道壓力"];

    /// The three columns read from a dataset file.
    pub const DATASET_COLUMNS: [&'static str; 3] = [FEATURE_WORKLOAD, FEATURE_ORG_CLIMATE, TARGET_COLUMN];

    pub fn n_features() -> usize {
        Self::NAMES.len()
    }

    pub fn names() -> Vec<String> {
        Self::NAMES.iter().map(|s| s.to_string()).collect()
    }

    /// Build a single-row feature matrix in schema order.
    pub fn row(f1: f64, f2: f64) -> Array2<f64> {
        ndarray::arr2(&[[f1, f2]])
    }

    /// Check that `names` is exactly the schema, in order.
    pub fn validate_names(names: &[String]) -> Result<()> {
        let matches = names.len() == Self::NAMES.len()
            && names.iter().zip(Self::NAMES.iter()).all(|(a, b)| a == b);
        if matches {
            Ok(())
        } else {
            Err(TurnoverError::Shape {
                expected: format!("features {:?}", Self::NAMES),
                actual: format!("features {:?}", names),
            })
        }
    }
}

/// Map a categorical label to 1 (有) / 0 (沒有). Unknown labels map to `None`.
pub fn label_to_numeric(label: &str) -> Option<u8> {
    match label.trim() {
        LABEL_POSITIVE => Some(1),
        LABEL_NEGATIVE => Some(0),
        _ => None,
    }
}

/// Encode a label column as a 0/1 target vector, rejecting unknown labels.
pub fn encode_labels<S: AsRef<str>>(labels: &[S]) -> Result<Array1<f64>> {
    labels
        .iter()
        .enumerate()
        .map(|(row, label)| {
            label_to_numeric(label.as_ref())
                .map(f64::from)
                .ok_or_else(|| {
                    TurnoverError::Data(format!(
                        "unrecognized {} value {:?} at row {}",
                        TARGET_COLUMN,
                        label.as_ref(),
                        row
                    ))
                })
        })
        .collect()
}
