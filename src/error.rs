//! Error types for the turnover prediction service

use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, TurnoverError>;

/// Main error type
///
/// Load failures, client input failures and compute failures are separate
/// variants so callers (and the HTTP layer) can map them to the right class
/// of response.
#[derive(Error, Debug)]
pub enum TurnoverError {
    /// An artifact or dataset could not be read or decoded at startup.
    #[error("Failed to load {artifact}: {reason}")]
    Load { artifact: String, reason: String },

    /// The caller supplied a value that cannot be used.
    #[error("Invalid input: {0}")]
    Input(String),

    /// A dataset lacks columns the model needs.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A metric or prediction could not be computed.
    #[error("Computation error: {0}")]
    Compute(String),

    /// Dataset content is malformed (bad labels, wrong types, empty).
    #[error("Data error: {0}")]
    Data(String),

    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Chart data not loaded")]
    DataNotLoaded,

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TurnoverError {
    pub fn load(artifact: impl Into<String>, reason: impl ToString) -> Self {
        TurnoverError::Load {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors caused by what the client sent rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TurnoverError::Input(_) | TurnoverError::MissingColumns(_))
    }
}

impl From<polars::error::PolarsError> for TurnoverError {
    fn from(err: polars::error::PolarsError) -> Self {
        TurnoverError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for TurnoverError {
    fn from(err: serde_json::Error) -> Self {
        TurnoverError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for TurnoverError {
    fn from(err: ndarray::ShapeError) -> Self {
        TurnoverError::Shape {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
