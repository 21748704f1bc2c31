//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::TurnoverError;

pub const MODEL_NOT_LOADED: &str = "模型未載入";
pub const DATA_NOT_LOADED: &str = "圖表資料未載入";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    /// A model or dataset failed to load at startup
    #[error("{0}")]
    NotLoaded(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Internal(String),
}

impl From<TurnoverError> for ServerError {
    fn from(err: TurnoverError) -> Self {
        match err {
            TurnoverError::ModelNotLoaded => ServerError::NotLoaded(MODEL_NOT_LOADED),
            TurnoverError::DataNotLoaded => ServerError::NotLoaded(DATA_NOT_LOADED),
            e if e.is_client_error() => ServerError::BadRequest(e.to_string()),
            e => ServerError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotLoaded(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
