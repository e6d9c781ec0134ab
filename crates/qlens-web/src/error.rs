//! Error types for the web API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use qlens_sim::{QlensError, SimError};

/// API error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Simulation(String),

    /// Qubit index or step number outside the analysed circuit.
    #[error("{0}")]
    InvalidIndex(String),

    #[error("No analysed circuit for this session. Submit a circuit first.")]
    NoSession,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status code and machine-readable kind.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Parse(_) => (StatusCode::BAD_REQUEST, "parse_error"),
            ApiError::Simulation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "simulation_error"),
            ApiError::InvalidIndex(_) => (StatusCode::NOT_FOUND, "invalid_index"),
            ApiError::NoSession => (StatusCode::NOT_FOUND, "no_session"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<SimError> for ApiError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::InvalidQubitIndex { .. } | SimError::InvalidStep { .. } => {
                ApiError::InvalidIndex(e.to_string())
            }
            other => ApiError::Simulation(other.to_string()),
        }
    }
}

impl From<QlensError> for ApiError {
    fn from(e: QlensError) -> Self {
        match e {
            QlensError::Parse(inner) => ApiError::Parse(inner.to_string()),
            QlensError::Simulation(inner) => inner.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
