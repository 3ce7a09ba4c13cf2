// Relay failure taxonomy and its HTTP rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::client::ClientError;

#[derive(Debug, Error)]
pub enum RelayError {
    /// Caller omitted `language` or `code`
    #[error("language and code are required")]
    MissingFields,

    /// Backend answered with a non-success status
    #[error("Execution service error (status {status})")]
    Backend { status: u16, details: Value },

    /// Transport failure, malformed backend JSON, anything unexpected
    #[error("Internal execution error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingFields => StatusCode::BAD_REQUEST,
            RelayError::Backend { .. } => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for metrics and logs
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MissingFields => "invalid_request",
            RelayError::Backend { .. } => "backend_error",
            RelayError::Internal(_) => "internal_error",
        }
    }
}

impl From<ClientError> for RelayError {
    fn from(err: ClientError) -> Self {
        RelayError::Internal(err.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            RelayError::MissingFields => json!({
                "success": false,
                "message": "language and code are required"
            }),
            RelayError::Backend { details, .. } => json!({
                "success": false,
                "message": "Execution service error",
                "details": details
            }),
            RelayError::Internal(error) => json!({
                "success": false,
                "message": "Internal execution error",
                "error": error
            }),
        };
        (status, Json(body)).into_response()
    }
}
