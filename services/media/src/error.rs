use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors that can occur while serving media requests
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Failed to read uploaded file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("Missing multipart field: {0}")]
    MissingFile(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to read object {key}: {message}")]
    ObjectRead { key: String, message: String },

    #[error("Label detection error: {0}")]
    Detection(String),
}

impl MediaError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            MediaError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            MediaError::InvalidFileName(_) => (StatusCode::BAD_REQUEST, "INVALID_FILE_NAME"),
            MediaError::MissingFile(_) => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            MediaError::Storage(_) | MediaError::ObjectRead { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            MediaError::Detection(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DETECTION_ERROR"),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Server-side detail stays in the logs
        let message = if status.is_server_error() {
            error!(error = %self, code, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}
