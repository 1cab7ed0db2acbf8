//! Error types for the upload service.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type alias for wf-server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors raised while handling uploads and downloads.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ServerError {
    /// The multipart body had no part under the expected field.
    #[error("No file uploaded.")]
    MissingFile,

    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::MissingFile | ServerError::InvalidFileName(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Multipart(err) => err.status(),
            ServerError::Io(_) | ServerError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("upload processing failed: {self}");
            let body = serde_json::json!({ "error": self.to_string() });
            return (status, Json(body)).into_response();
        }
        log::warn!("rejected request: {self}");
        (status, self.to_string()).into_response()
    }
}
