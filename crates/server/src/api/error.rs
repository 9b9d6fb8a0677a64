//! API error type.
//!
//! Handlers return `Result<T, ApiError>`; every error becomes a JSON body
//! of the form `{"error": "..."}`. Tool stderr never reaches the client
//! unless the server runs with `expose_tool_stderr`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formatshift_core::BatchError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// All errors a request can end with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client sent something that can never be converted.
    #[error("{0}")]
    BadRequest(String),

    /// An uploaded file exceeded the per-file size bound.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Conversion or delivery failed while running.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Maps a batch failure to a response, appending tool stderr to 500
    /// bodies only when `expose_stderr` is set.
    pub fn from_batch(err: &BatchError, expose_stderr: bool) -> Self {
        if err.is_client_error() {
            return Self::BadRequest(err.to_string());
        }
        let mut message = err.to_string();
        if expose_stderr {
            if let Some(stderr) = err.stderr_excerpt() {
                message.push('\n');
                message.push_str(stderr);
            }
        }
        Self::Internal(message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
