//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use papyr_ingest::IngestError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Ingest(err) => match err {
                IngestError::MissingInput(_) => (StatusCode::BAD_REQUEST, "MISSING_INPUT"),
                IngestError::InvalidField(_) => (StatusCode::BAD_REQUEST, "INVALID_FIELD"),
                IngestError::UnsupportedFormat(_) => {
                    (StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT")
                }
                IngestError::DecodeError(_) => (StatusCode::BAD_REQUEST, "DECODE_ERROR"),
                IngestError::ExtractionError(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_ERROR")
                }
                IngestError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                IngestError::NoDataToExport(_) => (StatusCode::NOT_FOUND, "NO_DATA_TO_EXPORT"),
                IngestError::UnsupportedExportFormat(_) => {
                    (StatusCode::BAD_REQUEST, "UNSUPPORTED_EXPORT_FORMAT")
                }
                IngestError::ToolNotFound { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "TOOL_NOT_FOUND")
                }
                IngestError::Io(_) | IngestError::Database(_) | IngestError::Export(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::InternalError(format!("worker task failed: {}", err))
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
