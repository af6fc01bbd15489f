//! Error types for decoding and OCR.

use thiserror::Error;

/// Result type for processing operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Errors that can occur while turning uploaded bytes into text.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tool not found: {tool}. Please install it.")]
    ToolNotFound { tool: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Could not decode {filename}: {message}")]
    DecodeError { filename: String, message: String },

    #[error("OCR error: {0}")]
    OcrError(String),
}

impl ProcessError {
    pub(crate) fn decode(filename: &str, message: impl Into<String>) -> Self {
        ProcessError::DecodeError {
            filename: filename.to_string(),
            message: message.into(),
        }
    }
}
