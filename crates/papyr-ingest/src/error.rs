//! Error types for the ingestion pipeline.

use papyr_db::DbError;
use papyr_process::ProcessError;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion, retrieval and export.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Could not decode file: {0}")]
    DecodeError(String),

    #[error("Text extraction failed: {0}")]
    ExtractionError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No extracted text to export for document {0}")]
    NoDataToExport(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedExportFormat(String),

    #[error("Tool not found: {tool}. Please install it.")]
    ToolNotFound { tool: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[source] DbError),

    #[error("Export error: {0}")]
    Export(String),
}

impl From<ProcessError> for IngestError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Io(e) => IngestError::Io(e),
            ProcessError::ToolNotFound { tool } => IngestError::ToolNotFound { tool },
            ProcessError::UnsupportedFormat(ext) => IngestError::UnsupportedFormat(ext),
            e @ ProcessError::DecodeError { .. } => IngestError::DecodeError(e.to_string()),
            ProcessError::OcrError(msg) => IngestError::ExtractionError(msg),
        }
    }
}

impl From<DbError> for IngestError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => IngestError::NotFound(msg),
            other => IngestError::Database(other),
        }
    }
}

impl From<papyr_core::Error> for IngestError {
    fn from(err: papyr_core::Error) -> Self {
        match err {
            papyr_core::Error::InvalidInput(msg) => IngestError::MissingInput(msg),
            e @ papyr_core::Error::TooLong { .. } => IngestError::InvalidField(e.to_string()),
        }
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Export(format!("csv: {}", err))
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Export(format!("json: {}", err))
    }
}

impl From<rust_xlsxwriter::XlsxError> for IngestError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        IngestError::Export(format!("xlsx: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_errors_map_onto_taxonomy() {
        let err: IngestError = ProcessError::UnsupportedFormat("txt".to_string()).into();
        assert!(matches!(err, IngestError::UnsupportedFormat(ref e) if e == "txt"));

        let err: IngestError = ProcessError::OcrError("page 1: boom".to_string()).into();
        assert!(matches!(err, IngestError::ExtractionError(_)));

        let err: IngestError = ProcessError::DecodeError {
            filename: "a.png".to_string(),
            message: "truncated".to_string(),
        }
        .into();
        match err {
            IngestError::DecodeError(msg) => assert!(msg.contains("a.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_db_not_found_is_not_found() {
        let err: IngestError = DbError::NotFound("doc".to_string()).into();
        assert!(matches!(err, IngestError::NotFound(_)));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: IngestError = DbError::Io(io).into();
        assert!(matches!(err, IngestError::Database(_)));
    }
}
