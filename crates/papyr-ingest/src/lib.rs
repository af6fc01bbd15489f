//! Papyr Ingest - Document ingestion and tabular export.
//!
//! This crate provides:
//! - The ingestion service (decode, OCR, persist) with owner-scoped access
//! - A blob store for original uploads
//! - Table inference from extracted text
//! - Export to CSV, JSON and spreadsheet formats

mod error;
mod export;
mod ingestor;
mod storage;
mod table;

pub use error::{IngestError, IngestResult};
pub use export::{ExportArtifact, Exporter};
pub use ingestor::{Download, Ingestor, UploadRequest};
pub use storage::BlobStore;
pub use table::infer_table;
