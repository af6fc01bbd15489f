//! Main ingestion logic.

use crate::error::{IngestError, IngestResult};
use crate::export::{ExportArtifact, Exporter};
use crate::storage::BlobStore;
use crate::table::infer_table;
use papyr_config::{AppPaths, Config};
use papyr_core::{
    validate_tags, ChatId, Document, DocumentUpdate, ExportFormat, MessageId, UserId,
};
use papyr_db::Database;
use papyr_process::{extract_text, Decoder, OcrEngine, TesseractEngine};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One multipart upload, as received.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub owner: UserId,
    pub filename: String,
    /// `None` when the request carried no file at all.
    pub bytes: Option<Vec<u8>>,
    pub chat_id: Option<ChatId>,
    pub message_id: Option<MessageId>,
    pub tags: Option<String>,
}

impl UploadRequest {
    pub fn new(owner: impl Into<UserId>, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            owner: owner.into(),
            filename: filename.into(),
            bytes: Some(bytes),
            ..Default::default()
        }
    }

    pub fn with_chat(mut self, chat_id: Option<ChatId>) -> Self {
        self.chat_id = chat_id;
        self
    }

    pub fn with_message(mut self, message_id: Option<MessageId>) -> Self {
        self.message_id = message_id;
        self
    }

    pub fn with_tags(mut self, tags: Option<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Original upload bytes, returned by [`Ingestor::download`].
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Owner-scoped document service: ingest, read, update, delete, export.
///
/// All methods block; callers on an async runtime should move them onto a
/// blocking thread.
pub struct Ingestor {
    db: Database,
    blobs: BlobStore,
    decoder: Decoder,
    ocr: Arc<dyn OcrEngine>,
    exporter: Exporter,
}

impl Ingestor {
    /// Create an ingestor from its parts.
    pub fn new(
        db: Database,
        blobs: BlobStore,
        decoder: Decoder,
        ocr: Arc<dyn OcrEngine>,
        exporter: Exporter,
    ) -> Self {
        Self {
            db,
            blobs,
            decoder,
            ocr,
            exporter,
        }
    }

    /// Create an ingestor with Tesseract OCR, configured from `config`.
    pub fn from_config(db: Database, config: &Config, paths: &AppPaths) -> Self {
        let scratch = config.processing.scratch_dir_or(&paths.scratch_dir);

        let ocr = TesseractEngine::new(&scratch)
            .with_language(&config.ocr.language)
            .with_oem(config.ocr.oem)
            .with_page_seg_mode(config.ocr.psm);

        Self::new(
            db,
            BlobStore::new(&paths.data_dir),
            Decoder::new(&scratch).with_pdf_dpi(config.ocr.pdf_dpi),
            Arc::new(ocr),
            Exporter::new(&scratch),
        )
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Decode, OCR, store and record one upload.
    ///
    /// Either the record and its blob both exist afterwards, or neither does.
    pub fn ingest(&self, request: UploadRequest) -> IngestResult<Document> {
        let UploadRequest {
            owner,
            filename,
            bytes,
            chat_id,
            message_id,
            tags,
        } = request;

        let bytes = bytes
            .filter(|b| !b.is_empty())
            .ok_or_else(|| IngestError::MissingInput("no file uploaded".to_string()))?;
        if filename.trim().is_empty() {
            return Err(IngestError::MissingInput("uploaded file has no name".to_string()));
        }
        if owner.trim().is_empty() {
            return Err(IngestError::MissingInput("no user identity".to_string()));
        }
        if let Some(tags) = &tags {
            validate_tags(tags)?;
        }

        info!("Ingesting upload: {} ({} bytes)", filename, bytes.len());

        let decoded = self.decoder.decode(&bytes, &filename)?;
        let text = extract_text(self.ocr.as_ref(), &decoded.pages)?;

        debug!(
            filename = %filename,
            pages = decoded.page_count(),
            chars = text.len(),
            "Extracted text"
        );

        let key = self.blobs.put(&filename, &bytes)?;

        let doc = match Document::new(owner, filename, key.as_str()) {
            Ok(doc) => doc
                .with_extracted_text(text)
                .with_chat(chat_id)
                .with_message(message_id)
                .with_tags(tags.unwrap_or_default()),
            Err(e) => {
                self.blobs.remove(&key);
                return Err(e.into());
            }
        };

        if let Err(e) = self.db.create_document(&doc) {
            self.blobs.remove(&key);
            return Err(e.into());
        }

        info!("Ingested {} as {} ({} pages)", doc.filename, doc.id, decoded.page_count());
        Ok(doc)
    }

    /// Get a record the caller owns.
    pub fn get(&self, id: &str, owner: &str) -> IngestResult<Document> {
        Ok(self.db.get_document(id, owner)?)
    }

    /// Change tags and/or structured data on a record the caller owns.
    pub fn update(&self, id: &str, owner: &str, update: &DocumentUpdate) -> IngestResult<Document> {
        if update.is_empty() {
            return self.get(id, owner);
        }
        update.validate()?;
        Ok(self.db.update_document(id, owner, update)?)
    }

    /// The caller's oldest record attached to `message_id`.
    pub fn find_by_message(&self, message_id: &str, owner: &str) -> IngestResult<Document> {
        self.db
            .find_document_by_message(message_id, owner)?
            .ok_or_else(|| {
                IngestError::NotFound(format!("No document for message: {}", message_id))
            })
    }

    /// The caller's records, newest first.
    pub fn list(&self, owner: &str, limit: Option<i64>) -> IngestResult<Vec<Document>> {
        Ok(self.db.list_documents(owner, limit)?)
    }

    /// Original bytes of a record the caller owns.
    pub fn download(&self, id: &str, owner: &str) -> IngestResult<Download> {
        let doc = self.get(id, owner)?;
        let bytes = self.blobs.get(&doc.file_path)?;
        Ok(Download {
            filename: doc.filename,
            bytes,
        })
    }

    /// Delete a record the caller owns, then its blob.
    pub fn delete(&self, id: &str, owner: &str) -> IngestResult<Document> {
        let doc = self.db.delete_document(id, owner)?;
        self.blobs.remove(&doc.file_path);
        info!("Deleted document {} ({})", doc.id, doc.filename);
        Ok(doc)
    }

    /// Infer a table from a record's text and serialize it as `format_token`.
    pub fn export(&self, id: &str, owner: &str, format_token: &str) -> IngestResult<ExportArtifact> {
        let doc = self.get(id, owner)?;

        // Checked before the format so an empty record reports the same error for any token
        if !doc.has_text() {
            return Err(IngestError::NoDataToExport(doc.id));
        }
        let text = doc.extracted_text.as_deref().unwrap_or_default();

        let format = ExportFormat::from_str(format_token)
            .ok_or_else(|| IngestError::UnsupportedExportFormat(format_token.to_string()))?;

        let table = infer_table(text);
        if table.is_empty() {
            warn!("Document {} has only blank text; exporting an empty table", doc.id);
        }

        let artifact = self.exporter.export(&table, format, &doc.filename)?;
        info!(
            "Exported {} as {} ({} rows, {} bytes)",
            doc.id,
            format,
            table.row_count(),
            artifact.bytes.len()
        );
        Ok(artifact)
    }
}
