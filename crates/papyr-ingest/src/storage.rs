//! Blob store for original uploads.
//!
//! Blobs live under `<root>/ocr_uploads/`. The key recorded on a document is the
//! path relative to the root, e.g. `ocr_uploads/<uuid>_receipt.png`.

use crate::error::{IngestError, IngestResult};
use papyr_core::new_id;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

const UPLOAD_PREFIX: &str = "ocr_uploads";

/// Filesystem-backed store for uploaded bytes.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at the data directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the blobs.
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(UPLOAD_PREFIX)
    }

    /// Store `bytes` under a fresh key derived from `filename`.
    ///
    /// The blob is written to a temporary file first and renamed into place,
    /// so a failed write never leaves a partial blob behind.
    pub fn put(&self, filename: &str, bytes: &[u8]) -> IngestResult<String> {
        let dir = self.uploads_dir();
        std::fs::create_dir_all(&dir)?;

        let key = format!("{}/{}_{}", UPLOAD_PREFIX, new_id(), sanitize_filename(filename));
        let target = self.resolve(&key)?;

        let mut staged = tempfile::Builder::new()
            .prefix(".incoming-")
            .tempfile_in(&dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;
        staged.persist(&target).map_err(|e| IngestError::Io(e.error))?;

        debug!(key = %key, bytes = bytes.len(), "Stored blob");
        Ok(key)
    }

    /// Read the bytes stored under `key`.
    pub fn get(&self, key: &str) -> IngestResult<Vec<u8>> {
        let path = self.resolve(key)?;
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IngestError::NotFound(format!("Blob not found: {}", key)),
            _ => IngestError::Io(e),
        })
    }

    /// Remove the blob under `key`. Failures are logged, never raised.
    pub fn remove(&self, key: &str) {
        let path = match self.resolve(key) {
            Ok(path) => path,
            Err(e) => {
                warn!("Refusing to remove blob {}: {}", key, e);
                return;
            }
        };
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(key, "Removed blob"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove blob {}: {}", path.display(), e),
        }
    }

    /// Map a key to its path, rejecting anything that escapes the root.
    fn resolve(&self, key: &str) -> IngestResult<PathBuf> {
        let relative = Path::new(key);
        let well_formed = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !well_formed {
            return Err(IngestError::NotFound(format!("Invalid blob key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

/// Keep a filename usable as a single path segment.
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}
