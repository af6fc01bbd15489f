//! OCR over decoded pages.

use crate::error::{ProcessError, ProcessResult};
use crate::require_tool;
use image::{DynamicImage, ImageFormat};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// A text recognizer for a single raster image.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text on one page.
    fn recognize(&self, image: &DynamicImage) -> ProcessResult<String>;

    /// Short engine name for logs.
    fn name(&self) -> &str {
        "ocr"
    }
}

/// Run `engine` over `pages` and join the page texts with `\n`, in page order.
///
/// The first failing page aborts the whole extraction.
pub fn extract_text(engine: &dyn OcrEngine, pages: &[DynamicImage]) -> ProcessResult<String> {
    let mut texts = Vec::with_capacity(pages.len());

    for (idx, page) in pages.iter().enumerate() {
        debug!(engine = engine.name(), page = idx + 1, "Recognizing page");
        let text = engine.recognize(page).map_err(|e| match e {
            ProcessError::OcrError(msg) => {
                ProcessError::OcrError(format!("page {}: {}", idx + 1, msg))
            }
            other => other,
        })?;
        texts.push(text);
    }

    Ok(texts.join("\n"))
}

/// OCR engine backed by the `tesseract` CLI.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    scratch_dir: PathBuf,
    language: String,
    oem: u8,
    psm: u8,
}

impl TesseractEngine {
    /// Create an engine writing page images under `scratch_dir`.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            language: "eng".to_string(),
            oem: 3, // LSTM + legacy engine
            psm: 3, // Fully automatic page segmentation
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_oem(mut self, oem: u8) -> Self {
        self.oem = oem;
        self
    }

    pub fn with_page_seg_mode(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> ProcessResult<String> {
        require_tool("tesseract")?;

        std::fs::create_dir_all(&self.scratch_dir)?;
        let page = tempfile::Builder::new()
            .prefix("papyr-ocr-")
            .suffix(".png")
            .tempfile_in(&self.scratch_dir)?;

        image
            .save_with_format(page.path(), ImageFormat::Png)
            .map_err(|e| ProcessError::OcrError(format!("failed to write page image: {}", e)))?;

        debug!("Running OCR on {:?}", page.path());

        let output = Command::new("tesseract")
            .arg(page.path())
            .arg("stdout") // Output to stdout instead of file
            .args(["-l", &self.language])
            .args(["--oem", &self.oem.to_string()])
            .args(["--psm", &self.psm.to_string()])
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // Tesseract sometimes outputs warnings to stderr but still works
            if !output.stdout.is_empty() {
                debug!("Tesseract warning: {}", stderr);
            } else {
                return Err(ProcessError::OcrError(stderr.trim().to_string()));
            }
        }

        // Tesseract ends every page with a form feed
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
