//! Papyr Process - Turning uploaded documents into text.
//!
//! This crate provides:
//! - Format decoding for raster images, HEIC photos and PDFs
//! - OCR over decoded pages (via Tesseract CLI)
//!
//! HEIC and PDF decoding rely on `heif-convert` and `pdftoppm` being installed.

mod decoder;
mod error;
mod ocr;

pub use decoder::{DecodedDocument, Decoder};
pub use error::{ProcessError, ProcessResult};
pub use image::DynamicImage;
pub use ocr::{extract_text, OcrEngine, TesseractEngine};

/// Check if required external tools are available.
pub fn check_dependencies() -> Vec<(&'static str, bool)> {
    vec![
        ("tesseract", which::which("tesseract").is_ok()),
        ("pdftoppm", which::which("pdftoppm").is_ok()),
        ("heif-convert", which::which("heif-convert").is_ok()),
    ]
}

/// Check if all required tools are installed.
pub fn all_tools_available() -> bool {
    check_dependencies().iter().all(|(_, available)| *available)
}

pub(crate) fn require_tool(tool: &str) -> ProcessResult<()> {
    if which::which(tool).is_err() {
        return Err(ProcessError::ToolNotFound {
            tool: tool.to_string(),
        });
    }
    Ok(())
}
