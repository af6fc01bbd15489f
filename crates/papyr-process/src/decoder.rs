//! Format decoding: uploaded bytes to raster pages ready for OCR.
//!
//! The bytes are staged in a uniquely named file under the scratch directory
//! for the duration of the call. Staged files and rendered pages are held by
//! `tempfile` guards, so they are removed on every return path.

use crate::error::{ProcessError, ProcessResult};
use crate::require_tool;
use image::{DynamicImage, ImageReader};
use papyr_core::{file_extension, DocumentKind};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};
use tracing::debug;

/// Decoded pages of one upload, in page order.
#[derive(Debug, Clone)]
pub struct DecodedDocument {
    pub kind: DocumentKind,
    pub pages: Vec<DynamicImage>,
}

impl DecodedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Dispatches uploads to the decode path for their kind.
#[derive(Debug, Clone)]
pub struct Decoder {
    scratch_dir: PathBuf,
    pdf_dpi: u32,
}

impl Decoder {
    /// Create a decoder staging its temporary files under `scratch_dir`.
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            pdf_dpi: 300,
        }
    }

    /// Set the resolution used to render PDF pages.
    pub fn with_pdf_dpi(mut self, dpi: u32) -> Self {
        self.pdf_dpi = dpi;
        self
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Decode `bytes` according to the extension of `filename`.
    pub fn decode(&self, bytes: &[u8], filename: &str) -> ProcessResult<DecodedDocument> {
        let kind = DocumentKind::from_filename(filename).ok_or_else(|| {
            ProcessError::UnsupportedFormat(
                file_extension(filename).unwrap_or_else(|| filename.to_string()),
            )
        })?;
        let ext = file_extension(filename).unwrap_or_default();

        std::fs::create_dir_all(&self.scratch_dir)?;
        let staged = self.stage(bytes, &ext)?;

        debug!(filename, kind = %kind, bytes = bytes.len(), "Decoding upload");

        let pages = match kind {
            DocumentKind::Raster => vec![decode_raster(staged.path(), filename)?],
            DocumentKind::CameraPhoto => vec![self.decode_camera_photo(bytes, staged.path(), filename)?],
            DocumentKind::Paged => self.decode_paged(bytes, staged.path(), filename)?,
        };

        debug!(filename, pages = pages.len(), "Decoded upload");

        Ok(DecodedDocument { kind, pages })
    }

    fn stage(&self, bytes: &[u8], ext: &str) -> ProcessResult<NamedTempFile> {
        let suffix = format!(".{}", ext);
        let mut staged = tempfile::Builder::new()
            .prefix("papyr-upload-")
            .suffix(&suffix)
            .tempfile_in(&self.scratch_dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;
        Ok(staged)
    }

    fn page_dir(&self) -> ProcessResult<TempDir> {
        Ok(tempfile::Builder::new()
            .prefix("papyr-pages-")
            .tempdir_in(&self.scratch_dir)?)
    }

    /// HEIC/HEIF photo, converted to PNG by `heif-convert` (libheif).
    fn decode_camera_photo(
        &self,
        bytes: &[u8],
        staged: &Path,
        filename: &str,
    ) -> ProcessResult<DynamicImage> {
        if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
            return Err(ProcessError::decode(filename, "not an HEIF container (missing ftyp box)"));
        }
        require_tool("heif-convert")?;

        let out_dir = self.page_dir()?;
        let target = out_dir.path().join("photo.png");

        debug!("Running heif-convert on {:?}", staged);

        let output = Command::new("heif-convert")
            .arg(staged)
            .arg(&target)
            .output()?;

        if !output.status.success() {
            return Err(ProcessError::decode(
                filename,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let primary = primary_image(out_dir.path(), &target)?
            .ok_or_else(|| ProcessError::decode(filename, "converter produced no image"))?;

        decode_raster(&primary, filename)
    }

    /// PDF, one PNG per page rendered by `pdftoppm` (poppler).
    fn decode_paged(
        &self,
        bytes: &[u8],
        staged: &Path,
        filename: &str,
    ) -> ProcessResult<Vec<DynamicImage>> {
        if !bytes.starts_with(b"%PDF") {
            return Err(ProcessError::decode(filename, "not a PDF (missing %PDF header)"));
        }
        require_tool("pdftoppm")?;

        let out_dir = self.page_dir()?;
        let prefix = out_dir.path().join("page");

        debug!("Running pdftoppm on {:?} at {} dpi", staged, self.pdf_dpi);

        let output = Command::new("pdftoppm")
            .arg("-png")
            .args(["-r", &self.pdf_dpi.to_string()])
            .arg(staged)
            .arg(&prefix)
            .output()?;

        if !output.status.success() {
            return Err(ProcessError::decode(
                filename,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        decode_rendered(out_dir.path(), filename)
    }
}

/// Decode every numbered page image in `dir`, in page order.
fn decode_rendered(dir: &Path, filename: &str) -> ProcessResult<Vec<DynamicImage>> {
    let page_paths = rendered_pages(dir)?;
    if page_paths.is_empty() {
        return Err(ProcessError::decode(filename, "no pages rendered"));
    }

    page_paths
        .iter()
        .map(|path| decode_raster(path, filename))
        .collect()
}

fn decode_raster(path: &Path, filename: &str) -> ProcessResult<DynamicImage> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| ProcessError::decode(filename, e.to_string()))
}

/// The primary image `heif-convert` wrote for a conversion to `target`.
///
/// Single-image containers land on `target` itself. Multi-image containers come
/// out as `photo-1.png`, `photo-2.png`, ..., where the first is the primary.
/// Depth maps and other auxiliary images (`photo-depth.png`,
/// `photo-urn:...hdrgainmap.png`) are never chosen.
fn primary_image(dir: &Path, target: &Path) -> ProcessResult<Option<PathBuf>> {
    if target.is_file() {
        return Ok(Some(target.to_path_buf()));
    }
    Ok(rendered_pages(dir)?.into_iter().next())
}

/// Numbered PNG files in `dir` (`page-1.png`, `page-2.png`, ...), in page order.
/// Files without a trailing page number are skipped.
fn rendered_pages(dir: &Path) -> ProcessResult<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("png"))
                .unwrap_or(false)
        })
        .filter_map(|path| page_number(&path).map(|n| (n, path)))
        .collect();

    pages.sort();
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

/// `page-07.png` -> 7
fn page_number(path: &Path) -> Option<u32> {
    path.file_stem()?
        .to_str()?
        .rsplit('-')
        .next()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn scratch_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_decode_png_single_page() {
        let scratch = tempfile::tempdir().unwrap();
        let decoder = Decoder::new(scratch.path());

        let doc = decoder.decode(&png_bytes(7, 5), "Receipt.PNG").unwrap();

        assert_eq!(doc.kind, DocumentKind::Raster);
        assert_eq!(doc.page_count(), 1);
        assert_eq!((doc.pages[0].width(), doc.pages[0].height()), (7, 5));
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[test]
    fn test_unsupported_extension_creates_nothing() {
        let root = tempfile::tempdir().unwrap();
        let scratch = root.path().join("scratch");
        let decoder = Decoder::new(&scratch);

        let err = decoder.decode(b"hello", "notes.txt").unwrap_err();

        assert!(matches!(err, ProcessError::UnsupportedFormat(ref ext) if ext == "txt"));
        assert!(!scratch.exists());
    }

    #[test]
    fn test_malformed_image_is_decode_error_and_cleaned_up() {
        let scratch = tempfile::tempdir().unwrap();
        let decoder = Decoder::new(scratch.path());

        let err = decoder.decode(b"definitely not a jpeg", "scan.jpg").unwrap_err();

        assert!(matches!(err, ProcessError::DecodeError { .. }));
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[test]
    fn test_pdf_without_header_is_decode_error() {
        let scratch = tempfile::tempdir().unwrap();
        let decoder = Decoder::new(scratch.path());

        let err = decoder.decode(b"not a pdf", "report.pdf").unwrap_err();

        assert!(err.to_string().contains("%PDF"));
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[test]
    fn test_heic_without_ftyp_is_decode_error() {
        let scratch = tempfile::tempdir().unwrap();
        let decoder = Decoder::new(scratch.path());

        let err = decoder.decode(&[0u8; 32], "IMG_0001.heic").unwrap_err();

        assert!(matches!(err, ProcessError::DecodeError { .. }));
        assert_eq!(scratch_entries(scratch.path()), 0);
    }

    #[test]
    fn test_rendered_pages_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let pages = rendered_pages(dir.path()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["page-1.png", "page-2.png", "page-10.png"]);
    }

    #[test]
    fn test_rendered_pages_decode_and_join_in_page_order() {
        use crate::ocr::{extract_text, OcrEngine};

        struct WidthEngine;

        impl OcrEngine for WidthEngine {
            fn recognize(&self, image: &DynamicImage) -> ProcessResult<String> {
                Ok(format!("width {}", image.width()))
            }
        }

        // Written out of order, with two-digit numbering past page 9
        let dir = tempfile::tempdir().unwrap();
        for (page, width) in [(10, 10), (2, 2), (1, 1), (9, 9)] {
            std::fs::write(dir.path().join(format!("page-{:02}.png", page)), png_bytes(width, 3))
                .unwrap();
        }

        let pages = decode_rendered(dir.path(), "report.pdf").unwrap();
        let text = extract_text(&WidthEngine, &pages).unwrap();

        assert_eq!(text, "width 1\nwidth 2\nwidth 9\nwidth 10");
    }

    #[test]
    fn test_no_rendered_pages_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page-depth.png"), png_bytes(1, 1)).unwrap();

        let err = decode_rendered(dir.path(), "report.pdf").unwrap_err();
        assert!(matches!(err, ProcessError::DecodeError { .. }));
    }

    #[test]
    fn test_rendered_pages_skip_unnumbered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-2.png", "page-depth.png", "page.png", "page-1.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let pages = rendered_pages(dir.path()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["page-1.png", "page-2.png"]);
    }

    #[test]
    fn test_primary_photo_ignores_auxiliary_images() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("photo.png");
        for name in ["photo.png", "photo-depth.png", "photo-urn_hdrgainmap.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let primary = primary_image(dir.path(), &target).unwrap();
        assert_eq!(primary, Some(target));
    }

    #[test]
    fn test_primary_photo_of_multi_image_container() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("photo.png");
        for name in ["photo-2.png", "photo-1-depth.png", "photo-1.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let primary = primary_image(dir.path(), &target).unwrap();
        assert_eq!(primary, Some(dir.path().join("photo-1.png")));

        let empty = tempfile::tempdir().unwrap();
        assert_eq!(primary_image(empty.path(), &empty.path().join("photo.png")).unwrap(), None);
    }

    #[test]
    fn test_page_number() {
        assert_eq!(page_number(Path::new("/tmp/x/page-07.png")), Some(7));
        assert_eq!(page_number(Path::new("/tmp/x/photo.png")), None);
    }
}
