//! Table export to CSV, JSON and spreadsheet files.
//!
//! Each export is serialized into a uniquely named temporary file under the
//! scratch directory and read back into memory. The temporary file is dropped
//! on every path, including serialization failures.

use crate::error::{IngestError, IngestResult};
use papyr_core::{ExportFormat, InferredTable};
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A finished export, ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Serializes inferred tables into downloadable files.
#[derive(Debug, Clone)]
pub struct Exporter {
    scratch_dir: PathBuf,
}

impl Exporter {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Serialize `table` as `format`, naming the artifact `{stem}.{format}`.
    pub fn export(
        &self,
        table: &InferredTable,
        format: ExportFormat,
        stem: &str,
    ) -> IngestResult<ExportArtifact> {
        std::fs::create_dir_all(&self.scratch_dir)?;

        let suffix = format!(".{}", format.as_str());
        let artifact = tempfile::Builder::new()
            .prefix("papyr-export-")
            .suffix(&suffix)
            .tempfile_in(&self.scratch_dir)?;

        debug!(format = %format, rows = table.row_count(), "Writing export to {:?}", artifact.path());

        match format {
            ExportFormat::Csv => write_csv(table, artifact.as_file())?,
            ExportFormat::Json => write_json(table, artifact.as_file())?,
            // Both spreadsheet tokens get an OOXML workbook
            ExportFormat::Xlsx | ExportFormat::Xls => write_workbook(table, artifact.path())?,
        }

        let bytes = std::fs::read(artifact.path())?;
        artifact.close()?;

        Ok(ExportArtifact {
            filename: format!("{}.{}", stem, format.as_str()),
            content_type: format.content_type(),
            bytes,
        })
    }
}

fn write_csv(table: &InferredTable, file: &File) -> IngestResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(file);

    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(table: &InferredTable, file: &File) -> IngestResult<()> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &table.rows)?;
    writer.flush()?;
    Ok(())
}

fn write_workbook(table: &InferredTable, path: &Path) -> IngestResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (r, row) in table.rows.iter().enumerate() {
        let r = u32::try_from(r)
            .map_err(|_| IngestError::Export(format!("too many rows for a worksheet: {}", r)))?;
        for (c, cell) in row.iter().enumerate() {
            let c = u16::try_from(c).map_err(|_| {
                IngestError::Export(format!("too many columns for a worksheet: {}", c))
            })?;
            sheet.write_string(r, c, cell.as_str())?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::infer_table;

    fn scratch_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_csv_roundtrip_preserves_cells() {
        let scratch = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(scratch.path());
        let table = infer_table("a b\nc\n\nd e f");

        let artifact = exporter.export(&table, ExportFormat::Csv, "scan.png").unwrap();
        assert_eq!(artifact.filename, "scan.png.csv");
        assert_eq!(artifact.content_type, "text/csv");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(artifact.bytes.as_slice());
        let parsed: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();

        assert_eq!(parsed, table.rows);
        assert!(scratch_is_empty(scratch.path()));
    }

    #[test]
    fn test_json_is_array_of_arrays() {
        let scratch = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(scratch.path());
        let table = infer_table("Item Price\nTea 2.00");

        let artifact = exporter.export(&table, ExportFormat::Json, "r.jpg").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&artifact.bytes).unwrap();

        assert_eq!(value, serde_json::json!([["Item", "Price"], ["Tea", "2.00"]]));
        assert_eq!(artifact.filename, "r.jpg.json");
        assert!(scratch_is_empty(scratch.path()));
    }

    #[test]
    fn test_spreadsheets_are_ooxml() {
        let scratch = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(scratch.path());
        let table = infer_table("a b\nc");

        for format in [ExportFormat::Xlsx, ExportFormat::Xls] {
            let artifact = exporter.export(&table, format, "scan.pdf").unwrap();
            assert!(artifact.bytes.starts_with(b"PK"));
            assert_eq!(artifact.filename, format!("scan.pdf.{}", format));
        }
        assert!(scratch_is_empty(scratch.path()));
    }

    #[test]
    fn test_failed_workbook_leaves_no_artifact() {
        let scratch = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(scratch.path());

        // Worksheet cells hold at most 32767 characters
        let table = InferredTable {
            rows: vec![vec!["x".repeat(40_000)]],
        };

        let err = exporter.export(&table, ExportFormat::Xlsx, "long.png").unwrap_err();
        assert!(matches!(err, IngestError::Export(_)));
        assert!(scratch_is_empty(scratch.path()));
    }

    #[test]
    fn test_empty_table_still_exports() {
        let scratch = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(scratch.path());

        let artifact = exporter
            .export(&InferredTable::default(), ExportFormat::Json, "blank.png")
            .unwrap();
        assert_eq!(artifact.bytes, b"[]");
    }
}
