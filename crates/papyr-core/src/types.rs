//! Core domain types for Papyr.

use crate::error::{Error, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Unique identifier for extraction records.
pub type DocumentId = String;

/// Identity of the user owning a record.
pub type UserId = String;

/// Opaque reference to a chat managed outside Papyr.
pub type ChatId = String;

/// Opaque reference to a chat message managed outside Papyr.
pub type MessageId = String;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lower-cased text after the last `.` of a filename, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// How an uploaded file is turned into raster images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Single-frame raster image (JPEG, PNG).
    Raster,
    /// Camera-native compressed photo (HEIC/HEIF).
    CameraPhoto,
    /// Paginated document, one image per page (PDF).
    Paged,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Raster => "raster",
            DocumentKind::CameraPhoto => "camera_photo",
            DocumentKind::Paged => "paged",
        }
    }

    /// Detect the document kind from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" => Some(DocumentKind::Raster),
            "heic" | "heif" => Some(DocumentKind::CameraPhoto),
            "pdf" => Some(DocumentKind::Paged),
            _ => None,
        }
    }

    /// Detect the document kind from a declared filename.
    pub fn from_filename(filename: &str) -> Option<Self> {
        file_extension(filename).and_then(|ext| Self::from_extension(&ext))
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Downstream file format for exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
    Xls,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Xls => "xls",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "xlsx" => Some(ExportFormat::Xlsx),
            "xls" => Some(ExportFormat::Xls),
            _ => None,
        }
    }

    /// MIME type sent with the exported artifact.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Xlsx | ExportFormat::Xls => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn is_spreadsheet(&self) -> bool {
        matches!(self, ExportFormat::Xlsx | ExportFormat::Xls)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The persisted outcome of a single ingestion.
///
/// Field names on the wire follow the upload API: `file` is the blob key,
/// `upload_date` the creation time, `chat`/`message` the associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub owner: UserId,
    #[serde(rename = "file")]
    pub file_path: String,
    pub filename: String,
    pub extracted_text: Option<String>,
    pub extracted_data: Option<serde_json::Value>,
    #[serde(rename = "upload_date")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(rename = "chat")]
    pub chat_id: Option<ChatId>,
    #[serde(rename = "message")]
    pub message_id: Option<MessageId>,
    pub tags: Option<String>,
}

impl Document {
    /// Create a record for an uploaded file. Owner and filename must be non-empty.
    pub fn new(
        owner: impl Into<UserId>,
        filename: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Result<Self> {
        let owner = owner.into();
        let filename = filename.into();

        if owner.trim().is_empty() {
            return Err(Error::InvalidInput("owner must not be empty".to_string()));
        }
        if filename.trim().is_empty() {
            return Err(Error::InvalidInput("filename must not be empty".to_string()));
        }

        Ok(Self {
            id: new_id(),
            owner,
            file_path: file_path.into(),
            filename,
            extracted_text: None,
            extracted_data: None,
            // Microsecond precision, matching what the record store keeps
            uploaded_at: Utc::now().trunc_subsecs(6),
            chat_id: None,
            message_id: None,
            tags: None,
        })
    }

    pub fn with_extracted_text(mut self, text: impl Into<String>) -> Self {
        self.extracted_text = Some(text.into());
        self
    }

    pub fn with_chat(mut self, chat_id: Option<ChatId>) -> Self {
        self.chat_id = chat_id;
        self
    }

    pub fn with_message(mut self, message_id: Option<MessageId>) -> Self {
        self.message_id = message_id;
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Whether there is any extracted text worth exporting.
    pub fn has_text(&self) -> bool {
        self.extracted_text
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }
}

/// Longest accepted tag string, in characters.
pub const MAX_TAGS_LEN: usize = 255;

/// Reject tag strings longer than [`MAX_TAGS_LEN`].
pub fn validate_tags(tags: &str) -> Result<()> {
    if tags.chars().count() > MAX_TAGS_LEN {
        return Err(Error::TooLong {
            field: "tags",
            max: MAX_TAGS_LEN,
        });
    }
    Ok(())
}

/// Fields a record's owner may change after creation.
///
/// The outer `Option` says whether the field changes at all; `Some(None)`
/// clears it. In JSON, an absent key leaves the field alone and `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentUpdate {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<Option<serde_json::Value>>,
}

impl DocumentUpdate {
    pub fn with_tags(mut self, tags: Option<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_extracted_data(mut self, data: Option<serde_json::Value>) -> Self {
        self.extracted_data = Some(data);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.extracted_data.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        match &self.tags {
            Some(Some(tags)) => validate_tags(tags),
            _ => Ok(()),
        }
    }
}

/// A key that is present, even as `null`, deserializes to `Some`.
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Row/column view of extracted text. Rows may have different lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InferredTable {
    pub rows: Vec<Vec<String>>,
}

impl InferredTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row length.
    pub fn max_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}
