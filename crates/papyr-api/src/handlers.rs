//! API request handlers.

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use papyr_core::{file_extension, Document, DocumentUpdate};
use papyr_ingest::{IngestResult, Ingestor, UploadRequest};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Shared handler state.
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
    /// Bounds concurrent OCR and export jobs.
    jobs: Arc<Semaphore>,
    pub max_upload_bytes: usize,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(ingestor: Ingestor, max_concurrent_jobs: usize, max_upload_bytes: usize) -> Self {
        Self {
            ingestor: Arc::new(ingestor),
            jobs: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
            max_upload_bytes,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}

/// Run a blocking ingestor call off the async runtime.
async fn blocking<T, F>(state: &AppState, call: F) -> ApiResult<T>
where
    F: FnOnce(&Ingestor) -> IngestResult<T> + Send + 'static,
    T: Send + 'static,
{
    let ingestor = Arc::clone(&state.ingestor);
    Ok(tokio::task::spawn_blocking(move || call(&ingestor)).await??)
}

/// Like [`blocking`], but waits for a free job slot first.
async fn job<T, F>(state: &AppState, call: F) -> ApiResult<T>
where
    F: FnOnce(&Ingestor) -> IngestResult<T> + Send + 'static,
    T: Send + 'static,
{
    let _permit = Arc::clone(&state.jobs)
        .acquire_owned()
        .await
        .map_err(|_| ApiError::ServiceUnavailable("job queue is closed".to_string()))?;
    blocking(state, call).await
}

/// Health check with external tool availability
pub async fn health() -> Json<Value> {
    let tools: serde_json::Map<String, Value> = papyr_process::check_dependencies()
        .into_iter()
        .map(|(tool, available)| (tool.to_string(), Value::Bool(available)))
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": tools,
    }))
}

/// Upload a document (multipart form: file, chat, message, tags)
pub async fn upload(
    State(state): State<SharedState>,
    CurrentUser(owner): CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let mut request = UploadRequest {
        owner,
        ..Default::default()
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                request.filename = field.file_name().unwrap_or_default().to_string();
                request.bytes = Some(field.bytes().await?.to_vec());
            }
            "chat" => request.chat_id = non_blank(field.text().await?),
            "message" => request.message_id = non_blank(field.text().await?),
            "tags" => request.tags = Some(field.text().await?),
            other => debug!("Ignoring multipart field: {}", other),
        }
    }

    let doc = job(&state, move |ingestor| ingestor.ingest(request)).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// Get a record
pub async fn get_document(
    State(state): State<SharedState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let doc = blocking(&state, move |ingestor| ingestor.get(&id, &owner)).await?;
    Ok(Json(doc))
}

/// Update tags and/or structured data
pub async fn update_document(
    State(state): State<SharedState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
    Json(update): Json<DocumentUpdate>,
) -> ApiResult<Json<Document>> {
    let doc = blocking(&state, move |ingestor| ingestor.update(&id, &owner, &update)).await?;
    Ok(Json(doc))
}

/// Delete a record and its original upload
pub async fn delete_document(
    State(state): State<SharedState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    blocking(&state, move |ingestor| ingestor.delete(&id, &owner)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Export the inferred table as an attachment
pub async fn export_document(
    State(state): State<SharedState>,
    CurrentUser(owner): CurrentUser,
    Path((id, format)): Path<(String, String)>,
) -> ApiResult<Response> {
    let artifact = job(&state, move |ingestor| ingestor.export(&id, &owner, &format)).await?;
    Ok(attachment(&artifact.filename, artifact.content_type, artifact.bytes))
}

/// Download the original upload
pub async fn download_document(
    State(state): State<SharedState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let download = blocking(&state, move |ingestor| ingestor.download(&id, &owner)).await?;
    let content_type = media_type(&download.filename);
    Ok(attachment(&download.filename, content_type, download.bytes))
}

/// Record attached to a chat message
pub async fn document_for_message(
    State(state): State<SharedState>,
    CurrentUser(owner): CurrentUser,
    Path(message_id): Path<String>,
) -> ApiResult<Json<Document>> {
    let doc = blocking(&state, move |ingestor| {
        ingestor.find_by_message(&message_id, &owner)
    })
    .await?;
    Ok(Json(doc))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn attachment(filename: &str, content_type: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(filename)),
        ],
        bytes,
    )
        .into_response()
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let encoded: String = filename
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b) {
                (b as char).to_string()
            } else {
                format!("%{:02X}", b)
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

fn media_type(filename: &str) -> &'static str {
    match file_extension(filename).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("scan.png.csv"),
            "attachment; filename=\"scan.png.csv\"; filename*=UTF-8''scan.png.csv"
        );

        let header = content_disposition("re\"ceipt é.pdf");
        assert!(header.contains("filename=\"re_ceipt _.pdf\""));
        assert!(header.contains("filename*=UTF-8''re%22ceipt%20%C3%A9.pdf"));
    }

    #[test]
    fn test_media_type() {
        assert_eq!(media_type("a.JPG"), "image/jpeg");
        assert_eq!(media_type("a.pdf"), "application/pdf");
        assert_eq!(media_type("a"), "application/octet-stream");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  ".to_string()), None);
        assert_eq!(non_blank(" m1 ".to_string()), Some("m1".to_string()));
    }
}
