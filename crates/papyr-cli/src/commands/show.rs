//! Show command - display document details.

use super::{load, open_ingestor, resolve_user};
use anyhow::Result;
use colored::Colorize;
use papyr_core::{Document, DocumentKind};

pub fn run(user: Option<String>, id: &str, text: bool) -> Result<()> {
    let (config, paths) = load()?;
    let owner = resolve_user(user, &config);
    let ingestor = open_ingestor(&config, &paths)?;

    let doc = ingestor.get(id, &owner)?;
    print_document(&doc, &config.ui.date_format, text);

    Ok(())
}

/// Print a document header, metadata and optionally its full text.
pub fn print_document(doc: &Document, date_format: &str, with_text: bool) {
    let icon = match DocumentKind::from_filename(&doc.filename) {
        Some(DocumentKind::Paged) => "📄",
        Some(DocumentKind::CameraPhoto) => "📷",
        Some(DocumentKind::Raster) | None => "🖼️",
    };

    println!("{} {}", icon, doc.filename.white().bold());
    println!("{}", "─".repeat(70));

    println!("  {}: {}", "ID".cyan(), doc.id);
    println!("  {}: {}", "Uploaded".cyan(), doc.uploaded_at.format(date_format));
    println!("  {}: {}", "Blob".cyan(), doc.file_path);

    if let Some(ref chat) = doc.chat_id {
        println!("  {}: {}", "Chat".cyan(), chat);
    }
    if let Some(ref message) = doc.message_id {
        println!("  {}: {}", "Message".cyan(), message);
    }
    if let Some(ref tags) = doc.tags {
        if !tags.is_empty() {
            println!("  {}: {}", "Tags".cyan(), tags.yellow());
        }
    }
    if let Some(ref data) = doc.extracted_data {
        println!("  {}: {}", "Data".cyan(), data);
    }

    let text = doc.extracted_text.as_deref().unwrap_or_default();
    let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    println!("  {}: {} chars, {} lines", "Text".cyan(), text.len(), lines);

    if with_text && !text.is_empty() {
        println!();
        println!("{}", text);
    }
}
