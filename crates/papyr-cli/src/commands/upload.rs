//! Upload command - OCR a local file and store it.

use super::show::print_document;
use super::{load, open_ingestor, resolve_user};
use anyhow::{Context, Result};
use colored::Colorize;
use papyr_ingest::UploadRequest;
use std::path::Path;

pub fn run(
    user: Option<String>,
    path: &str,
    chat: Option<String>,
    message: Option<String>,
    tags: Option<String>,
) -> Result<()> {
    let (config, paths) = load()?;
    let owner = resolve_user(user, &config);
    let ingestor = open_ingestor(&config, &paths)?;

    let expanded = shellexpand::tilde(path);
    let path = Path::new(expanded.as_ref());
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    println!("{} {}", "Processing".cyan(), filename);

    let request = UploadRequest::new(owner, filename, bytes)
        .with_chat(chat)
        .with_message(message)
        .with_tags(tags);
    let doc = ingestor.ingest(request)?;

    println!("{} Uploaded", "✓".green());
    println!();
    print_document(&doc, &config.ui.date_format, true);

    Ok(())
}
