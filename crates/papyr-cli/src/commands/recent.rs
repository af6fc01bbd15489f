//! Recent command - list the latest documents.

use super::{load, open_ingestor, preview, resolve_user};
use anyhow::Result;
use colored::Colorize;

pub fn run(user: Option<String>, limit: i64) -> Result<()> {
    let (config, paths) = load()?;
    let owner = resolve_user(user, &config);
    let ingestor = open_ingestor(&config, &paths)?;

    let docs = ingestor.list(&owner, Some(limit))?;

    if docs.is_empty() {
        println!("{}", "No documents found.".dimmed());
        return Ok(());
    }

    println!("{} ({})", "Recent Documents".cyan().bold(), docs.len());
    println!("{}", "─".repeat(70));

    for doc in &docs {
        let short_id = &doc.id[..8.min(doc.id.len())];
        println!(
            "  {} {} {}",
            short_id.dimmed(),
            doc.filename.white().bold(),
            doc.uploaded_at.format(&config.ui.date_format).to_string().dimmed()
        );

        let first_line = preview(doc.extracted_text.as_deref(), 60);
        if !first_line.is_empty() {
            println!("    {}", first_line);
        }
    }

    Ok(())
}
