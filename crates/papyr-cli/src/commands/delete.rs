//! Delete command - remove a document and its original upload.

use super::{load, open_ingestor, resolve_user};
use anyhow::Result;
use colored::Colorize;

pub fn run(user: Option<String>, id: &str) -> Result<()> {
    let (config, paths) = load()?;
    let owner = resolve_user(user, &config);
    let ingestor = open_ingestor(&config, &paths)?;

    let doc = ingestor.delete(id, &owner)?;

    println!("{} Deleted {} ({})", "✓".green(), doc.filename.white().bold(), doc.id.dimmed());

    Ok(())
}
