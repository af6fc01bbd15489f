//! Tag command - replace a document's tags.

use super::{load, open_ingestor, resolve_user};
use anyhow::Result;
use colored::Colorize;
use papyr_core::DocumentUpdate;

pub fn run(user: Option<String>, id: &str, tags: &str) -> Result<()> {
    let (config, paths) = load()?;
    let owner = resolve_user(user, &config);
    let ingestor = open_ingestor(&config, &paths)?;

    let update = DocumentUpdate::default().with_tags(Some(tags.to_string()));
    let doc = ingestor.update(id, &owner, &update)?;

    println!(
        "{} Tagged {} with '{}'",
        "✓".green(),
        doc.filename.white().bold(),
        tags.yellow()
    );

    Ok(())
}
