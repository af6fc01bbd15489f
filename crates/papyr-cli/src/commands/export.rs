//! Export command - write the inferred table to a file.

use super::{load, open_ingestor, output_path, resolve_user};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

pub fn run(user: Option<String>, id: &str, format: &str, output: Option<PathBuf>) -> Result<()> {
    let (config, paths) = load()?;
    let owner = resolve_user(user, &config);
    let ingestor = open_ingestor(&config, &paths)?;

    let artifact = ingestor.export(id, &owner, format)?;
    let target = output_path(output, &artifact.filename);

    std::fs::write(&target, &artifact.bytes)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!(
        "{} Exported {} ({} bytes)",
        "✓".green(),
        target.display().to_string().white().bold(),
        artifact.bytes.len()
    );

    Ok(())
}
