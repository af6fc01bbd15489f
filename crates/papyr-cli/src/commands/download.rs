//! Download command - write the original upload to a file.

use super::{load, open_ingestor, output_path, resolve_user};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

pub fn run(user: Option<String>, id: &str, output: Option<PathBuf>) -> Result<()> {
    let (config, paths) = load()?;
    let owner = resolve_user(user, &config);
    let ingestor = open_ingestor(&config, &paths)?;

    let download = ingestor.download(id, &owner)?;
    let target = output_path(output, &download.filename);

    std::fs::write(&target, &download.bytes)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!(
        "{} Saved {}",
        "✓".green(),
        target.display().to_string().white().bold()
    );

    Ok(())
}
