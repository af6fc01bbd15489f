//! Initialize Papyr.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use papyr_config::Config;
use papyr_db::Database;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    // Check if already initialized
    if paths.is_initialized() {
        println!("{} Papyr is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Database: {}", paths.database_file.display());
        return Ok(());
    }

    println!("{}", "Initializing Papyr...".cyan().bold());

    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    if !paths.config_file.exists() {
        Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
        println!("  {} Created config: {}", "✓".green(), paths.config_file.display());
    }

    let _db = Database::open(&paths.database_file).context("Failed to initialize database")?;
    println!("  {} Created database: {}", "✓".green(), paths.database_file.display());
    println!("  {} Uploads: {}", "✓".green(), paths.uploads_dir.display());

    println!();
    println!("{}", "Papyr initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Check OCR tools: {}", "papyr status".cyan());
    println!("  2. Upload a scan: {}", "papyr upload ~/Scans/receipt.jpg".cyan());
    println!("  3. Serve the HTTP API: {}", "papyr serve".cyan());

    Ok(())
}
