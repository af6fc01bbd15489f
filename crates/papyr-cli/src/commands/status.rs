//! Status command - show tools, storage and record counts.

use super::{format_size, get_database, load, resolve_user};
use anyhow::Result;
use colored::Colorize;

pub fn run(user: Option<String>) -> Result<()> {
    let (config, paths) = load()?;
    let owner = resolve_user(user, &config);

    println!("{}", "Papyr Status".cyan().bold());
    println!("{}", "─".repeat(50));

    println!();
    println!("{}", "External Tools".white().bold());
    for (tool, available) in papyr_process::check_dependencies() {
        if available {
            println!("  {} {}", "✓".green(), tool);
        } else {
            println!("  {} {} {}", "✗".red(), tool, "(not installed)".dimmed());
        }
    }

    println!();
    println!("{}", "Storage".white().bold());
    println!("  Config: {}", paths.config_file.display());
    println!("  Database: {}", paths.database_file.display());
    println!("  Uploads: {}", paths.uploads_dir.display());
    println!(
        "  Scratch: {}",
        config.processing.scratch_dir_or(&paths.scratch_dir).display()
    );

    let db = get_database(&paths)?;
    let stats = db.get_stats(&owner)?;

    println!();
    println!("{} {}", "Documents for".white().bold(), owner.yellow());
    println!("  Total: {}", stats.total_documents);
    println!("  With text: {}", stats.with_text);
    println!("  Attached to messages: {}", stats.with_message);
    println!("  Database size: {}", format_size(stats.database_size_bytes));
    if !db.integrity_check()? {
        println!("  {} Database integrity check failed", "✗".red());
    }

    if !papyr_process::all_tools_available() {
        println!();
        println!(
            "{}",
            "Some tools are missing. PDF and HEIC uploads need poppler-utils and libheif-examples."
                .dimmed()
        );
    }

    if stats.total_documents == 0 {
        println!();
        println!(
            "{}",
            "No documents yet. Use 'papyr upload <file>' to add one.".dimmed()
        );
    }

    Ok(())
}
