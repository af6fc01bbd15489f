//! CLI command implementations.

pub mod config;
pub mod delete;
pub mod download;
pub mod export;
pub mod init;
pub mod message;
pub mod recent;
pub mod serve;
pub mod show;
pub mod status;
pub mod tag;
pub mod upload;

use anyhow::{Context, Result};
use papyr_config::{AppPaths, Config};
use papyr_db::Database;
use papyr_ingest::Ingestor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the application paths, honouring `general.data_dir` from the config file.
pub fn get_paths() -> Result<AppPaths> {
    let (_, paths) = load()?;
    Ok(paths)
}

/// Load the config and the paths it implies.
pub fn load() -> Result<(Config, AppPaths)> {
    let paths = AppPaths::new().context("Failed to determine application directories")?;
    let config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    let paths = apply_data_dir(paths, &config);
    debug!("Using data directory {}", paths.data_dir.display());
    Ok((config, paths))
}

fn apply_data_dir(paths: AppPaths, config: &Config) -> AppPaths {
    match config.general.data_dir {
        Some(ref dir) => {
            let expanded = shellexpand::tilde(dir);
            paths.with_data_dir(Path::new(expanded.as_ref()))
        }
        None => paths,
    }
}

/// Get a database connection, ensuring papyr is initialized.
pub fn get_database(paths: &AppPaths) -> Result<Database> {
    if !paths.is_initialized() {
        anyhow::bail!("Papyr is not initialized. Run 'papyr init' first.");
    }

    Database::open(&paths.database_file).context("Failed to open database")
}

/// Build the document service, ensuring papyr is initialized.
pub fn open_ingestor(config: &Config, paths: &AppPaths) -> Result<Ingestor> {
    let db = get_database(paths)?;
    Ok(Ingestor::from_config(db, config, paths))
}

/// The acting user: `--user` / `PAPYR_USER`, else `general.default_user`.
pub fn resolve_user(user: Option<String>, config: &Config) -> String {
    user.map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| config.general.default_user.clone())
}

/// Where to write a downloaded file: `output` if given (a directory or a file
/// path), otherwise `filename` in the current directory.
pub fn output_path(output: Option<PathBuf>, filename: &str) -> PathBuf {
    let name = Path::new(filename)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "download".into());

    match output {
        Some(path) if path.is_dir() => path.join(name),
        Some(path) => path,
        None => PathBuf::from(name),
    }
}

/// Format a file size in human-readable form.
pub fn format_size(bytes: i64) -> String {
    const KB: i64 = 1024;
    const MB: i64 = KB * 1024;
    const GB: i64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// First line of extracted text, shortened for listings.
pub fn preview(text: Option<&str>, max_chars: usize) -> String {
    let line = text
        .unwrap_or_default()
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default()
        .trim();

    if line.chars().count() > max_chars {
        let cut: String = line.chars().take(max_chars).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}
