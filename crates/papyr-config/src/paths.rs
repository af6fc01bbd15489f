//! Application paths management.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Manages all application paths following platform conventions.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub database_file: PathBuf,
    /// Blob store root for original uploads.
    pub uploads_dir: PathBuf,
    /// Per-request temporary files.
    pub scratch_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("com", "papyr", "papyr")?;
        Some(Self::from_dirs(proj_dirs.config_dir(), proj_dirs.data_dir()))
    }

    /// Lay out paths under explicit config and data directories.
    pub fn from_dirs(config_dir: &Path, data_dir: &Path) -> Self {
        Self {
            config_file: config_dir.join("config.toml"),
            database_file: data_dir.join("papyr.db"),
            uploads_dir: data_dir.join("ocr_uploads"),
            scratch_dir: data_dir.join("scratch"),
            log_dir: data_dir.join("logs"),
            config_dir: config_dir.to_path_buf(),
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Move data paths under a configured data directory, keeping the config location.
    pub fn with_data_dir(self, data_dir: &Path) -> Self {
        Self::from_dirs(&self.config_dir, data_dir)
    }

    /// Create all necessary directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.uploads_dir)?;
        std::fs::create_dir_all(&self.scratch_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }

    /// Check if papyr has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.database_file.exists()
    }
}
