//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let contents = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.processing.max_concurrent_jobs == 0 {
            return Err(ConfigError::Invalid(
                "processing.max_concurrent_jobs must be at least 1".to_string(),
            ));
        }
        if self.ocr.pdf_dpi < 50 || self.ocr.pdf_dpi > 1200 {
            return Err(ConfigError::Invalid(format!(
                "ocr.pdf_dpi must be between 50 and 1200, got {}",
                self.ocr.pdf_dpi
            )));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(ConfigError::Invalid("ocr.language must not be empty".to_string()));
        }
        if self.server.max_upload_mb == 0 || self.server.max_upload_mb > MAX_UPLOAD_MB {
            return Err(ConfigError::Invalid(format!(
                "server.max_upload_mb must be between 1 and {}, got {}",
                MAX_UPLOAD_MB, self.server.max_upload_mb
            )));
        }
        Ok(())
    }

    /// Set a single value by dotted key, e.g. `ocr.language`.
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
            value
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("invalid value for {}: {}", key, value)))
        }

        match key {
            "general.data_dir" => self.general.data_dir = Some(value.to_string()),
            "general.default_user" => self.general.default_user = value.to_string(),
            "server.host" => self.server.host = value.to_string(),
            "server.port" => self.server.port = parse(key, value)?,
            "server.max_upload_mb" => self.server.max_upload_mb = parse(key, value)?,
            "ocr.language" => self.ocr.language = value.to_string(),
            "ocr.oem" => self.ocr.oem = parse(key, value)?,
            "ocr.psm" => self.ocr.psm = parse(key, value)?,
            "ocr.pdf_dpi" => self.ocr.pdf_dpi = parse(key, value)?,
            "processing.max_concurrent_jobs" => {
                self.processing.max_concurrent_jobs = parse(key, value)?
            }
            "processing.scratch_dir" => self.processing.scratch_dir = Some(value.to_string()),
            "ui.color" => self.ui.color = parse(key, value)?,
            "ui.date_format" => self.ui.date_format = value.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.validate()
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Papyr Configuration
# Document OCR ingestion and tabular export

[general]
# Data directory for the database and uploaded files
# data_dir = "~/.local/share/papyr"

# User identity used by the CLI when --user is not given
default_user = "local"

[server]
host = "127.0.0.1"
port = 8080

# Largest accepted upload, in megabytes
max_upload_mb = 50

[ocr]
# Tesseract language pack(s), e.g. "eng" or "eng+deu"
language = "eng"

# OCR engine mode (3 = LSTM + legacy, whichever is available)
oem = 3

# Page segmentation mode (3 = fully automatic)
psm = 3

# Resolution used when rendering PDF pages
pdf_dpi = 300

[processing]
# Concurrent OCR jobs served by the HTTP API
max_concurrent_jobs = 2

# Where per-request temporary files go (defaults to <data_dir>/scratch)
# scratch_dir = "/tmp/papyr"

[ui]
# Enable colored output
color = true

# Date format (strftime)
date_format = "%Y-%m-%d %H:%M"
"#
        .to_string()
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
    pub default_user: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_user: "local".to_string(),
        }
    }
}

/// Largest accepted `server.max_upload_mb`.
pub const MAX_UPLOAD_MB: usize = 4096;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl ServerConfig {
    /// `host:port` for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_mb: 50,
        }
    }
}

/// Tesseract and page rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub language: String,
    pub oem: u8,
    pub psm: u8,
    pub pdf_dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            oem: 3,
            psm: 3,
            pdf_dpi: 300,
        }
    }
}

/// Request processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub max_concurrent_jobs: usize,
    pub scratch_dir: Option<String>,
}

impl ProcessingConfig {
    /// Scratch directory, falling back to the one derived from the data dir.
    pub fn scratch_dir_or(&self, fallback: &Path) -> PathBuf {
        self.scratch_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 2,
            scratch_dir: None,
        }
    }
}

/// UI/Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub color: bool,
    pub date_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.pdf_dpi, 300);
        assert_eq!(config.server.bind_addr(), "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_file_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_config_string()).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.general.default_user, defaults.general.default_user);
        assert_eq!(parsed.ocr.psm, defaults.ocr.psm);
        assert_eq!(parsed.processing.max_concurrent_jobs, 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [ocr]
            language = "deu"
            "#
        )
        .unwrap();

        let config = Config::load_from(temp_file.path()).unwrap();

        assert_eq!(config.ocr.language, "deu");
        // Defaults should still work
        assert_eq!(config.ocr.pdf_dpi, 300);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[processing]\nmax_concurrent_jobs = 0").unwrap();

        let err = Config::load_from(temp_file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[ocr\nlanguage = ").unwrap();

        let err = Config::load_from(temp_file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&temp_file.path().display().to_string()));
    }

    #[test]
    fn test_upload_limit_is_bounded() {
        let mut config = Config::default();
        assert_eq!(config.server.max_upload_bytes(), 50 * 1024 * 1024);

        config.server.max_upload_mb = usize::MAX;
        assert_eq!(config.server.max_upload_bytes(), usize::MAX);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.server.max_upload_mb = MAX_UPLOAD_MB;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.general.default_user, "local");
    }

    #[test]
    fn test_set_by_key() {
        let mut config = Config::default();
        config.set("ocr.psm", "6").unwrap();
        config.set("server.port", "9000").unwrap();
        assert_eq!(config.ocr.psm, 6);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr(), "127.0.0.1:9000");

        assert!(matches!(
            config.set("ocr.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(config.set("server.port", "not-a-port").is_err());
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.general.default_user = "alice".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.general.default_user, "alice");
    }
}
