//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use covenant_domain::CountyCatalog;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database holding deeds and reviews
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Known counties and the default time-series selection
    #[serde(default)]
    pub counties: CountyCatalog,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".covenant").join("config.toml"))
    }

    /// Load configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from a file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            debug!(path = %path.display(), "loaded config");
            Ok(config)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            counties: CountyCatalog::default(),
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_database() -> PathBuf {
    PathBuf::from("covenants.db")
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
