//! Application settings loaded from config.toml
//!
//! Every section is optional; a missing file or a missing key falls back to
//! the defaults below, so a fresh checkout runs without any configuration.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative settings file
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where product images are stored and served from
    pub storage: StorageConfig,
    /// Dashboard revenue options
    pub revenue: RevenueConfig,
}

/// Blob storage settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding uploaded blobs
    pub root: PathBuf,
    /// Public URL prefix under which `root` is served
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
            base_url: "http://localhost:3000/uploads".to_string(),
        }
    }
}

/// Revenue dashboard settings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct RevenueConfig {
    /// Leave lines of cancelled orders out of the monthly sums
    pub exclude_cancelled: bool,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses settings from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `$STOREFRONT_CONFIG` or `./config.toml`, returning the
/// defaults when the file does not exist.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).map_or_else(|_| PathBuf::from("config.toml"), PathBuf::from);

    if !path.exists() {
        tracing::info!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    load_config(&path)
}
