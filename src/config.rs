//! Application configuration and TOML parsing.
//!
//! The config file uses TOML format. Every key is optional. Example:
//!
//! ```toml
//! [global]
//! log_level = "info"
//! log_file = "/var/log/autopad.log"
//!
//! [database]
//! file_name = "InputAutoCfg.ini"
//! search_paths = ["/usr/share/mupen64plus", "/usr/local/share/mupen64plus"]
//! platform = "linux"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::score::Platform;

/// File name of the profile database looked up in the shared data dirs.
pub const DEFAULT_DATABASE_FILE: &str = "InputAutoCfg.ini";

/// Shared data directories searched when the config names none.
pub const DEFAULT_SEARCH_PATHS: &[&str] = &["/usr/share/mupen64plus", "/usr/local/share/mupen64plus"];

/// Top-level error type used throughout the crate.
#[derive(Debug, Error)]
pub enum AutopadError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    #[error("Config validation error: {0}")]
    InvalidConfig(String),

    #[error("Failed to read profile database {path}: {source}")]
    DatabaseReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to open input device {path}: {source}")]
    DeviceOpenError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Input device {0} reports no name")]
    MissingDeviceName(PathBuf),
}

/// Root of the TOML config file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    global: RawGlobal,
    database: RawDatabase,
}

/// The `[global]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawGlobal {
    log_level: Option<String>,
    log_file: Option<String>,
}

/// The `[database]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawDatabase {
    file_name: Option<String>,
    search_paths: Option<Vec<PathBuf>>,
    platform: Option<Platform>,
}

/// Where to find the profile database and how to read its headers.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub file_name: String,
    pub search_paths: Vec<PathBuf>,
    pub platform: Platform,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_DATABASE_FILE.to_string(),
            search_paths: DEFAULT_SEARCH_PATHS.iter().map(PathBuf::from).collect(),
            platform: Platform::current(),
        }
    }
}

/// Top-level parsed configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: Option<String>,
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            database: DatabaseConfig::default(),
        }
    }
}

/// The database file name must be a bare name, it is joined onto each search path.
fn validate_file_name(name: &str) -> Result<(), AutopadError> {
    if name.is_empty() {
        return Err(AutopadError::InvalidConfig(
            "database file_name must not be empty".to_string(),
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(AutopadError::InvalidConfig(format!(
            "database file_name '{name}' must not contain a path separator"
        )));
    }
    Ok(())
}

/// Parse a TOML config file and return the fully resolved `AppConfig`.
pub fn parse_config_file(path: &Path) -> Result<AppConfig, AutopadError> {
    let raw: RawConfig =
        toml::from_str(
            &fs::read_to_string(path).map_err(|e| AutopadError::ConfigReadError {
                path: path.to_path_buf(),
                source: e,
            })?,
        )
        .map_err(|e| AutopadError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let defaults = DatabaseConfig::default();
    let file_name = raw.database.file_name.unwrap_or(defaults.file_name);
    validate_file_name(&file_name)?;

    let search_paths = raw.database.search_paths.unwrap_or_else(|| {
        debug!("No search_paths configured, using defaults");
        defaults.search_paths
    });

    Ok(AppConfig {
        log_level: raw.global.log_level.unwrap_or_else(|| "info".to_string()),
        log_file: raw.global.log_file,
        database: DatabaseConfig {
            file_name,
            search_paths,
            platform: raw.database.platform.unwrap_or(defaults.platform),
        },
    })
}
