//! Settings errors.
//!
//! [`ConfigError`] covers values that fail validation; [`SettingsError`] adds
//! the file handling around them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write config {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// Neither a config nor a home directory is known for this user.
    #[error("No configuration directory for this user")]
    NoConfigDirectory,

    #[error("Failed to create config directory {}: {source}", path.display())]
    CreateDirectory { path: PathBuf, source: io::Error },

    #[error("Malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed TOML config: {0}")]
    TomlRead(#[from] toml::de::Error),

    #[error("Config cannot be written as TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
}

/// A configuration value that cannot be used.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Only `.toml` and `.json` files are understood.
    #[error("Unsupported config format '{extension}', expected .toml or .json")]
    UnsupportedFormat { extension: String },

    #[error("'{key}' = {value} is out of range")]
    OutOfRange { key: String, value: String },

    #[error("'{key}' is invalid: {reason}")]
    InvalidValue { key: String, reason: String },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;
