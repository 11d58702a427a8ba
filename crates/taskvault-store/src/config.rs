//! Store configuration
//!
//! Resolution order: explicit overrides, then `TASKVAULT_*` environment
//! variables, then an optional TOML file, then defaults.

#![allow(clippy::result_large_err)]

use crate::errors::{config_error, io_error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_METADATA_FILE: &str = "tasks_metadata.json";
pub const DEFAULT_CONTENT_FILE: &str = "tasks_content.db";

pub const ENV_DATA_DIR: &str = "TASKVAULT_DATA_DIR";
pub const ENV_METADATA_FILE: &str = "TASKVAULT_METADATA_FILE";
pub const ENV_CONTENT_FILE: &str = "TASKVAULT_CONTENT_FILE";

/// Locations of the two backing artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory holding both artifacts
    pub data_dir: PathBuf,

    /// Metadata document file name, relative to `data_dir`
    pub metadata_file: String,

    /// SQLite database file name, relative to `data_dir`
    pub content_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
            content_file: DEFAULT_CONTENT_FILE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Default file names under `data_dir`
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error for malformed TOML, unknown keys or
    /// empty file names.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(text)
            .map_err(|e| config_error(&format!("Invalid store config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the file cannot be read, otherwise as
    /// [`StoreConfig::from_toml_str`].
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| io_error("read_config", e))?;
        Self::from_toml_str(&text)
    }

    /// Apply `TASKVAULT_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup(ENV_METADATA_FILE).filter(|v| !v.is_empty()) {
            self.metadata_file = name;
        }
        if let Some(name) = lookup(ENV_CONTENT_FILE).filter(|v| !v.is_empty()) {
            self.content_file = name;
        }
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Full path of the metadata document
    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_file)
    }

    /// Full path of the SQLite database
    pub fn content_path(&self) -> PathBuf {
        self.data_dir.join(&self.content_file)
    }

    /// Check the resolved locations
    ///
    /// Run on the final configuration, after every override is applied.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error for an empty data directory or file
    /// name, or when both artifacts resolve to the same path.
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(config_error("data_dir cannot be empty"));
        }
        if self.metadata_file.trim().is_empty() {
            return Err(config_error("metadata_file cannot be empty"));
        }
        if self.content_file.trim().is_empty() {
            return Err(config_error("content_file cannot be empty"));
        }
        if self.metadata_file == self.content_file
            || self.metadata_path() == self.content_path()
        {
            return Err(config_error(
                "metadata_file and content_file must be different files",
            ));
        }
        Ok(())
    }
}
