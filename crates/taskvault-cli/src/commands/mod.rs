//! Command implementations

pub mod store;
pub mod tasks;

use clap::Args;
use std::path::PathBuf;
use taskvault_core::errors::ExError;
use taskvault_store::StoreConfig;

/// Result type shared by every command
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Where the store lives
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Directory holding the metadata document and content database
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// TOML file with store settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl StoreArgs {
    /// Flags over `TASKVAULT_*` environment over the config file over defaults
    ///
    /// The merged result is validated once every layer is applied.
    pub fn resolve(&self) -> Result<StoreConfig, ExError> {
        let config = match &self.config {
            Some(path) => StoreConfig::from_toml_file(path)?,
            None => StoreConfig::default(),
        }
        .with_env_overrides();

        let config = match &self.data_dir {
            Some(dir) => config.with_data_dir(dir.clone()),
            None => config,
        };
        config.validate()?;
        Ok(config)
    }
}
