pub mod calc;
pub mod listings;

use anyhow::{bail, Result};
use estatekit_core::config::{EstateConfig, DEFAULT_CONFIG_FILE};
use estatekit_core::store::{open_store, ListingStore};
use std::path::Path;
use std::sync::Arc;

/// Loaded configuration and the store it points at
pub struct Context {
    pub config: EstateConfig,
    pub store: Arc<dyn ListingStore>,
}

impl Context {
    pub fn init(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
        }
        let mut config =
            EstateConfig::load_from(config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE)))?;
        if let Some(dir) = data_dir {
            config.storage.data_dir = dir.to_string_lossy().into_owned();
        }
        config.validate()?;
        estatekit_core::logging::init_logging(&config.logging)?;
        Self::with_config(config)
    }

    pub fn with_config(config: EstateConfig) -> Result<Self> {
        let store = open_store(&config.storage)?;
        Ok(Self { config, store })
    }
}
