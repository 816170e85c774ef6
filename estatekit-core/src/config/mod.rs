//! Configuration for EstateKit
//!
//! Values are resolved in the following order (highest priority wins):
//!
//! 1. **Environment Variables** (`ESTATE_*`)
//! 2. **Config File** (`estatekit.toml`)
//! 3. **Defaults**
//!
//! # Example
//!
//! ```no_run
//! use estatekit_core::config::EstateConfig;
//!
//! let config = EstateConfig::load()?;
//! config.validate()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod geocoding;
pub mod layouts;
pub mod logging;
pub mod media;
pub mod storage;

pub use geocoding::GeocodingConfig;
pub use layouts::LayoutsConfig;
pub use logging::LoggingConfig;
pub use media::MediaConfig;
pub use storage::StorageConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "estatekit.toml";

/// Complete EstateKit configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EstateConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub geocoding: GeocodingConfig,
    pub media: MediaConfig,
    pub layouts: LayoutsConfig,
}

impl EstateConfig {
    /// Defaults, then `estatekit.toml` if present, then environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.storage.merge(other.storage);
        self.logging.merge(other.logging);
        self.geocoding.merge(other.geocoding);
        self.media.merge(other.media);
        self.layouts.merge(other.layouts);
    }

    pub fn apply_env_vars(&mut self) {
        self.storage.apply_env_vars();
        self.logging.apply_env_vars();
        self.geocoding.apply_env_vars();
        self.media.apply_env_vars();
        self.layouts.apply_env_vars();
    }

    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.logging.validate()?;
        self.geocoding.validate()?;
        self.media.validate()?;
        self.layouts.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EstateConfig::default();
        assert_eq!(config.storage.data_dir, "./data");
        assert_eq!(config.logging.level, "info");
        assert!(config.layouts.enable_sync);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = EstateConfig::from_toml(
            r#"
            [storage]
            data_dir = "/var/lib/estatekit"

            [layouts]
            max_layouts = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/estatekit");
        assert_eq!(config.layouts.max_layouts, 12);
        assert!(config.layouts.enable_sync);
        assert_eq!(config.logging.format, "human");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[media]\nbase_url = \"https://cdn.example.com/photos\"").unwrap();

        let config = EstateConfig::load_from(file.path()).unwrap();
        assert_eq!(config.media.base_url, "https://cdn.example.com/photos");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EstateConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.geocoding.provider, "nominatim");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage\ndata_dir = ").unwrap();
        let err = EstateConfig::load_from(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load config"));
    }
}
