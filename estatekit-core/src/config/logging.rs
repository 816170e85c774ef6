//! Logging configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Env: ESTATE_LOG_LEVEL
    /// Default: "info"
    pub level: String,

    /// "human" or "json"
    /// Env: ESTATE_LOG_FORMAT
    /// Default: "human"
    pub format: String,

    /// Write to stderr instead of stdout
    /// Default: true
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "human".to_string(), stderr: true }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(level) = env::var("ESTATE_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(format) = env::var("ESTATE_LOG_FORMAT") {
            self.format = format;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.level.parse::<log::LevelFilter>().is_err() {
            bail!("Invalid log level: {}", self.level);
        }
        if !["human", "json"].contains(&self.format.to_lowercase().as_str()) {
            bail!("Invalid log format: must be human or json");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(LoggingConfig::default().validate().is_ok());

        let bad_level = LoggingConfig { level: "loud".into(), ..Default::default() };
        assert!(bad_level.validate().is_err());

        let bad_format = LoggingConfig { format: "xml".into(), ..Default::default() };
        assert!(bad_format.validate().is_err());
    }
}
