//! Photo storage configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Env: ESTATE_MEDIA_DIR
    /// Default: "./media"
    pub dir: String,

    /// Prefix of the URLs returned for stored photos
    /// Env: ESTATE_MEDIA_BASE_URL
    /// Default: "/media"
    pub base_url: String,

    /// Largest accepted photo in bytes
    /// Default: 10 MiB
    pub max_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { dir: "./media".to_string(), base_url: "/media".to_string(), max_bytes: 10 * 1024 * 1024 }
    }
}

impl MediaConfig {
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(dir) = env::var("ESTATE_MEDIA_DIR") {
            self.dir = dir;
        }
        if let Ok(url) = env::var("ESTATE_MEDIA_BASE_URL") {
            self.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dir.trim().is_empty() {
            bail!("Invalid media dir: must not be empty");
        }
        if self.max_bytes == 0 {
            bail!("Invalid media max_bytes: must be greater than 0");
        }
        Ok(())
    }
}
