//! Storage configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `listings.jsonl`
    /// Env: ESTATE_DATA_DIR
    /// Default: "./data"
    pub data_dir: String,

    /// Keep listings in memory only
    /// Env: ESTATE_STORAGE_IN_MEMORY
    /// Default: false
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: "./data".to_string(), in_memory: false }
    }
}

impl StorageConfig {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(dir) = env::var("ESTATE_DATA_DIR") {
            self.data_dir = dir;
        }
        if let Ok(in_memory) = env::var("ESTATE_STORAGE_IN_MEMORY") {
            self.in_memory = in_memory.parse().unwrap_or(false);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.in_memory && self.data_dir.trim().is_empty() {
            bail!("Invalid data_dir: must not be empty");
        }
        Ok(())
    }
}
