//! Layout form configuration

use crate::layout::{LayoutPolicy, DEFAULT_MAX_LAYOUTS};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutsConfig {
    /// Let attached layouts follow the reference layout
    /// Env: ESTATE_LAYOUT_SYNC
    /// Default: true
    pub enable_sync: bool,

    /// Upper bound for a declared layout count
    /// Env: ESTATE_MAX_LAYOUTS
    /// Default: 50
    pub max_layouts: usize,
}

impl Default for LayoutsConfig {
    fn default() -> Self {
        Self { enable_sync: true, max_layouts: DEFAULT_MAX_LAYOUTS }
    }
}

impl LayoutsConfig {
    pub fn policy(&self) -> LayoutPolicy {
        LayoutPolicy { enable_sync: self.enable_sync, max_layouts: self.max_layouts, ..Default::default() }
    }

    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(sync) = env::var("ESTATE_LAYOUT_SYNC") {
            self.enable_sync = sync.parse().unwrap_or(true);
        }
        if let Ok(max) = env::var("ESTATE_MAX_LAYOUTS") {
            if let Ok(m) = max.parse() {
                self.max_layouts = m;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_layouts == 0 {
            bail!("Invalid max_layouts: must be greater than 0");
        }
        Ok(())
    }
}
