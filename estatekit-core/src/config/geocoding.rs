//! Geocoding configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// "nominatim" or "static"
    /// Env: ESTATE_GEOCODER
    /// Default: "nominatim"
    pub provider: String,

    /// Search endpoint
    /// Env: ESTATE_GEOCODER_ENDPOINT
    pub endpoint: String,

    /// Request timeout in seconds
    /// Env: ESTATE_GEOCODER_TIMEOUT
    /// Default: 10
    pub timeout_secs: u64,

    /// Sent as User-Agent; public Nominatim rejects anonymous clients
    pub user_agent: String,

    /// Slippy-map tile URL with `{z}`, `{x}`, `{y}` placeholders
    pub tile_url_template: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: "nominatim".to_string(),
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            timeout_secs: 10,
            user_agent: format!("estatekit/{}", env!("CARGO_PKG_VERSION")),
            tile_url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
        }
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(provider) = env::var("ESTATE_GEOCODER") {
            self.provider = provider;
        }
        if let Ok(endpoint) = env::var("ESTATE_GEOCODER_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("ESTATE_GEOCODER_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !["nominatim", "static"].contains(&self.provider.as_str()) {
            bail!("Invalid geocoding provider: must be nominatim or static");
        }
        if self.provider == "nominatim" && !self.endpoint.starts_with("http") {
            bail!("Invalid geocoding endpoint: {}", self.endpoint);
        }
        if self.timeout_secs == 0 {
            bail!("Invalid geocoding timeout: must be greater than 0");
        }
        Ok(())
    }
}
