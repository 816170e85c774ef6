//! Address lookup and map tiles
//!
//! [`Geocoder`] turns a free-text address into coordinates. The upload form
//! uses it to pin a listing on the map before saving; a lookup with no match
//! is `Ok(None)`, not an error.

use crate::config::GeocodingConfig;
use crate::listing::GeoPoint;
use crate::{EstateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    /// Provider's normalized form of the address
    pub display_address: String,
}

impl GeocodeResult {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>>;
}

#[async_trait::async_trait]
impl<G: Geocoder + ?Sized> Geocoder for Arc<G> {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>> {
        (**self).geocode(address).await
    }
}

/// Fixed lookup table, keyed by case- and whitespace-insensitive address
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, GeocodeResult>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, result: GeocodeResult) -> Self {
        self.entries.insert(normalize(address), result);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(address: &str) -> String {
    address.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[async_trait::async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>> {
        Ok(self.entries.get(&normalize(address)).cloned())
    }
}

/// OpenStreetMap Nominatim search client
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, endpoint: config.endpoint.clone() })
    }

    fn search_url(&self, address: &str) -> String {
        format!(
            "{}?format=json&limit=1&q={}",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(address.trim())
        )
    }
}

/// First place of a Nominatim `format=json` answer
pub fn parse_nominatim_response(body: &str) -> Result<Option<GeocodeResult>> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)
        .map_err(|e| EstateError::Geocoding(format!("unexpected response: {}", e)))?;
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let lat = place.lat.parse::<f64>();
    let lng = place.lon.parse::<f64>();
    match (lat, lng) {
        (Ok(lat), Ok(lng)) if GeoPoint::new(lat, lng).is_valid() => {
            Ok(Some(GeocodeResult { lat, lng, display_address: place.display_name }))
        }
        _ => Err(EstateError::Geocoding(format!(
            "invalid coordinates in response: {}, {}",
            place.lat, place.lon
        ))),
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>> {
        if address.trim().is_empty() {
            return Ok(None);
        }

        let response = self.client.get(self.search_url(address)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EstateError::Geocoding(format!("provider answered HTTP {}", status)));
        }

        let body = response.text().await?;
        let result = parse_nominatim_response(&body)?;
        log::debug!("Geocoded {:?}: {}", address, if result.is_some() { "hit" } else { "miss" });
        Ok(result)
    }
}

/// Build the geocoder selected by `config.provider`
pub fn geocoder_from_config(config: &GeocodingConfig) -> Result<Arc<dyn Geocoder>> {
    match config.provider.as_str() {
        "nominatim" => Ok(Arc::new(NominatimGeocoder::new(config)?)),
        "static" => Ok(Arc::new(StaticGeocoder::new())),
        other => Err(EstateError::Config(format!("unknown geocoding provider: {}", other))),
    }
}

/// Slippy-map tile address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub const MAX_ZOOM: u8 = 19;

    /// Tile containing `point` at `zoom` (Web Mercator, clamped to the map)
    pub fn from_point(point: GeoPoint, zoom: u8) -> Self {
        let z = zoom.min(Self::MAX_ZOOM);
        let n = f64::from(1u32 << z);
        let lat = point.lat.clamp(-85.051_128_78, 85.051_128_78).to_radians();

        let x = ((point.lng + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - lat.tan().asinh() / PI) / 2.0 * n).floor();

        let max = n - 1.0;
        Self { x: x.clamp(0.0, max) as u32, y: y.clamp(0.0, max) as u32, z }
    }

    /// Fill `{z}`, `{x}` and `{y}` in a tile URL template
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}
