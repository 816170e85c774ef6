//! Listing record
//!
//! [`Listing`] is the typed form of one property listing. Stores keep it as a
//! [`ListingRecord`]: a flat bag of named fields in which the layout set is a
//! single serialized JSON string.

use crate::layout::LayoutSet;
use crate::schema::{self, CURRENT_SCHEMA_VERSION};
use crate::{EstateError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// What kind of deal the listing offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingMode {
    Sale,
    Rent,
    Homestay,
    Hotel,
}

impl ListingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingMode::Sale => "sale",
            ListingMode::Rent => "rent",
            ListingMode::Homestay => "homestay",
            ListingMode::Hotel => "hotel",
        }
    }
}

impl fmt::Display for ListingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingMode {
    type Err = EstateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sale" | "sell" | "for sale" => Ok(ListingMode::Sale),
            "rent" | "rental" | "for rent" => Ok(ListingMode::Rent),
            "homestay" => Ok(ListingMode::Homestay),
            "hotel" => Ok(ListingMode::Hotel),
            other => Err(EstateError::Schema(format!("unknown listing mode: {}", other))),
        }
    }
}

/// Computed on every save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Missing coordinates, layouts or a priced layout
    Incomplete,
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub mode: ListingMode,
    pub status: ListingStatus,
    pub layouts: LayoutSet,
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(mode: ListingMode, owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        let mut listing = Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            title: title.into(),
            address: String::new(),
            display_address: None,
            location: None,
            mode,
            status: ListingStatus::Incomplete,
            layouts: LayoutSet::new(mode),
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
        };
        listing.status = listing.compute_status();
        listing
    }

    pub fn compute_status(&self) -> ListingStatus {
        let located = self.location.is_some_and(|p| p.is_valid());
        if located && self.lowest_price().is_some() {
            ListingStatus::Available
        } else {
            ListingStatus::Incomplete
        }
    }

    /// Lowest positive price across all layouts
    pub fn lowest_price(&self) -> Option<f64> {
        self.layouts
            .iter()
            .filter_map(|l| l.unit.price.and_then(|p| p.lowest()))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Highest positive price across all layouts
    pub fn highest_price(&self) -> Option<f64> {
        self.layouts
            .iter()
            .filter_map(|l| l.unit.price.and_then(|p| p.highest()))
            .max_by(|a, b| a.total_cmp(b))
    }

    pub fn max_bedrooms(&self) -> u32 {
        self.layouts.iter().map(|l| l.unit.bedrooms).max().unwrap_or(0)
    }

    /// Categories declared on the layouts, deduplicated in layout order
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for layout in &self.layouts {
            let category = layout.unit.category.as_str();
            if !category.is_empty() && !out.contains(&category) {
                out.push(category);
            }
        }
        out
    }

    /// Flatten into the stored record shape
    pub fn to_record(&self) -> Result<ListingRecord> {
        let Value::Object(mut fields) = serde_json::to_value(self)? else {
            return Err(EstateError::Persistence("listing did not serialize to an object".into()));
        };
        let layouts = serde_json::to_string(&self.layouts)?;
        fields.insert("layouts".to_string(), Value::String(layouts));
        Ok(ListingRecord { fields })
    }

    /// Decode a stored record, migrating older schema versions
    pub fn from_record(record: ListingRecord) -> Result<Self> {
        schema::migrate_record(Value::Object(record.fields))
    }
}

/// A listing as the data store sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingRecord {
    fields: Map<String, Value>,
}

impl ListingRecord {
    /// Wrap an arbitrary JSON object (any schema version)
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(EstateError::Schema(format!(
                "listing record must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn id(&self) -> Option<Uuid> {
        self.fields.get("id").and_then(Value::as_str).and_then(|s| Uuid::parse_str(s).ok())
    }

    pub fn schema_version(&self) -> u32 {
        schema::record_version(&self.fields)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
