//! Versioned listing record migration
//!
//! Stored records carry a `schema_version` field. Records written before the
//! field existed are version 1: loosely typed, camelCase, with numbers that
//! may arrive as strings. They are upgraded once, when read, through the
//! explicit key table in [`legacy`]; everything written back is the current
//! version.
//!
//! | version | shape                                                        |
//! |---------|--------------------------------------------------------------|
//! | 1       | legacy bag of fields, `layouts` as JSON string or array      |
//! | 2       | serde form of [`Listing`], `layouts` as a JSON string        |

pub mod legacy;

use crate::listing::{json_kind, Listing};
use crate::{EstateError, Result};
use serde_json::{Map, Value};

/// Version written by this crate
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Schema version of a stored record (missing means 1)
pub fn record_version(fields: &Map<String, Value>) -> u32 {
    match fields.get("schema_version").and_then(Value::as_u64) {
        Some(v) => u32::try_from(v).unwrap_or(u32::MAX),
        None => 1,
    }
}

/// Decode a stored record of any supported version into a [`Listing`]
pub fn migrate_record(value: Value) -> Result<Listing> {
    let Value::Object(fields) = value else {
        return Err(EstateError::Schema(format!(
            "listing record must be a JSON object, got {}",
            json_kind(&value)
        )));
    };

    match record_version(&fields) {
        1 => {
            let listing = legacy::upgrade_v1(&fields)?;
            log::debug!("Upgraded listing {} from schema v1", listing.id);
            Ok(listing)
        }
        CURRENT_SCHEMA_VERSION => decode_current(fields),
        other => Err(EstateError::Schema(format!("unsupported schema version {}", other))),
    }
}

fn decode_current(mut fields: Map<String, Value>) -> Result<Listing> {
    if let Some(Value::String(blob)) = fields.get("layouts") {
        let layouts: Value = serde_json::from_str(blob)
            .map_err(|e| EstateError::Schema(format!("layouts blob is not valid JSON: {}", e)))?;
        fields.insert("layouts".to_string(), layouts);
    }
    let mut listing: Listing = serde_json::from_value(Value::Object(fields))
        .map_err(|e| EstateError::Schema(format!("invalid v{} record: {}", CURRENT_SCHEMA_VERSION, e)))?;
    if let Some(reference) = listing.layouts.get_mut(0) {
        reference.inherit_common = Some(false);
    }
    Ok(listing)
}

/// Bulk migration statistics
#[derive(Debug, Default)]
pub struct MigrationStats {
    pub records_read: usize,
    pub upgraded: usize,
    pub errors: Vec<String>,
}

impl MigrationStats {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Migration complete: {} records read, {} upgraded from older schemas (errors: {})",
            self.records_read,
            self.upgraded,
            self.errors.len()
        )
    }
}

/// Migrate a batch of records, collecting failures instead of stopping
pub fn migrate_records(values: Vec<Value>) -> (Vec<Listing>, MigrationStats) {
    let mut stats = MigrationStats::default();
    let mut listings = Vec::with_capacity(values.len());

    for (position, value) in values.into_iter().enumerate() {
        stats.records_read += 1;
        let version = match &value {
            Value::Object(fields) => record_version(fields),
            _ => CURRENT_SCHEMA_VERSION,
        };
        match migrate_record(value) {
            Ok(listing) => {
                if version < CURRENT_SCHEMA_VERSION {
                    stats.upgraded += 1;
                }
                listings.push(listing);
            }
            Err(e) => {
                let message = format!("record #{}: {}", position, e);
                log::warn!("{}", message);
                stats.errors.push(message);
            }
        }
    }

    (listings, stats)
}
