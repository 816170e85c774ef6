//! Schema v1 upgrade
//!
//! v1 records were written by several generations of upload forms, so one
//! concept may sit under different keys. Each concept has a fixed alias list
//! below, tried in order; the first non-null value wins.

use crate::area::{AreaDetails, AreaMeasurement, AreaUnit};
use crate::layout::{
    CommonField, HomestayUnit, HotelRoom, Layout, LayoutSet, ModeDetails, RentRoom, SaleUnit,
    Tenure, TransitInfo, TransitKind, TransitStop, COMMON_FIELDS,
};
use crate::listing::{GeoPoint, Listing, ListingMode};
use crate::pricing::Price;
use crate::schema::CURRENT_SCHEMA_VERSION;
use crate::{EstateError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

const ID: &[&str] = &["id", "listingId"];
const OWNER: &[&str] = &["ownerId", "owner_id", "userId", "user_id"];
const TITLE: &[&str] = &["title", "propertyName", "name"];
const ADDRESS: &[&str] = &["address", "fullAddress"];
const DISPLAY_ADDRESS: &[&str] = &["displayAddress", "formattedAddress"];
const MODE: &[&str] = &["saleType", "listingType", "mode"];
const LAT: &[&str] = &["lat", "latitude"];
const LNG: &[&str] = &["lng", "lon", "longitude"];
const CREATED: &[&str] = &["createdAt", "created_at"];
const UPDATED: &[&str] = &["updatedAt", "updated_at"];
const LAYOUTS: &[&str] = &["layouts", "unitLayouts", "roomTypes"];

const CATEGORY: &[&str] = &["category", "propertyCategory"];
const SUB_TYPE: &[&str] = &["subType", "propertySubType", "sub_type"];
const PRICE: &[&str] = &["price", "salePrice", "monthlyRent", "rentPrice"];
const BEDROOMS: &[&str] = &["bedrooms", "bedroom"];
const BATHROOMS: &[&str] = &["bathrooms", "bathroom"];
const CARPARKS: &[&str] = &["carparks", "carpark", "parking"];
const PHOTOS: &[&str] = &["photos", "images"];
const DESCRIPTION: &[&str] = &["description", "desc"];
const INHERIT: &[&str] = &["_inheritCommon", "inheritCommon"];

const BUILT_UP: &[&str] = &["builtUp", "builtUpArea", "area"];
const BUILT_UP_UNIT: &[&str] = &["builtUpUnit", "areaUnit", "unit"];
const LAND: &[&str] = &["landArea", "land"];
const LAND_UNIT: &[&str] = &["landUnit", "areaUnit", "unit"];

const TENURE: &[&str] = &["tenure"];
const COMPLETION_YEAR: &[&str] = &["completionYear", "buildYear", "builtYear"];
const DEPOSIT: &[&str] = &["depositMonths", "deposit"];
const MIN_TENANCY: &[&str] = &["minTenancy", "minTenancyMonths"];
const AVAILABLE_FROM: &[&str] = &["availableFrom", "availableDate"];
const ROOM_COUNT: &[&str] = &["roomCount", "totalRooms"];
const MAX_GUESTS: &[&str] = &["maxGuests", "guests"];
const MIN_NIGHTS: &[&str] = &["minNights", "minimumStay"];
const BLOCKED: &[&str] = &["blockedDates", "unavailableDates"];

/// Upgrade a v1 record to a current [`Listing`]
pub fn upgrade_v1(fields: &Map<String, Value>) -> Result<Listing> {
    let mode = match pick(fields, MODE).and_then(text) {
        Some(label) => label.parse::<ListingMode>()?,
        None => {
            log::warn!("v1 record without a listing mode, assuming sale");
            ListingMode::Sale
        }
    };

    let id = match pick(fields, ID).and_then(text) {
        Some(raw) => Uuid::parse_str(&raw)
            .map_err(|e| EstateError::Schema(format!("invalid listing id {:?}: {}", raw, e)))?,
        None => Uuid::new_v4(),
    };

    let location = match (pick(fields, LAT).and_then(number), pick(fields, LNG).and_then(number)) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)).filter(GeoPoint::is_valid),
        _ => None,
    };

    let now = Utc::now();
    let created_at = pick(fields, CREATED).and_then(timestamp).unwrap_or(now);
    let updated_at = pick(fields, UPDATED).and_then(timestamp).unwrap_or(created_at);

    let layouts = upgrade_layouts(fields, mode)?;

    let mut listing = Listing {
        id,
        owner_id: pick(fields, OWNER).and_then(text).unwrap_or_default(),
        title: pick(fields, TITLE).and_then(text).unwrap_or_default(),
        address: pick(fields, ADDRESS).and_then(text).unwrap_or_default(),
        display_address: pick(fields, DISPLAY_ADDRESS).and_then(text),
        location,
        mode,
        status: crate::listing::ListingStatus::Incomplete,
        layouts,
        schema_version: CURRENT_SCHEMA_VERSION,
        created_at,
        updated_at,
    };
    listing.status = listing.compute_status();
    Ok(listing)
}

fn upgrade_layouts(fields: &Map<String, Value>, mode: ListingMode) -> Result<LayoutSet> {
    let mut set = LayoutSet::new(mode);

    let entries: Vec<Value> = match pick(fields, LAYOUTS) {
        Some(Value::String(blob)) if blob.trim().is_empty() => Vec::new(),
        Some(Value::String(blob)) => match serde_json::from_str(blob) {
            Ok(Value::Array(items)) => items,
            Ok(other) => vec![other],
            Err(e) => return Err(EstateError::Schema(format!("layouts blob is not valid JSON: {}", e))),
        },
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    };

    if entries.is_empty() {
        // Single-unit listing: the unit fields live on the record itself
        upgrade_layout(set.push_new(), fields, None, mode);
    } else {
        for (position, entry) in entries.iter().enumerate() {
            match entry {
                Value::Object(obj) => upgrade_layout(set.push_new(), obj, Some(fields), mode),
                other => log::warn!(
                    "Skipping v1 layout #{}: expected an object, got {}",
                    position,
                    crate::listing::json_kind(other)
                ),
            }
        }
    }

    // The reference layout never follows anyone, whatever v1 stored
    if let Some(reference) = set.get_mut(0) {
        reference.inherit_common = Some(false);
    }
    Ok(set)
}

fn upgrade_layout(
    layout: &mut Layout,
    obj: &Map<String, Value>,
    parent: Option<&Map<String, Value>>,
    mode: ListingMode,
) {
    // Bulk projects stored category and sub-type once on the record
    let inherited = |aliases: &[&str]| parent.and_then(|p| pick(p, aliases)).and_then(text);

    let unit = &mut layout.unit;
    unit.category = pick(obj, CATEGORY).and_then(text).or_else(|| inherited(CATEGORY)).unwrap_or_default();
    unit.sub_type = pick(obj, SUB_TYPE).and_then(text).or_else(|| inherited(SUB_TYPE)).unwrap_or_default();
    unit.price = pick(obj, PRICE).and_then(price);
    unit.area = area(obj);
    unit.bedrooms = pick(obj, BEDROOMS).map_or(0, count);
    unit.bathrooms = pick(obj, BATHROOMS).map_or(0, count);
    unit.carparks = pick(obj, CARPARKS).map_or(0, count);
    unit.photos = pick(obj, PHOTOS).map(string_list).unwrap_or_default();
    unit.description = pick(obj, DESCRIPTION).and_then(text).unwrap_or_default();

    layout.details = details(obj, mode);

    for field in COMMON_FIELDS {
        let Some(value) = obj.get(field.legacy_key()).or_else(|| obj.get(field.key())) else {
            continue;
        };
        let common = &mut layout.common;
        match field {
            CommonField::ExtraSpaces => common.extra_spaces = string_list(value),
            CommonField::Furniture => common.furniture = string_list(value),
            CommonField::Facilities => common.facilities = string_list(value),
            CommonField::Transit => common.transit = transit(value),
        }
    }

    layout.inherit_common = pick(obj, INHERIT).and_then(Value::as_bool);
}

fn details(obj: &Map<String, Value>, mode: ListingMode) -> ModeDetails {
    match mode {
        ListingMode::Sale => ModeDetails::SaleUnit(SaleUnit {
            tenure: pick(obj, TENURE).and_then(text).and_then(|t| {
                let t = t.to_lowercase();
                if t.contains("free") {
                    Some(Tenure::Freehold)
                } else if t.contains("lease") {
                    Some(Tenure::Leasehold)
                } else {
                    None
                }
            }),
            completion_year: pick(obj, COMPLETION_YEAR).and_then(number).map(|y| y as i32),
        }),
        ListingMode::Rent => ModeDetails::RentRoom(RentRoom {
            deposit_months: pick(obj, DEPOSIT).and_then(number),
            min_tenancy_months: pick(obj, MIN_TENANCY).map(count),
            available_from: pick(obj, AVAILABLE_FROM).and_then(date),
        }),
        ListingMode::Hotel => {
            let defaults = HotelRoom::default();
            ModeDetails::HotelRoom(HotelRoom {
                room_count: pick(obj, ROOM_COUNT).map_or(defaults.room_count, count),
                max_guests: pick(obj, MAX_GUESTS).map_or(defaults.max_guests, count),
                blocked_dates: pick(obj, BLOCKED).map(dates).unwrap_or_default(),
            })
        }
        ListingMode::Homestay => {
            let defaults = HomestayUnit::default();
            ModeDetails::HomestayUnit(HomestayUnit {
                max_guests: pick(obj, MAX_GUESTS).map_or(defaults.max_guests, count),
                min_nights: pick(obj, MIN_NIGHTS).map_or(defaults.min_nights, count),
                blocked_dates: pick(obj, BLOCKED).map(dates).unwrap_or_default(),
            })
        }
    }
}

fn area(obj: &Map<String, Value>) -> AreaDetails {
    AreaDetails {
        built_up: pick(obj, BUILT_UP).and_then(|v| measurement(v, pick(obj, BUILT_UP_UNIT))),
        land: pick(obj, LAND).and_then(|v| measurement(v, pick(obj, LAND_UNIT))),
    }
}

/// `{value, unit}` object, or a bare number with the unit in a sibling key
fn measurement(value: &Value, sibling_unit: Option<&Value>) -> Option<AreaMeasurement> {
    let (raw, unit) = match value {
        Value::Object(inner) => (inner.get("value")?, inner.get("unit").or(sibling_unit)),
        other => (other, sibling_unit),
    };
    let unit = unit.and_then(Value::as_str).map(AreaUnit::parse).unwrap_or_default();
    number(raw).map(|v| AreaMeasurement::new(v, unit))
}

fn transit(value: &Value) -> TransitInfo {
    match value {
        Value::String(note) if note.trim().is_empty() => TransitInfo::default(),
        Value::String(note) => TransitInfo { stops: Vec::new(), note: Some(note.trim().to_string()) },
        Value::Array(items) => TransitInfo { stops: items.iter().filter_map(stop).collect(), note: None },
        Value::Object(obj) => TransitInfo {
            stops: obj.get("stops").and_then(Value::as_array).map_or_else(Vec::new, |items| {
                items.iter().filter_map(stop).collect()
            }),
            note: obj.get("note").and_then(text),
        },
        _ => TransitInfo::default(),
    }
}

fn stop(value: &Value) -> Option<TransitStop> {
    match value {
        Value::String(name) => Some(TransitStop {
            name: name.trim().to_string(),
            kind: TransitKind::parse(name),
            walking_minutes: None,
        }),
        Value::Object(obj) => {
            let name = pick(obj, &["name", "station"]).and_then(text)?;
            let kind = pick(obj, &["kind", "type"])
                .and_then(text)
                .map_or_else(|| TransitKind::parse(&name), |k| TransitKind::parse(&k));
            Some(TransitStop {
                name,
                kind,
                walking_minutes: pick(obj, &["walkingMinutes", "minutes"]).map(count),
            })
        }
        _ => None,
    }
}

fn pick<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().filter_map(|key| obj.get(*key)).find(|v| !v.is_null())
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Room counts; "Studio" and other non-numeric labels count as 0
fn count(value: &Value) -> u32 {
    number(value).filter(|n| *n > 0.0).map_or(0, |n| n.floor().min(f64::from(u32::MAX)) as u32)
}

fn price(value: &Value) -> Option<Price> {
    match value {
        Value::Object(obj) => {
            let min = pick(obj, &["min", "minPrice"]).and_then(number).unwrap_or(0.0);
            let max = pick(obj, &["max", "maxPrice"]).and_then(number).unwrap_or(0.0);
            Some(Price::range(min, max)).filter(Price::is_positive)
        }
        other => number(other).map(Price::Single).filter(Price::is_positive),
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        Value::String(s) => {
            s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
        }
        _ => Vec::new(),
    }
}

fn date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn dates(value: &Value) -> BTreeSet<NaiveDate> {
    value.as_array().map_or_else(BTreeSet::new, |items| items.iter().filter_map(date).collect())
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim()).ok().map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::InheritState;
    use crate::listing::ListingStatus;
    use serde_json::json;

    #[test]
    fn test_single_unit_record() {
        let record = json!({
            "title": "Garden Terrace",
            "saleType": "sale",
            "propertyCategory": "Landed",
            "price": "850,000",
            "builtUp": 2200,
            "areaUnit": "sqft",
            "bedroom": "4",
            "lat": "3.1",
            "lng": 101.6,
            "facilities": "pool, gym",
            "tenure": "Freehold"
        });
        let listing = upgrade_v1(record.as_object().unwrap()).unwrap();

        assert_eq!(listing.mode, ListingMode::Sale);
        assert_eq!(listing.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(listing.layouts.len(), 1);
        let layout = listing.layouts.get(0).unwrap();
        assert_eq!(layout.unit.category, "Landed");
        assert_eq!(layout.unit.price, Some(Price::Single(850_000.0)));
        assert_eq!(layout.unit.bedrooms, 4);
        assert_eq!(layout.unit.area.preferred_square_feet(), 2200.0);
        assert_eq!(layout.common.facilities, vec!["pool".to_string(), "gym".to_string()]);
        assert_eq!(layout.inherit_common, Some(false));
        assert_eq!(layout.details, ModeDetails::SaleUnit(SaleUnit {
            tenure: Some(Tenure::Freehold),
            completion_year: None,
        }));
        assert_eq!(listing.status, ListingStatus::Available);
    }

    #[test]
    fn test_layouts_blob_with_inheritance_flags() {
        let layouts = json!([
            {"price": {"min": 300000, "max": 320000}, "builtUp": {"value": 90, "unit": "sq. metres"},
             "extraSpaces": ["balcony"], "_inheritCommon": true},
            {"price": 410000, "extraSpaces": ["yard"], "_inheritCommon": false},
            {"price": 500000}
        ]);
        let record = json!({
            "saleType": "sale",
            "propertyCategory": "Condominium",
            "layouts": layouts.to_string(),
        });
        let listing = upgrade_v1(record.as_object().unwrap()).unwrap();

        assert_eq!(listing.layouts.len(), 3);
        assert_eq!(listing.layouts.inherit_state(0), Some(InheritState::Detached));
        assert_eq!(listing.layouts.get(0).unwrap().inherit_common, Some(false));
        assert_eq!(listing.layouts.get(1).unwrap().inherit_common, Some(false));
        assert_eq!(listing.layouts.get(2).unwrap().inherit_common, None);
        assert_eq!(listing.layouts.inherit_state(2), Some(InheritState::Attached));

        let first = listing.layouts.get(0).unwrap();
        assert_eq!(first.unit.category, "Condominium");
        assert!((first.unit.area.preferred_square_feet() - 968.751).abs() < 0.01);
        assert_eq!(listing.lowest_price(), Some(300_000.0));
        assert_eq!(listing.status, ListingStatus::Incomplete);
    }

    #[test]
    fn test_hotel_room_types() {
        let record = json!({
            "listingType": "hotel",
            "roomTypes": [
                {"category": "Deluxe", "maxGuests": 3, "totalRooms": "12",
                 "blockedDates": ["2026-12-24", "2026-12-25T00:00:00Z", "bad"],
                 "transit": [{"name": "Pier 4", "type": "ferry", "minutes": 6}, "Central MRT"]}
            ]
        });
        let listing = upgrade_v1(record.as_object().unwrap()).unwrap();
        let layout = listing.layouts.get(0).unwrap();
        let ModeDetails::HotelRoom(room) = &layout.details else {
            panic!("expected hotel room details");
        };
        assert_eq!(room.room_count, 12);
        assert_eq!(room.max_guests, 3);
        assert_eq!(room.blocked_dates.len(), 2);
        assert_eq!(layout.common.transit.stops.len(), 2);
        assert_eq!(layout.common.transit.stops[0].kind, TransitKind::Ferry);
        assert_eq!(layout.common.transit.stops[1].kind, TransitKind::Rail);
    }

    #[test]
    fn test_invalid_inputs() {
        let bad_mode = json!({"saleType": "auction"});
        assert!(upgrade_v1(bad_mode.as_object().unwrap()).is_err());

        let bad_blob = json!({"saleType": "rent", "layouts": "[{"});
        assert!(upgrade_v1(bad_blob.as_object().unwrap()).is_err());

        let bad_id = json!({"id": "not-a-uuid"});
        assert!(upgrade_v1(bad_id.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_studio_counts_as_zero_bedrooms() {
        assert_eq!(count(&json!("Studio")), 0);
        assert_eq!(count(&json!(2.7)), 2);
        assert_eq!(count(&json!(-1)), 0);
    }
}
