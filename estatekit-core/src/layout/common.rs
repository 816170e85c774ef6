//! Fields shared across the layouts of one listing
//!
//! [`COMMON_FIELDS`] is the one place that names which layout fields take
//! part in cross-layout synchronization. Manager code, patches and the
//! legacy record migration all go through [`CommonField`].

use serde::{Deserialize, Serialize};

/// One synchronizable layout field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommonField {
    ExtraSpaces,
    Furniture,
    Facilities,
    Transit,
}

/// Every common field, in display order
pub const COMMON_FIELDS: [CommonField; 4] =
    [CommonField::ExtraSpaces, CommonField::Furniture, CommonField::Facilities, CommonField::Transit];

impl CommonField {
    /// Key in the current record schema
    pub fn key(self) -> &'static str {
        match self {
            CommonField::ExtraSpaces => "extra_spaces",
            CommonField::Furniture => "furniture",
            CommonField::Facilities => "facilities",
            CommonField::Transit => "transit",
        }
    }

    /// Key used by schema v1 records
    pub fn legacy_key(self) -> &'static str {
        match self {
            CommonField::ExtraSpaces => "extraSpaces",
            CommonField::Furniture => "furniture",
            CommonField::Facilities => "facilities",
            CommonField::Transit => "transit",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitKind {
    Rail,
    Bus,
    Ferry,
    #[default]
    Other,
}

impl TransitKind {
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if ["mrt", "lrt", "rail", "train", "metro", "subway"].iter().any(|k| label.contains(k)) {
            TransitKind::Rail
        } else if label.contains("bus") {
            TransitKind::Bus
        } else if label.contains("ferry") {
            TransitKind::Ferry
        } else {
            TransitKind::Other
        }
    }
}

/// A nearby transit stop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitStop {
    pub name: String,
    #[serde(default)]
    pub kind: TransitKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walking_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitInfo {
    pub stops: Vec<TransitStop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TransitInfo {
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty() && self.note.as_deref().map_or(true, str::is_empty)
    }
}

/// The synchronizable part of a layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonFields {
    pub extra_spaces: Vec<String>,
    pub furniture: Vec<String>,
    pub facilities: Vec<String>,
    pub transit: TransitInfo,
}

impl CommonFields {
    /// Copy one field from `source`
    pub fn copy_field(&mut self, field: CommonField, source: &CommonFields) {
        match field {
            CommonField::ExtraSpaces => self.extra_spaces = source.extra_spaces.clone(),
            CommonField::Furniture => self.furniture = source.furniture.clone(),
            CommonField::Facilities => self.facilities = source.facilities.clone(),
            CommonField::Transit => self.transit = source.transit.clone(),
        }
    }

    /// Fields whose value differs from `other`
    pub fn diff(&self, other: &CommonFields) -> Vec<CommonField> {
        COMMON_FIELDS.into_iter().filter(|f| !self.field_eq(*f, other)).collect()
    }

    fn field_eq(&self, field: CommonField, other: &CommonFields) -> bool {
        match field {
            CommonField::ExtraSpaces => self.extra_spaces == other.extra_spaces,
            CommonField::Furniture => self.furniture == other.furniture,
            CommonField::Facilities => self.facilities == other.facilities,
            CommonField::Transit => self.transit == other.transit,
        }
    }
}

/// Owned copy of a layout's common fields.
///
/// Every field is an owned value, so applying a snapshot to another layout
/// never leaves two layouts sharing inner data.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonFieldSnapshot(CommonFields);

impl CommonFieldSnapshot {
    pub fn of(fields: &CommonFields) -> Self {
        Self(fields.clone())
    }

    pub fn fields(&self) -> &CommonFields {
        &self.0
    }

    /// Overwrite every common field of `target`
    pub fn apply_to(&self, target: &mut CommonFields) {
        for field in COMMON_FIELDS {
            target.copy_field(field, &self.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommonFields {
        CommonFields {
            extra_spaces: vec!["balcony".into()],
            furniture: vec!["sofa".into()],
            facilities: vec!["pool".into(), "gym".into()],
            transit: TransitInfo {
                stops: vec![TransitStop {
                    name: "Central".into(),
                    kind: TransitKind::Rail,
                    walking_minutes: Some(5),
                }],
                note: None,
            },
        }
    }

    #[test]
    fn test_diff_reports_changed_fields() {
        let a = sample();
        let mut b = sample();
        assert!(a.diff(&b).is_empty());

        b.facilities.push("sauna".into());
        b.transit.note = Some("shuttle".into());
        assert_eq!(a.diff(&b), vec![CommonField::Facilities, CommonField::Transit]);
    }

    #[test]
    fn test_snapshot_apply_is_a_deep_copy() {
        let source = sample();
        let snapshot = CommonFieldSnapshot::of(&source);
        let mut target = CommonFields::default();
        snapshot.apply_to(&mut target);
        assert_eq!(target, source);

        target.facilities.push("tennis".into());
        assert_eq!(snapshot.fields().facilities, vec!["pool".to_string(), "gym".to_string()]);
    }

    #[test]
    fn test_transit_kind_parse() {
        assert_eq!(TransitKind::parse("MRT"), TransitKind::Rail);
        assert_eq!(TransitKind::parse("Bus stop"), TransitKind::Bus);
        assert_eq!(TransitKind::parse(""), TransitKind::Other);
    }
}
