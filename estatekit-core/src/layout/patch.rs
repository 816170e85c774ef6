//! Partial layout edits
//!
//! A [`LayoutPatch`] is a top-level shallow merge: every `Some` field
//! replaces the layout's value wholesale, every `None` leaves it alone. The
//! same type doubles as the project-wide defaults overlay of a
//! [`super::LayoutPolicy`].

use super::common::{CommonField, TransitInfo};
use super::{Layout, ModeDetails};
use crate::area::AreaDetails;
use crate::pricing::Price;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<AreaDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carparks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ModeDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_spaces: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furniture: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transit: Option<TransitInfo>,
}

impl LayoutPatch {
    pub fn facilities(facilities: Vec<String>) -> Self {
        Self { facilities: Some(facilities), ..Default::default() }
    }

    pub fn price(price: Price) -> Self {
        Self { price: Some(price), ..Default::default() }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Common fields this patch carries a value for
    pub fn common_fields_touched(&self) -> Vec<CommonField> {
        let mut touched = Vec::new();
        if self.extra_spaces.is_some() {
            touched.push(CommonField::ExtraSpaces);
        }
        if self.furniture.is_some() {
            touched.push(CommonField::Furniture);
        }
        if self.facilities.is_some() {
            touched.push(CommonField::Facilities);
        }
        if self.transit.is_some() {
            touched.push(CommonField::Transit);
        }
        touched
    }

    /// Shallow-merge into `layout`.
    ///
    /// Mode details for a different listing mode are ignored.
    pub fn apply_to(&self, layout: &mut Layout) {
        let unit = &mut layout.unit;
        if let Some(v) = &self.category {
            unit.category = v.clone();
        }
        if let Some(v) = &self.sub_type {
            unit.sub_type = v.clone();
        }
        if let Some(v) = self.price {
            unit.price = Some(v);
        }
        if let Some(v) = self.area {
            unit.area = v;
        }
        if let Some(v) = self.bedrooms {
            unit.bedrooms = v;
        }
        if let Some(v) = self.bathrooms {
            unit.bathrooms = v;
        }
        if let Some(v) = self.carparks {
            unit.carparks = v;
        }
        if let Some(v) = &self.photos {
            unit.photos = v.clone();
        }
        if let Some(v) = &self.description {
            unit.description = v.clone();
        }
        if let Some(details) = &self.details {
            if details.mode() == layout.details.mode() {
                layout.details = details.clone();
            } else {
                log::debug!(
                    "Ignoring {} details on {} ({} layout)",
                    details.mode(),
                    layout.id,
                    layout.details.mode()
                );
            }
        }

        let common = &mut layout.common;
        if let Some(v) = &self.extra_spaces {
            common.extra_spaces = v.clone();
        }
        if let Some(v) = &self.furniture {
            common.furniture = v.clone();
        }
        if let Some(v) = &self.facilities {
            common.facilities = v.clone();
        }
        if let Some(v) = &self.transit {
            common.transit = v.clone();
        }
    }
}
