//! Unit layouts and the ordered layout set of a listing
//!
//! A [`Layout`] is one sellable or rentable unit variant: a floor plan in a
//! new development, a room type in a hotel, a room in a shared rental. The
//! layouts of a listing live in a [`LayoutSet`], whose first entry is the
//! reference layout for common-field synchronization (see [`manager`]).

pub mod common;
pub mod manager;
pub mod patch;

pub use common::{
    CommonField, CommonFieldSnapshot, CommonFields, TransitInfo, TransitKind, TransitStop,
    COMMON_FIELDS,
};
pub use manager::{
    layout_count_from_f64, parse_layout_count, set_layout_count, update_layout,
    update_layout_with_policy, InheritState, LayoutPolicy, UpdateMeta, DEFAULT_MAX_LAYOUTS,
};
pub use patch::LayoutPatch;

use crate::area::AreaDetails;
use crate::listing::ListingMode;
use crate::pricing::{calculate_psf, Price};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identifier of a layout within its set.
///
/// Assigned once at creation and never reused, even after the layout has
/// been truncated away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutId(u64);

impl LayoutId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layout-{}", self.0)
    }
}

/// Per-layout fields shared by every listing mode. Never synchronized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitFields {
    pub category: String,
    pub sub_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    pub area: AreaDetails,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub carparks: u32,
    pub photos: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenure {
    Freehold,
    Leasehold,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleUnit {
    pub tenure: Option<Tenure>,
    pub completion_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentRoom {
    pub deposit_months: Option<f64>,
    pub min_tenancy_months: Option<u32>,
    pub available_from: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotelRoom {
    pub room_count: u32,
    pub max_guests: u32,
    pub blocked_dates: BTreeSet<NaiveDate>,
}

impl Default for HotelRoom {
    fn default() -> Self {
        Self { room_count: 1, max_guests: 2, blocked_dates: BTreeSet::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomestayUnit {
    pub max_guests: u32,
    pub min_nights: u32,
    pub blocked_dates: BTreeSet<NaiveDate>,
}

impl Default for HomestayUnit {
    fn default() -> Self {
        Self { max_guests: 2, min_nights: 1, blocked_dates: BTreeSet::new() }
    }
}

/// Mode-specific layout fields, tagged by listing mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeDetails {
    SaleUnit(SaleUnit),
    RentRoom(RentRoom),
    HotelRoom(HotelRoom),
    HomestayUnit(HomestayUnit),
}

impl ModeDetails {
    pub fn default_for(mode: ListingMode) -> Self {
        match mode {
            ListingMode::Sale => ModeDetails::SaleUnit(SaleUnit::default()),
            ListingMode::Rent => ModeDetails::RentRoom(RentRoom::default()),
            ListingMode::Hotel => ModeDetails::HotelRoom(HotelRoom::default()),
            ListingMode::Homestay => ModeDetails::HomestayUnit(HomestayUnit::default()),
        }
    }

    pub fn mode(&self) -> ListingMode {
        match self {
            ModeDetails::SaleUnit(_) => ListingMode::Sale,
            ModeDetails::RentRoom(_) => ListingMode::Rent,
            ModeDetails::HotelRoom(_) => ListingMode::Hotel,
            ModeDetails::HomestayUnit(_) => ListingMode::Homestay,
        }
    }

    /// Whether the unit can be booked or moved into on `date`
    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        match self {
            ModeDetails::SaleUnit(_) => true,
            ModeDetails::RentRoom(room) => room.available_from.map_or(true, |from| date >= from),
            ModeDetails::HotelRoom(room) => !room.blocked_dates.contains(&date),
            ModeDetails::HomestayUnit(unit) => !unit.blocked_dates.contains(&date),
        }
    }
}

/// One unit layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub id: LayoutId,
    #[serde(default)]
    pub unit: UnitFields,
    pub details: ModeDetails,
    #[serde(default)]
    pub common: CommonFields,
    /// `Some(true)` follows the reference layout, `Some(false)` keeps its
    /// own values, `None` has not been decided yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit_common: Option<bool>,
}

impl Layout {
    fn new(id: LayoutId, mode: ListingMode) -> Self {
        Self {
            id,
            unit: UnitFields::default(),
            details: ModeDetails::default_for(mode),
            common: CommonFields::default(),
            inherit_common: None,
        }
    }

    /// Price per square foot over the preferred area
    pub fn psf(&self) -> Option<String> {
        let price = self.unit.price.as_ref()?;
        calculate_psf(price, self.unit.area.preferred_square_feet())
    }
}

/// Ordered layouts of one listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSet {
    mode: ListingMode,
    layouts: Vec<Layout>,
    next_id: u64,
}

impl LayoutSet {
    pub fn new(mode: ListingMode) -> Self {
        Self { mode, layouts: Vec::new(), next_id: 1 }
    }

    pub fn mode(&self) -> ListingMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Layout> {
        self.layouts.get(index)
    }

    /// The reference layout (position 0)
    pub fn reference(&self) -> Option<&Layout> {
        self.layouts.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Layout> {
        self.layouts.iter()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Layout> {
        self.layouts.get_mut(index)
    }

    pub fn as_slice(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn position(&self, id: LayoutId) -> Option<usize> {
        self.layouts.iter().position(|l| l.id == id)
    }

    /// Attached / detached state of the layout at `index`.
    ///
    /// The reference layout always reports [`InheritState::Detached`].
    pub fn inherit_state(&self, index: usize) -> Option<InheritState> {
        let layout = self.layouts.get(index)?;
        if index == 0 || layout.inherit_common == Some(false) {
            Some(InheritState::Detached)
        } else {
            Some(InheritState::Attached)
        }
    }

    /// Append a default layout with a fresh id and return it for filling
    pub fn push_new(&mut self) -> &mut Layout {
        let layout = Layout::new(self.allocate_id(), self.mode);
        self.layouts.push(layout);
        let last = self.layouts.len() - 1;
        &mut self.layouts[last]
    }

    fn allocate_id(&mut self) -> LayoutId {
        let id = LayoutId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl<'a> IntoIterator for &'a LayoutSet {
    type Item = &'a Layout;
    type IntoIter = std::slice::Iter<'a, Layout>;

    fn into_iter(self) -> Self::IntoIter {
        self.layouts.iter()
    }
}
