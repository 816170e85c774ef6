//! Buyer-side listing search

use crate::listing::{GeoPoint, Listing, ListingMode, ListingStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Visible map rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl MapBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self { south, west, north, east }
    }

    /// Whether `point` lies inside; handles boxes crossing the antimeridian
    pub fn contains(&self, point: GeoPoint) -> bool {
        let lat_ok = point.lat >= self.south && point.lat <= self.north;
        let lng_ok = if self.west <= self.east {
            point.lng >= self.west && point.lng <= self.east
        } else {
            point.lng >= self.west || point.lng <= self.east
        };
        lat_ok && lng_ok
    }
}

/// Search filters; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingFilter {
    pub mode: Option<ListingMode>,
    pub status: Option<ListingStatus>,
    pub bounds: Option<MapBounds>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<u32>,
    pub category: Option<String>,
    pub owner_id: Option<String>,
    /// At least one layout can be booked or moved into on this date
    pub available_on: Option<NaiveDate>,
    /// Case-insensitive match on title, address and layout descriptions
    pub text: Option<String>,
}

impl ListingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: ListingMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn within(mut self, bounds: MapBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn price_between(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn min_bedrooms(mut self, bedrooms: u32) -> Self {
        self.min_bedrooms = Some(bedrooms);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if self.mode.is_some_and(|m| m != listing.mode) {
            return false;
        }
        if self.status.is_some_and(|s| s != listing.status) {
            return false;
        }
        if let Some(owner) = &self.owner_id {
            if &listing.owner_id != owner {
                return false;
            }
        }
        if let Some(bounds) = &self.bounds {
            match listing.location {
                Some(point) if bounds.contains(point) => {}
                _ => return false,
            }
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            // Unpriced listings never match a price filter
            let Some(lowest) = listing.lowest_price() else {
                return false;
            };
            if self.min_price.is_some_and(|min| lowest < min) {
                return false;
            }
            if self.max_price.is_some_and(|max| lowest > max) {
                return false;
            }
        }
        if self.min_bedrooms.is_some_and(|b| listing.max_bedrooms() < b) {
            return false;
        }
        if let Some(category) = &self.category {
            if !listing.categories().iter().any(|c| c.eq_ignore_ascii_case(category)) {
                return false;
            }
        }
        if let Some(date) = self.available_on {
            if !listing.layouts.iter().any(|l| l.details.is_available_on(date)) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.trim().to_lowercase();
            if !needle.is_empty() && !haystack(listing).contains(&needle) {
                return false;
            }
        }
        true
    }

    /// Filter and order newest first
    pub fn apply(&self, listings: impl IntoIterator<Item = Listing>) -> Vec<Listing> {
        let mut out: Vec<Listing> = listings.into_iter().filter(|l| self.matches(l)).collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        out
    }
}

fn haystack(listing: &Listing) -> String {
    let mut text = format!("{} {}", listing.title, listing.address);
    if let Some(display) = &listing.display_address {
        text.push(' ');
        text.push_str(display);
    }
    for layout in &listing.layouts {
        text.push(' ');
        text.push_str(&layout.unit.description);
    }
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{set_layout_count, update_layout, LayoutPatch, LayoutPolicy, UpdateMeta};
    use crate::pricing::Price;
    use chrono::Duration;

    fn listing(mode: ListingMode, title: &str, price: f64, bedrooms: u32, at: GeoPoint) -> Listing {
        let mut l = Listing::new(mode, "owner", title);
        l.location = Some(at);
        l.layouts = set_layout_count(&l.layouts, 1, &LayoutPolicy::default());
        let patch = LayoutPatch {
            price: Some(Price::Single(price)),
            bedrooms: Some(bedrooms),
            ..Default::default()
        }
        .with_category("Condo");
        l.layouts = update_layout(&l.layouts, 0, &patch, UpdateMeta::default());
        l.status = l.compute_status();
        l
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = MapBounds::new(1.0, 103.0, 2.0, 104.0);
        assert!(bounds.contains(GeoPoint::new(1.3, 103.8)));
        assert!(!bounds.contains(GeoPoint::new(3.1, 101.6)));

        let across = MapBounds::new(-20.0, 170.0, 0.0, -170.0);
        assert!(across.contains(GeoPoint::new(-10.0, 179.0)));
        assert!(across.contains(GeoPoint::new(-10.0, -175.0)));
        assert!(!across.contains(GeoPoint::new(-10.0, 0.0)));
    }

    #[test]
    fn test_filter_combinations() {
        let a = listing(ListingMode::Sale, "Marina Loft", 900_000.0, 2, GeoPoint::new(1.28, 103.85));
        let b = listing(ListingMode::Rent, "Hillside Room", 1_200.0, 1, GeoPoint::new(3.15, 101.7));

        assert!(ListingFilter::new().matches(&a));
        assert!(ListingFilter::new().mode(ListingMode::Rent).matches(&b));
        assert!(!ListingFilter::new().mode(ListingMode::Rent).matches(&a));
        assert!(ListingFilter::new().price_between(Some(500_000.0), None).matches(&a));
        assert!(!ListingFilter::new().price_between(None, Some(1_000.0)).matches(&b));
        assert!(!ListingFilter::new().min_bedrooms(2).matches(&b));
        assert!(ListingFilter::new().text("marina").matches(&a));
        assert!(!ListingFilter::new().within(MapBounds::new(1.0, 103.0, 2.0, 104.0)).matches(&b));

        let category = ListingFilter { category: Some("condo".into()), ..Default::default() };
        assert!(category.matches(&a));
    }

    #[test]
    fn test_available_on() {
        let day = NaiveDate::from_ymd_opt(2026, 12, 24).unwrap();
        let mut l = listing(ListingMode::Hotel, "Inn", 200.0, 1, GeoPoint::new(0.0, 0.0));
        let filter = ListingFilter { available_on: Some(day), ..Default::default() };
        assert!(filter.matches(&l));

        let mut room = crate::layout::HotelRoom::default();
        room.blocked_dates.insert(day);
        let patch = LayoutPatch {
            details: Some(crate::layout::ModeDetails::HotelRoom(room)),
            ..Default::default()
        };
        l.layouts = update_layout(&l.layouts, 0, &patch, UpdateMeta::default());
        assert!(!filter.matches(&l));
    }

    #[test]
    fn test_unpriced_listing_fails_price_filter() {
        let l = Listing::new(ListingMode::Sale, "o", "Plot");
        assert!(!ListingFilter::new().price_between(Some(1.0), None).matches(&l));
    }

    #[test]
    fn test_apply_sorts_newest_first() {
        let mut old = listing(ListingMode::Sale, "Old", 1.0, 1, GeoPoint::new(0.0, 0.0));
        old.updated_at -= Duration::days(3);
        let new = listing(ListingMode::Sale, "New", 1.0, 1, GeoPoint::new(0.0, 0.0));

        let out = ListingFilter::new().apply(vec![old, new]);
        assert_eq!(out[0].title, "New");
        assert_eq!(out[1].title, "Old");
    }
}
