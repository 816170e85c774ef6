//! Price values and price-per-square-foot rendering

use serde::{Deserialize, Serialize};
use std::fmt;

/// Asking price of a layout: one figure or a `{min, max}` range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Single(f64),
    Range { min: f64, max: f64 },
}

impl Price {
    pub fn range(min: f64, max: f64) -> Self {
        Price::Range { min, max }
    }

    /// Whether any end of the price is a positive figure
    pub fn is_positive(&self) -> bool {
        self.lowest().is_some()
    }

    /// Lowest positive figure, used for sorting and filtering
    pub fn lowest(&self) -> Option<f64> {
        match *self {
            Price::Single(p) => positive(p),
            Price::Range { min, max } => match (positive(min), positive(max)) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        }
    }

    /// Highest positive figure
    pub fn highest(&self) -> Option<f64> {
        match *self {
            Price::Single(p) => positive(p),
            Price::Range { min, max } => match (positive(min), positive(max)) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            },
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Single(p) => write!(f, "{:.2}", p),
            Price::Range { min, max } => write!(f, "{:.2} ~ {:.2}", min, max),
        }
    }
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Render price per square foot.
///
/// Returns `None` when the area is not positive or no end of the price is
/// positive. Ranges render as `"low ~ high"`, each end computed on its own.
pub fn calculate_psf(price: &Price, area_sqft: f64) -> Option<String> {
    let area = positive(area_sqft)?;
    match *price {
        Price::Single(p) => positive(p).map(|p| format!("{:.2}", p / area)),
        Price::Range { min, max } => {
            if positive(min).is_none() && positive(max).is_none() {
                return None;
            }
            let low = positive(min).map_or(0.0, |v| v / area);
            let high = positive(max).map_or(0.0, |v| v / area);
            Some(format!("{:.2} ~ {:.2}", low, high))
        }
    }
}
