//! Area normalization
//!
//! Every area entered on a listing form is a `(value, unit)` pair. Price per
//! area and search filters work on one canonical unit, square feet.

use serde::{Deserialize, Serialize};
use std::fmt;

const SQFT_PER_SQM: f64 = 10.7639;
const SQFT_PER_ACRE: f64 = 43_560.0;
const SQFT_PER_HECTARE: f64 = 107_639.0;

/// Units recognized on area inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    #[default]
    SquareFeet,
    SquareMeters,
    Acres,
    Hectares,
}

impl AreaUnit {
    /// Parse a free-form unit label.
    ///
    /// Matching is a case-insensitive substring test, so "Square Meter",
    /// "sq. metres" and "sqm" all resolve to [`AreaUnit::SquareMeters`].
    /// Anything unrecognized, including an empty label, is square feet.
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.contains("hectare") {
            AreaUnit::Hectares
        } else if label.contains("acre") {
            AreaUnit::Acres
        } else if label.contains("meter")
            || label.contains("metre")
            || label.contains("sqm")
            || label.contains("m2")
            || label.contains("m²")
        {
            AreaUnit::SquareMeters
        } else {
            AreaUnit::SquareFeet
        }
    }

    /// Multiplier from this unit to square feet
    pub fn square_feet_factor(self) -> f64 {
        match self {
            AreaUnit::SquareFeet => 1.0,
            AreaUnit::SquareMeters => SQFT_PER_SQM,
            AreaUnit::Acres => SQFT_PER_ACRE,
            AreaUnit::Hectares => SQFT_PER_HECTARE,
        }
    }

    /// Short label used in CLI output
    pub fn label(self) -> &'static str {
        match self {
            AreaUnit::SquareFeet => "sqft",
            AreaUnit::SquareMeters => "sqm",
            AreaUnit::Acres => "acre",
            AreaUnit::Hectares => "hectare",
        }
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw numeric input as typed into a form field
#[derive(Debug, Clone, PartialEq)]
pub enum AreaValue {
    Number(f64),
    Text(String),
}

impl AreaValue {
    /// The value as a positive finite number, if it is one
    pub fn positive(&self) -> Option<f64> {
        let value = match self {
            AreaValue::Number(n) => *n,
            AreaValue::Text(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

impl From<f64> for AreaValue {
    fn from(value: f64) -> Self {
        AreaValue::Number(value)
    }
}

impl From<i32> for AreaValue {
    fn from(value: i32) -> Self {
        AreaValue::Number(f64::from(value))
    }
}

impl From<u32> for AreaValue {
    fn from(value: u32) -> Self {
        AreaValue::Number(f64::from(value))
    }
}

impl From<&str> for AreaValue {
    fn from(value: &str) -> Self {
        AreaValue::Text(value.to_string())
    }
}

impl From<String> for AreaValue {
    fn from(value: String) -> Self {
        AreaValue::Text(value)
    }
}

/// Convert `(value, unit label)` into square feet.
///
/// Invalid, non-finite or non-positive values yield `0.0`.
pub fn convert_to_square_feet(value: impl Into<AreaValue>, unit: &str) -> f64 {
    match value.into().positive() {
        Some(v) => v * AreaUnit::parse(unit).square_feet_factor(),
        None => 0.0,
    }
}

/// One measurement on a listing (built-up or land)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaMeasurement {
    pub value: f64,
    #[serde(default)]
    pub unit: AreaUnit,
}

impl AreaMeasurement {
    pub fn new(value: f64, unit: AreaUnit) -> Self {
        Self { value, unit }
    }

    pub fn square_feet(&self) -> f64 {
        match AreaValue::Number(self.value).positive() {
            Some(v) => v * self.unit.square_feet_factor(),
            None => 0.0,
        }
    }
}

/// All area measurements declared for a layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_up: Option<AreaMeasurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land: Option<AreaMeasurement>,
}

impl AreaDetails {
    pub fn built_up(value: f64, unit: AreaUnit) -> Self {
        Self { built_up: Some(AreaMeasurement::new(value, unit)), land: None }
    }

    pub fn land(value: f64, unit: AreaUnit) -> Self {
        Self { built_up: None, land: Some(AreaMeasurement::new(value, unit)) }
    }

    /// Sum of every declared measurement, in square feet
    pub fn total_square_feet(&self) -> f64 {
        self.built_up.map_or(0.0, |m| m.square_feet()) + self.land.map_or(0.0, |m| m.square_feet())
    }

    /// Built-up area when declared and positive, otherwise land area
    pub fn preferred_square_feet(&self) -> f64 {
        let built_up = self.built_up.map_or(0.0, |m| m.square_feet());
        if built_up > 0.0 {
            built_up
        } else {
            self.land.map_or(0.0, |m| m.square_feet())
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_square_feet() <= 0.0
    }
}
