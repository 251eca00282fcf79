//! Value objects: quantities and classifications with their own invariants.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why a raw value could not become a value object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("surface area must be greater than zero, got {0}")]
    NonPositiveArea(Decimal),

    #[error("humidity level must be between 0 and 100, got {0}")]
    HumidityOutOfRange(i32),

    #[error("unknown plant type {0:?}, expected Vegetable, Fruit or Flower")]
    UnknownPlantType(String),
}

/// A strictly positive surface area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct SurfaceArea(Decimal);

impl SurfaceArea {
    /// # Errors
    ///
    /// Returns [`ValueError::NonPositiveArea`] when `value <= 0`.
    pub fn new(value: Decimal) -> Result<Self, ValueError> {
        if value <= Decimal::ZERO {
            return Err(ValueError::NonPositiveArea(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for SurfaceArea {
    type Error = ValueError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SurfaceArea> for Decimal {
    fn from(area: SurfaceArea) -> Self {
        area.0
    }
}

impl fmt::Display for SurfaceArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Relative humidity percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct HumidityLevel(u8);

impl HumidityLevel {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 100;

    /// # Errors
    ///
    /// Returns [`ValueError::HumidityOutOfRange`] outside `[0, 100]`.
    pub fn new(value: i32) -> Result<Self, ValueError> {
        u8::try_from(value)
            .ok()
            .filter(|v| i32::from(*v) <= Self::MAX)
            .map(Self)
            .ok_or(ValueError::HumidityOutOfRange(value))
    }

    #[must_use]
    pub fn value(self) -> i32 {
        i32::from(self.0)
    }
}

impl TryFrom<i32> for HumidityLevel {
    type Error = ValueError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HumidityLevel> for i32 {
    fn from(level: HumidityLevel) -> Self {
        level.value()
    }
}

/// Botanical classification of a plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlantType {
    Vegetable,
    Fruit,
    Flower,
}

impl PlantType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vegetable => "Vegetable",
            Self::Fruit => "Fruit",
            Self::Flower => "Flower",
        }
    }
}

impl fmt::Display for PlantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlantType {
    type Err = ValueError;

    /// Case-insensitive parse of the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Vegetable, Self::Fruit, Self::Flower]
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValueError::UnknownPlantType(s.to_string()))
    }
}
