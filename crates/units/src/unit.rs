//! Measurement units and their dimensions.

use core::convert::Infallible;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Physical dimension a unit measures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Weight,
    Volume,
    Count,
    /// Free-form units ("bunch", "case") that only convert through overrides.
    Custom,
}

/// A measurement unit.
///
/// Standard units carry a fixed factor to their dimension's base unit
/// (gram, millilitre, each). Anything unrecognised is kept as
/// [`Unit::Custom`] with a normalised (trimmed, lowercase) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    Milligram,
    Gram,
    Kilogram,
    Ounce,
    Pound,
    Milliliter,
    Liter,
    Teaspoon,
    Tablespoon,
    FluidOunce,
    Cup,
    Pint,
    Quart,
    Gallon,
    Each,
    Piece,
    Dozen,
    Custom(String),
}

const WEIGHT_UNITS: &[Unit] = &[
    Unit::Milligram,
    Unit::Gram,
    Unit::Kilogram,
    Unit::Ounce,
    Unit::Pound,
];

const VOLUME_UNITS: &[Unit] = &[
    Unit::Milliliter,
    Unit::Liter,
    Unit::Teaspoon,
    Unit::Tablespoon,
    Unit::FluidOunce,
    Unit::Cup,
    Unit::Pint,
    Unit::Quart,
    Unit::Gallon,
];

const COUNT_UNITS: &[Unit] = &[Unit::Each, Unit::Piece, Unit::Dozen];

impl Unit {
    /// Parse a unit name. Never fails: unknown names become [`Unit::Custom`].
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        let compact: String = normalized
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '.' && *c != '-')
            .collect();

        match compact.as_str() {
            "mg" | "milligram" | "milligrams" => Unit::Milligram,
            "g" | "gr" | "gram" | "grams" => Unit::Gram,
            "kg" | "kilo" | "kilos" | "kilogram" | "kilograms" => Unit::Kilogram,
            "oz" | "ounce" | "ounces" => Unit::Ounce,
            "lb" | "lbs" | "pound" | "pounds" => Unit::Pound,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Unit::Milliliter,
            "l" | "liter" | "liters" | "litre" | "litres" => Unit::Liter,
            "tsp" | "teaspoon" | "teaspoons" => Unit::Teaspoon,
            "tbsp" | "tbs" | "tablespoon" | "tablespoons" => Unit::Tablespoon,
            "floz" | "fluidounce" | "fluidounces" => Unit::FluidOunce,
            "cup" | "cups" | "c" => Unit::Cup,
            "pt" | "pint" | "pints" => Unit::Pint,
            "qt" | "quart" | "quarts" => Unit::Quart,
            "gal" | "gallon" | "gallons" => Unit::Gallon,
            "each" | "ea" => Unit::Each,
            "pc" | "pcs" | "piece" | "pieces" => Unit::Piece,
            "dz" | "doz" | "dozen" => Unit::Dozen,
            _ => Unit::Custom(normalized),
        }
    }

    /// Canonical short symbol.
    pub fn symbol(&self) -> &str {
        match self {
            Unit::Milligram => "mg",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Ounce => "oz",
            Unit::Pound => "lb",
            Unit::Milliliter => "ml",
            Unit::Liter => "L",
            Unit::Teaspoon => "tsp",
            Unit::Tablespoon => "tbsp",
            Unit::FluidOunce => "fl oz",
            Unit::Cup => "cup",
            Unit::Pint => "pt",
            Unit::Quart => "qt",
            Unit::Gallon => "gal",
            Unit::Each => "each",
            Unit::Piece => "pc",
            Unit::Dozen => "dozen",
            Unit::Custom(name) => name,
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Milligram | Unit::Gram | Unit::Kilogram | Unit::Ounce | Unit::Pound => {
                Dimension::Weight
            }
            Unit::Milliliter
            | Unit::Liter
            | Unit::Teaspoon
            | Unit::Tablespoon
            | Unit::FluidOunce
            | Unit::Cup
            | Unit::Pint
            | Unit::Quart
            | Unit::Gallon => Dimension::Volume,
            Unit::Each | Unit::Piece | Unit::Dozen => Dimension::Count,
            Unit::Custom(_) => Dimension::Custom,
        }
    }

    /// Multiplier to the dimension's base unit (g, ml, each).
    ///
    /// US customary factors are exact binary multiples of one another
    /// (16 oz per lb, 128 fl oz per gal) so those ratios stay exact in `f64`.
    pub fn base_factor(&self) -> Option<f64> {
        let factor = match self {
            Unit::Milligram => 0.001,
            Unit::Gram => 1.0,
            Unit::Kilogram => 1000.0,
            Unit::Ounce => 28.349_523_125,
            Unit::Pound => 453.592_37,
            Unit::Milliliter => 1.0,
            Unit::Liter => 1000.0,
            Unit::Teaspoon => 4.928_921_593_75,
            Unit::Tablespoon => 14.786_764_781_25,
            Unit::FluidOunce => 29.573_529_562_5,
            Unit::Cup => 236.588_236_5,
            Unit::Pint => 473.176_473,
            Unit::Quart => 946.352_946,
            Unit::Gallon => 3_785.411_784,
            Unit::Each | Unit::Piece => 1.0,
            Unit::Dozen => 12.0,
            Unit::Custom(_) => return None,
        };
        Some(factor)
    }

    /// Whether this is a single-piece count unit (`pc` / `each` / `piece`).
    pub fn is_piece(&self) -> bool {
        matches!(self, Unit::Each | Unit::Piece)
    }
}

impl FromStr for Unit {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Unit::parse(s))
    }
}

impl From<String> for Unit {
    fn from(value: String) -> Self {
        Unit::parse(&value)
    }
}

impl From<&str> for Unit {
    fn from(value: &str) -> Self {
        Unit::parse(value)
    }
}

impl From<Unit> for String {
    fn from(value: Unit) -> Self {
        value.symbol().to_string()
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}

pub fn dimension_of(unit: &Unit) -> Dimension {
    unit.dimension()
}

/// Standard units of a dimension, in display order. Custom has none.
pub fn units_in(dimension: Dimension) -> &'static [Unit] {
    match dimension {
        Dimension::Weight => WEIGHT_UNITS,
        Dimension::Volume => VOLUME_UNITS,
        Dimension::Count => COUNT_UNITS,
        Dimension::Custom => &[],
    }
}

/// Units a UI may offer as conversion targets for `unit`, including itself.
pub fn compatible_units(unit: &Unit) -> Vec<Unit> {
    match unit.dimension() {
        Dimension::Custom => vec![unit.clone()],
        dimension => units_in(dimension).to_vec(),
    }
}
