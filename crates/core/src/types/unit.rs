//! Units of measure for catalog items and how quantities are rendered.
//!
//! Every catalog item is sold in packages of a base quantity (for example
//! 500 grams of paneer). Cart quantities count packages, so the amount of
//! product is `packages × base quantity` in the item's unit.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit of measure as stored by the API.
///
/// The spelling the shop entered is kept as-is and sent back unchanged;
/// [`Unit::kind`] classifies it for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unit(String);

/// How a [`Unit`] is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Grams,
    Kg,
    Ml,
    Liter,
    /// Counted units (`item`, `dozen`, `packet`, ...), shown verbatim.
    Other,
}

impl Unit {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify the unit, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        match self.0.trim().to_lowercase().as_str() {
            "grams" | "gram" | "g" => UnitKind::Grams,
            "kg" => UnitKind::Kg,
            "ml" => UnitKind::Ml,
            "liter" | "litre" | "l" => UnitKind::Liter,
            _ => UnitKind::Other,
        }
    }

    /// Render a total amount in this unit for the cart view.
    ///
    /// Grams and millilitres are split into whole kilograms/litres and the
    /// remainder: `1250 grams` renders as `1 kg 250 g`.
    #[must_use]
    pub fn display_total(&self, total: u64) -> String {
        match self.kind() {
            UnitKind::Grams => split_metric(total, "kg", "g"),
            UnitKind::Ml => split_metric(total, "l", "ml"),
            UnitKind::Kg => format!("{total} kg"),
            UnitKind::Liter => format!("{total} l"),
            UnitKind::Other => format!("{total} {}", self.0.trim()),
        }
    }

    /// Render a total amount for an order line sent to the shop.
    ///
    /// Grams and millilitres at or above 1000 are converted to kilograms and
    /// litres with two decimals; a whole result drops the decimals. Anything
    /// else keeps the shop's own spelling of the unit.
    #[must_use]
    pub fn order_line_quantity(&self, total: u64) -> String {
        let scaled = match self.kind() {
            UnitKind::Grams if total >= 1000 => Some("kg"),
            UnitKind::Ml if total >= 1000 => Some("liter"),
            _ => None,
        };

        match scaled {
            Some(unit) => {
                let value = (Decimal::from(total) / Decimal::ONE_THOUSAND).round_dp(2);
                if value.fract().is_zero() {
                    format!("{} {unit}", value.trunc())
                } else {
                    format!("{value:.2} {unit}")
                }
            }
            None => format!("{total} {}", self.0.trim()),
        }
    }
}

fn split_metric(total: u64, major: &str, minor: &str) -> String {
    let whole = total / 1000;
    let rest = total % 1000;
    match (whole, rest) {
        (0, rest) => format!("{rest} {minor}"),
        (whole, 0) => format!("{whole} {major}"),
        (whole, rest) => format!("{whole} {major} {rest} {minor}"),
    }
}

impl From<String> for Unit {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Unit {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.0
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
