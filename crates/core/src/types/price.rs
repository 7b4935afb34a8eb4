//! Type-safe rupee amounts using decimal arithmetic.
//!
//! The marketplace trades in Indian rupees only, so a [`Price`] carries no
//! currency code. Amounts travel over the wire as plain JSON numbers.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A rupee amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Currency symbol used when rendering amounts.
    pub const SYMBOL: &'static str = "₹";

    /// Create a price from a decimal rupee amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Create a price from paise (1/100 rupee).
    #[must_use]
    pub fn from_paise(paise: i64) -> Self {
        Self(Decimal::new(paise, 2))
    }

    /// The decimal rupee amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount in paise, as the payment gateway expects it.
    #[must_use]
    pub fn to_paise(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).round()
    }

    /// Returns `true` if the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::SYMBOL, self.0.normalize())
    }
}

/// Error parsing a price.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid price: {0}")]
pub struct PriceError(String);

impl std::str::FromStr for Price {
    type Err = PriceError;

    /// Parse `"45"`, `"12.50"` or `"₹45"`; negative amounts are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let digits = raw.strip_prefix(Self::SYMBOL).unwrap_or(raw).trim();
        let amount: Decimal = digits.parse().map_err(|_| PriceError(raw.to_string()))?;
        if amount.is_sign_negative() {
            return Err(PriceError(raw.to_string()));
        }
        Ok(Self(amount))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_drops_trailing_zeros() {
        assert_eq!(Price::from_rupees(55).to_string(), "₹55");
        assert_eq!(Price::new(Decimal::new(1250, 2)).to_string(), "₹12.5");
    }

    #[test]
    fn test_parse() {
        assert_eq!("45".parse::<Price>().unwrap(), Price::from_rupees(45));
        assert_eq!("₹12.50".parse::<Price>().unwrap(), Price::from_paise(1250));
        assert!("-3".parse::<Price>().is_err());
        assert!("free".parse::<Price>().is_err());
    }

    #[test]
    fn test_multiply_by_quantity() {
        assert_eq!(Price::from_rupees(20) * 3, Price::from_rupees(60));
    }

    #[test]
    fn test_paise_conversion() {
        assert_eq!(Price::from_rupees(99).to_paise(), Decimal::from(9900));
        assert_eq!(Price::from_paise(14_900), Price::from_rupees(149));
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("20").unwrap();
        assert_eq!(price, Price::from_rupees(20));

        let price: Price = serde_json::from_str("12.5").unwrap();
        assert_eq!(price, Price::new(Decimal::new(125, 1)));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_rupees(40), Price::from_rupees(15)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_rupees(55));
    }
}
