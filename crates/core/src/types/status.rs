//! Status enums shared with the marketplace API.

use serde::{Deserialize, Serialize};

/// Delivery progress of an order, in the order a shop moves through it.
///
/// The API stores these as human readable strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Food Processing")]
    FoodProcessing,
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
}

impl OrderStatus {
    /// All stages, first to last.
    pub const STAGES: [Self; 3] = [Self::FoodProcessing, Self::OutForDelivery, Self::Delivered];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FoodProcessing => "Food Processing",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
        }
    }

    /// Zero-based position in [`Self::STAGES`].
    #[must_use]
    pub const fn stage_index(&self) -> usize {
        match self {
            Self::FoodProcessing => 0,
            Self::OutForDelivery => 1,
            Self::Delivered => 2,
        }
    }

    /// The stage after this one, if any.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::FoodProcessing => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::STAGES
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Kind of account a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// A customer (also the guest default).
    #[default]
    User,
    /// A shop owner.
    Shop,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Shop => write!(f, "shop"),
        }
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "shop" => Ok(Self::Shop),
            _ => Err(format!("invalid user type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"Out for delivery\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"Food Processing\"").unwrap();
        assert_eq!(parsed, OrderStatus::FoodProcessing);
    }

    #[test]
    fn test_order_status_progression() {
        assert_eq!(OrderStatus::FoodProcessing.next(), Some(OrderStatus::OutForDelivery));
        assert_eq!(OrderStatus::Delivered.next(), None);
        assert_eq!(OrderStatus::Delivered.stage_index(), 2);
    }

    #[test]
    fn test_order_status_from_str_is_case_insensitive() {
        assert_eq!("delivered".parse::<OrderStatus>(), Ok(OrderStatus::Delivered));
        assert!("Cancelled".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_user_type_roundtrip() {
        assert_eq!("shop".parse::<UserType>(), Ok(UserType::Shop));
        assert_eq!(UserType::User.to_string(), "user");
        assert!("admin".parse::<UserType>().is_err());
    }
}
