//! Shop subscription plans.
//!
//! A shop must hold an active subscription for its menu to be listed. The
//! gateway order amount is requested in paise.

use serde::{Deserialize, Serialize};

use crate::types::Price;

/// A subscription plan a shop owner can buy or renew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    #[default]
    FifteenDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
}

impl SubscriptionPlan {
    /// All plans, cheapest first.
    pub const ALL: [Self; 4] = [
        Self::FifteenDays,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
    ];

    /// Price in whole rupees.
    #[must_use]
    pub const fn rupees(&self) -> i64 {
        match self {
            Self::FifteenDays => 99,
            Self::OneMonth => 149,
            Self::ThreeMonths => 299,
            Self::SixMonths => 599,
        }
    }

    #[must_use]
    pub fn price(&self) -> Price {
        Price::from_rupees(self.rupees())
    }

    /// Human readable duration.
    #[must_use]
    pub const fn duration(&self) -> &'static str {
        match self {
            Self::FifteenDays => "15 Days",
            Self::OneMonth => "1 Month",
            Self::ThreeMonths => "3 Months",
            Self::SixMonths => "6 Months",
        }
    }

    /// Plan identifier the API stores on the shop (the price as a string).
    #[must_use]
    pub fn code(&self) -> String {
        self.rupees().to_string()
    }

    /// Look a plan up by its price in rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|plan| plan.rupees() == rupees)
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.price(), self.duration())
    }
}

impl std::str::FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_start_matches('₹')
            .parse::<i64>()
            .ok()
            .and_then(Self::from_rupees)
            .ok_or_else(|| format!("unknown subscription plan: {s} (expected 99, 149, 299 or 599)"))
    }
}
