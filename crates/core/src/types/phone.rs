//! Indian phone numbers.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static TEN_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // literal pattern
    Regex::new(r"^[0-9]{10}$").unwrap()
});

static MOBILE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // literal pattern
    Regex::new(r"^[789]\d{9}$").unwrap()
});

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// Not exactly ten ASCII digits.
    #[error("phone number must be exactly 10 digits")]
    NotTenDigits,
    /// Ten digits, but not a mobile number.
    #[error("phone number must be a mobile number starting with 7, 8 or 9")]
    NotMobile,
}

/// A ten digit phone number without country code.
///
/// Shop registration accepts any ten digits. Delivery addresses must carry a
/// mobile number so the rider can call ahead, see [`Phone::parse_mobile`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse any ten digit number.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::NotTenDigits`] if the input is not ten digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if !TEN_DIGITS.is_match(s) {
            return Err(PhoneError::NotTenDigits);
        }
        Ok(Self(s.to_owned()))
    }

    /// Parse a mobile number (ten digits, leading 7, 8 or 9).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not ten digits or not a mobile number.
    pub fn parse_mobile(s: &str) -> Result<Self, PhoneError> {
        let phone = Self::parse(s)?;
        if !MOBILE.is_match(&phone.0) {
            return Err(PhoneError::NotMobile);
        }
        Ok(phone)
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
