//! Account email addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why an address was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is required")]
    Empty,

    #[error("email is longer than {0} characters")]
    TooLong(usize),

    #[error("email must have the form name@domain")]
    Malformed,

    #[error("email domain '{0}' has no top-level domain")]
    BareDomain(String),
}

/// An email address as typed into a login, sign-up or feedback form.
///
/// Surrounding whitespace is dropped and the address is lowercased, so the
/// same account is reached however it was typed. Whether the mailbox exists
/// is for the server to find out.
///
/// ```
/// use drovo_core::Email;
///
/// let email = Email::parse("  Asha.Rao@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "asha.rao@example.com");
///
/// assert!(Email::parse("asha@localhost").is_err());
/// assert!(Email::parse("asha rao@example.com").is_err());
/// ```
///
/// Addresses coming back from the API are deserialized unchecked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Normalize and check an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank, too long, not of the form
    /// `name@domain.tld`, or contains whitespace.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let address = raw.trim().to_lowercase();
        if address.is_empty() {
            return Err(EmailError::Empty);
        }
        if address.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong(Self::MAX_LENGTH));
        }

        let (local, domain) = address.split_once('@').ok_or(EmailError::Malformed)?;
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || address.chars().any(char::is_whitespace)
        {
            return Err(EmailError::Malformed);
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
            return Err(EmailError::BareDomain(domain.to_owned()));
        }

        Ok(Self(address))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes() {
        let email: Email = " Owner@Gokul-Dairy.IN\n".parse().unwrap();
        assert_eq!(email.as_str(), "owner@gokul-dairy.in");
        assert_eq!(email.to_string(), "owner@gokul-dairy.in");
    }

    #[test]
    fn test_accepts_common_forms() {
        for raw in ["a@b.co", "asha+orders@example.com", "ravi.k@mail.example.co.in"] {
            assert!(Email::parse(raw).is_ok(), "{raw}");
        }
    }

    #[test]
    fn test_rejects() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("asha.example.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@example.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("asha@"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a@b@example.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("asha r@example.com"), Err(EmailError::Malformed));
        assert_eq!(
            Email::parse("asha@example."),
            Err(EmailError::BareDomain("example.".to_owned()))
        );

        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(Email::parse(&long), Err(EmailError::TooLong(254)));
    }

    #[test]
    fn test_server_values_are_not_rechecked() {
        let parsed: Email = serde_json::from_str("\"Shop@Localhost\"").unwrap();
        assert_eq!(parsed.as_str(), "Shop@Localhost");
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"Shop@Localhost\"");
    }
}
