//! Errors returned by the marketplace API client.

use thiserror::Error;

/// Message the API puts in a `401` body when the session token has expired.
pub const TOKEN_EXPIRED_MESSAGE: &str = "Token expired";

/// Errors that can occur when calling the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The session token has expired; the caller should log out.
    #[error("Session expired, please log in again")]
    TokenExpired,

    /// Missing or rejected credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The shop has to finish setup or renew its subscription first.
    #[error("{message} (continue at {path})")]
    Redirect {
        /// Frontend route the server wants the user sent to.
        path: String,
        message: String,
    },

    /// A successful response did not carry the expected payload.
    #[error("Response is missing `{0}`")]
    MissingField(&'static str),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API answered with `success: false` or an error status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ApiError {
    /// Returns `true` if this error means the session must be reset.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }

    /// Returns `true` for failures where the request never produced an API answer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
