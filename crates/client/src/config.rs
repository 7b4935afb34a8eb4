//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DROVO_API_URL` - Base URL of the marketplace REST API
//!
//! ## Optional
//! - `DROVO_SESSION_FILE` - JSON file holding the persisted session
//!   (default: `.drovo-session.json`)
//! - `DROVO_MENU_CACHE_TTL_SECS` - How long shop menus are cached (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_SESSION_FILE: &str = ".drovo-session.json";
const DEFAULT_MENU_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API (always ends with `/`)
    pub api_url: Url,
    /// Where the session key-value store is persisted
    pub session_file: PathBuf,
    /// Time-to-live of cached shop menus
    pub menu_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(&get_required(&lookup, "DROVO_API_URL")?)?;
        let session_file =
            PathBuf::from(get_or_default(&lookup, "DROVO_SESSION_FILE", DEFAULT_SESSION_FILE));
        let ttl_secs = get_or_default(
            &lookup,
            "DROVO_MENU_CACHE_TTL_SECS",
            DEFAULT_MENU_CACHE_TTL_SECS,
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("DROVO_MENU_CACHE_TTL_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_url,
            session_file,
            menu_cache_ttl: Duration::from_secs(ttl_secs),
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }

    /// Configuration pointing at `api_url` with every other setting defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not a valid URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| (key == "DROVO_API_URL").then(|| api_url.to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn get_required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable with a default value.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Parse the API base URL, making sure relative joins keep its path.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("DROVO_API_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "DROVO_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
