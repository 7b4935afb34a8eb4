//! Marketplace REST API client.
//!
//! Uses `reqwest` 0.13 for HTTP. Every response is wrapped in the envelope
//! `{success, data?, message?, redirect?}`; some endpoints return their payload
//! at top level instead of under `data`. Shop listings and menus are cached
//! with `moka`.

mod auth;
mod cache;
mod cart;
mod food;
mod orders;
mod payments;
mod shops;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result, TOKEN_EXPIRED_MESSAGE};

pub use cache::{CacheKey, CacheValue};
pub use cart::CartAction;

/// Header carrying the session token on authenticated calls.
pub const TOKEN_HEADER: &str = "token";

/// How a request authenticates.
#[derive(Clone, Copy)]
pub(crate) enum Auth<'a> {
    Anonymous,
    /// `token: <token>` header.
    Token(&'a SecretString),
    /// `Authorization: Bearer <token>`, used by subscription renewal.
    Bearer(&'a SecretString),
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the marketplace REST API.
///
/// Cheap to clone; clones share the connection pool and the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url().as_str())
            .finish_non_exhaustive()
    }
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(config.menu_cache_ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.clone(),
                cache,
            }),
        }
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Public URL of an uploaded image.
    ///
    /// # Errors
    ///
    /// Returns an error if `file_name` does not form a valid URL.
    pub fn image_url(&self, file_name: &str) -> Result<Url> {
        Ok(self.inner.base_url.join("images/")?.join(file_name)?)
    }

    pub(crate) fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }

    fn request(&self, method: Method, path: &str, auth: Auth<'_>) -> Result<RequestBuilder> {
        let url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        let builder = self.inner.client.request(method, url);
        Ok(match auth {
            Auth::Anonymous => builder,
            Auth::Token(token) => builder.header(TOKEN_HEADER, token.expose_secret()),
            Auth::Bearer(token) => builder.bearer_auth(token.expose_secret()),
        })
    }

    pub(crate) async fn get(&self, path: &str, auth: Auth<'_>) -> Result<Value> {
        self.send(self.request(Method::GET, path, auth)?).await
    }

    pub(crate) async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        auth: Auth<'_>,
        body: &B,
    ) -> Result<Value> {
        self.send(self.request(Method::POST, path, auth)?.json(body))
            .await
    }

    pub(crate) async fn post_multipart(
        &self,
        path: &str,
        auth: Auth<'_>,
        form: reqwest::multipart::Form,
    ) -> Result<Value> {
        self.send(self.request(Method::POST, path, auth)?.multipart(form))
            .await
    }

    /// Send a request and check the envelope.
    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        let path = response.url().path().to_string();

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(body) => body,
                Err(e) if status.is_success() => {
                    error!(
                        %path,
                        error = %e,
                        body = %text.chars().take(500).collect::<String>(),
                        "Failed to parse API response"
                    );
                    return Err(ApiError::Parse(e));
                }
                Err(_) => serde_json::json!({
                    "message": text.chars().take(200).collect::<String>()
                }),
            }
        };

        if let Err(e) = classify(status, &body) {
            match &e {
                ApiError::TokenExpired => warn!(%path, "Session token expired"),
                ApiError::Redirect { path: to, .. } => {
                    debug!(%path, redirect = %to, "API asked for a redirect");
                }
                _ => error!(%path, %status, error = %e, "API call failed"),
            }
            return Err(e);
        }

        debug!(%path, %status, "API call succeeded");
        Ok(body)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Map an API response to an error, or `Ok` if it succeeded.
///
/// A `401` whose message is exactly `Token expired` is the server's signal
/// that the session must be reset.
pub(crate) fn classify(status: StatusCode, body: &Value) -> Result<()> {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if status == StatusCode::UNAUTHORIZED {
        if message == TOKEN_EXPIRED_MESSAGE {
            return Err(ApiError::TokenExpired);
        }
        return Err(ApiError::Unauthorized(if message.is_empty() {
            "not authorized".to_string()
        } else {
            message
        }));
    }

    let rejected = body.get("success").and_then(Value::as_bool) == Some(false);
    if status.is_success() && !rejected {
        return Ok(());
    }

    if let Some(path) = body.get("redirect").and_then(Value::as_str) {
        return Err(ApiError::Redirect {
            path: path.to_string(),
            message: if message.is_empty() {
                "Please complete your setup or renew your subscription.".to_string()
            } else {
                message
            },
        });
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(message));
    }

    Err(ApiError::Api {
        status: status.as_u16(),
        message: if message.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            message
        },
    })
}

/// Take `key` out of a response body and deserialize it.
pub(crate) fn field<T: DeserializeOwned>(body: &mut Value, key: &'static str) -> Result<T> {
    let value = body
        .get_mut(key)
        .map(Value::take)
        .filter(|v| !v.is_null())
        .ok_or(ApiError::MissingField(key))?;
    Ok(serde_json::from_value(value)?)
}

/// Take the `data` payload out of a response body.
pub(crate) fn data<T: DeserializeOwned>(body: &mut Value) -> Result<T> {
    field(body, "data")
}

/// The `message` of a response, if any.
pub(crate) fn message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
