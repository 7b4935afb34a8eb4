//! Drovo client library.
//!
//! Talks to the marketplace REST API and keeps the state of one shopping
//! session:
//! - [`api`] - typed calls for shops, menus, cart mirroring, orders, payments
//! - [`session`] - persisted token and account type
//! - [`mirror`] - background queue replaying cart changes on the server
//! - [`store`] - the owned [`Store`] tying cart, active shop and session together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod mirror;
pub mod session;
pub mod store;

pub use api::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, Result};
pub use session::{FileStore, MemoryStore, Session, SessionError, SessionStore};
pub use store::{GoogleLoginOutcome, Store, StoreError};
