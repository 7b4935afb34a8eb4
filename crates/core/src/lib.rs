//! Drovo Core - Shared types and cart state.
//!
//! This crate provides the pieces of the Drovo marketplace client that do not
//! talk to the network:
//! - `client` - REST client, session storage and the owned `Store`
//! - `cli` - the `drovo` command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no async. Everything here is synchronous and cannot fail except
//! for input validation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, phone numbers, units, statuses
//! - [`catalog`] - A shop's menu as returned by the API
//! - [`cart`] - Per-shop cart quantities and totals
//! - [`checkout`] - Minimum order, delivery fees, address checks, order payload
//! - [`subscription`] - Shop subscription plans

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod subscription;
pub mod types;

pub use cart::{Cart, ShopCart};
pub use catalog::{Catalog, CatalogItem, CategoryFilter};
pub use checkout::{CheckoutError, DeliveryAddress, OrderLine, PlaceOrder};
pub use subscription::SubscriptionPlan;
pub use types::*;
