//! Core types for Drovo.
//!
//! This module provides type-safe wrappers for the marketplace's domain
//! concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod status;
pub mod unit;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::{Price, PriceError};
pub use status::*;
pub use unit::{Unit, UnitKind};
