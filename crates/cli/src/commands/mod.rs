//! CLI command implementations.

#![allow(clippy::print_stdout)]

pub mod account;
pub mod checkout;
pub mod orders;
pub mod owner;
pub mod shops;
pub mod subscription;

use drovo_core::{Email, EmailError};
use thiserror::Error;

/// Errors in command-line input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid cart entry '{0}': expected ITEM or ITEM=QUANTITY")]
    CartEntry(String),

    #[error("At most {max} of one item per order, got {quantity}")]
    TooMany { quantity: u32, max: u32 },

    #[error("Cannot read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

pub(crate) fn parse_email(raw: &str) -> Result<Email, InputError> {
    Ok(Email::parse(raw)?)
}

/// Print a confirmation from the API, or `fallback` when it sent none.
pub(crate) fn print_message(message: Option<String>, fallback: &str) {
    println!("{}", message.as_deref().unwrap_or(fallback));
}
