//! Server-side copy of the cart.

use secrecy::SecretString;
use tracing::instrument;

use super::types::CartLine;
use super::{ApiClient, Auth};
use crate::error::Result;

/// Which way a mirrored cart change goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartAction {
    Add,
    Remove,
}

impl CartAction {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Add => "api/cart/add",
            Self::Remove => "api/cart/remove",
        }
    }
}

impl std::fmt::Display for CartAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

impl ApiClient {
    /// Replay one cart change on the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the change or the request fails.
    #[instrument(skip(self, token, line), fields(%action, item_id = %line.item_id, shop_id = %line.shop_id))]
    pub async fn mirror_cart(
        &self,
        token: &SecretString,
        action: CartAction,
        line: &CartLine,
    ) -> Result<()> {
        self.post_json(action.path(), Auth::Token(token), line)
            .await?;
        Ok(())
    }
}
