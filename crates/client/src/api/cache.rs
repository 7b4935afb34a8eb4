//! Cache types for API responses.

use drovo_core::{Catalog, ShopId};

use super::types::Shop;

/// Cache key for shop listings and menus.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Shops,
    Menu(ShopId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Shops(Vec<Shop>),
    Menu(Catalog),
}
