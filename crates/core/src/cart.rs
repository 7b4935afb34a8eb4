//! Client-side shopping cart.
//!
//! A [`Cart`] holds one [`ShopCart`] per shop so that browsing another shop
//! never discards an order in progress. Quantities count packages and are
//! always at least 1: an item whose quantity would drop to 0 is removed, and a
//! shop whose last item is removed disappears from the cart. Looking up a shop
//! or item that is not present behaves like an empty cart / quantity 0.
//!
//! Nothing in this module fails or performs I/O. Mirroring mutations to the
//! server is the caller's business (see `drovo-client`).

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::types::{ItemId, Price, ShopId};

/// Quantities for a single shop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ShopCart {
    items: HashMap<ItemId, u32>,
}

impl ShopCart {
    /// Quantity of `item`, 0 when absent.
    #[must_use]
    pub fn quantity(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `(item, quantity)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.items.iter().map(|(id, qty)| (id, *qty))
    }

    /// Sum of `quantity × unit price`; items missing from `catalog` count as zero.
    #[must_use]
    pub fn total(&self, catalog: &Catalog) -> Price {
        self.iter()
            .filter_map(|(id, qty)| catalog.price_of(id.as_str()).map(|price| price * qty))
            .sum()
    }
}

/// Per-shop carts for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    shops: HashMap<ShopId, ShopCart>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one package of `item` to `shop`'s cart and return the new quantity.
    pub fn add_item(&mut self, item: &ItemId, shop: &ShopId) -> u32 {
        let shop_cart = self.shops.entry(shop.clone()).or_default();
        let qty = shop_cart.items.entry(item.clone()).or_insert(0);
        *qty = qty.saturating_add(1);
        *qty
    }

    /// Take one package of `item` out of `shop`'s cart and return what is left.
    ///
    /// Reaching zero removes the item. Removing an item that is not in the
    /// cart changes nothing and returns 0.
    pub fn remove_item(&mut self, item: &ItemId, shop: &ShopId) -> u32 {
        let Some(shop_cart) = self.shops.get_mut(shop) else {
            return 0;
        };

        let remaining = match shop_cart.items.entry(item.clone()) {
            Entry::Vacant(_) => 0,
            Entry::Occupied(mut entry) => {
                if *entry.get() > 1 {
                    *entry.get_mut() -= 1;
                    *entry.get()
                } else {
                    entry.remove();
                    0
                }
            }
        };

        self.drop_if_empty(shop);
        remaining
    }

    /// Remove `item` from `shop`'s cart whatever its quantity.
    ///
    /// Returns the quantity that was removed, if the item was present.
    pub fn delete_item(&mut self, item: &ItemId, shop: &ShopId) -> Option<u32> {
        let removed = self.shops.get_mut(shop)?.items.remove(item);
        self.drop_if_empty(shop);
        removed
    }

    /// Empty every shop's cart.
    pub fn clear_all(&mut self) {
        self.shops.clear();
    }

    /// Quantity of `item` in `shop`'s cart, 0 when absent.
    #[must_use]
    pub fn quantity(&self, item: &str, shop: &str) -> u32 {
        self.shops.get(shop).map_or(0, |cart| cart.quantity(item))
    }

    /// Number of distinct items in `shop`'s cart (not the number of packages).
    #[must_use]
    pub fn item_count(&self, shop: &str) -> usize {
        self.shops.get(shop).map_or(0, ShopCart::len)
    }

    /// Price of everything in `shop`'s cart.
    ///
    /// Items missing from `catalog` contribute nothing.
    #[must_use]
    pub fn total_amount(&self, shop: &str, catalog: &Catalog) -> Price {
        self.shops
            .get(shop)
            .map_or(Price::ZERO, |cart| cart.total(catalog))
    }

    /// The cart for `shop`, if it holds anything.
    #[must_use]
    pub fn shop(&self, shop: &str) -> Option<&ShopCart> {
        self.shops.get(shop)
    }

    /// Shops that currently have items.
    pub fn shops(&self) -> impl Iterator<Item = (&ShopId, &ShopCart)> {
        self.shops.iter()
    }

    /// Returns `true` if no shop has any items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }

    fn drop_if_empty(&mut self, shop: &ShopId) {
        if self.shops.get(shop).is_some_and(ShopCart::is_empty) {
            self.shops.remove(shop);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::catalog::fixtures::item;

    fn ids(item: &str, shop: &str) -> (ItemId, ShopId) {
        (ItemId::new(item), ShopId::new(shop))
    }

    fn price_list() -> Catalog {
        Catalog::new(vec![item("A", 20, "Milk"), item("B", 15, "Ghee")])
    }

    #[test]
    fn test_add_creates_entries() {
        let mut cart = Cart::new();
        let (a, s1) = ids("A", "S1");
        assert_eq!(cart.add_item(&a, &s1), 1);
        assert_eq!(cart.add_item(&a, &s1), 2);
        assert_eq!(cart.quantity("A", "S1"), 2);
        assert_eq!(cart.item_count("S1"), 1);
    }

    #[test]
    fn test_scenario_totals() {
        let catalog = price_list();
        let mut cart = Cart::new();
        let (a, s1) = ids("A", "S1");
        let b = ItemId::new("B");

        cart.add_item(&a, &s1);
        cart.add_item(&a, &s1);
        cart.add_item(&b, &s1);
        assert_eq!(cart.item_count("S1"), 2);
        assert_eq!(cart.total_amount("S1", &catalog), Price::from_rupees(55));

        assert_eq!(cart.remove_item(&a, &s1), 1);
        assert_eq!(cart.total_amount("S1", &catalog), Price::from_rupees(35));

        assert_eq!(cart.remove_item(&a, &s1), 0);
        assert_eq!(cart.quantity("A", "S1"), 0);
        assert!(cart.shop("S1").unwrap().iter().all(|(id, _)| id.as_str() != "A"));
        assert_eq!(cart.total_amount("S1", &catalog), Price::from_rupees(15));
        assert_eq!(cart.item_count("S1"), 1);
    }

    #[test]
    fn test_add_then_remove_restores_shop_cart() {
        let mut cart = Cart::new();
        let (a, s1) = ids("A", "S1");
        let b = ItemId::new("B");
        cart.add_item(&b, &s1);
        let before = cart.clone();

        cart.add_item(&a, &s1);
        cart.remove_item(&a, &s1);
        assert_eq!(cart, before);

        // Also holds when the shop was empty to begin with.
        let mut empty = Cart::new();
        empty.add_item(&a, &s1);
        empty.remove_item(&a, &s1);
        assert_eq!(empty, Cart::new());
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut cart = Cart::new();
        let (a, s1) = ids("A", "S1");
        cart.add_item(&a, &s1);
        let before = cart.clone();

        assert_eq!(cart.remove_item(&ItemId::new("missing"), &s1), 0);
        assert_eq!(cart.remove_item(&a, &ShopId::new("other")), 0);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_delete_ignores_quantity() {
        let mut cart = Cart::new();
        let (a, s1) = ids("A", "S1");
        for _ in 0..5 {
            cart.add_item(&a, &s1);
        }
        assert_eq!(cart.delete_item(&a, &s1), Some(5));
        assert_eq!(cart.delete_item(&a, &s1), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_empty_shop_total_is_zero() {
        let cart = Cart::new();
        assert_eq!(cart.total_amount("S1", &price_list()), Price::ZERO);
        assert_eq!(cart.item_count("S1"), 0);
    }

    #[test]
    fn test_items_missing_from_catalog_contribute_nothing() {
        let mut cart = Cart::new();
        let (a, s1) = ids("A", "S1");
        cart.add_item(&a, &s1);
        cart.add_item(&ItemId::new("ghost"), &s1);
        assert_eq!(cart.total_amount("S1", &price_list()), Price::from_rupees(20));
        assert_eq!(cart.item_count("S1"), 2);
    }

    #[test]
    fn test_shops_are_independent() {
        let mut cart = Cart::new();
        let a = ItemId::new("A");
        let (s1, s2) = (ShopId::new("S1"), ShopId::new("S2"));
        cart.add_item(&a, &s1);
        cart.add_item(&a, &s2);
        cart.add_item(&a, &s2);
        cart.remove_item(&a, &s1);

        assert_eq!(cart.quantity("A", "S1"), 0);
        assert_eq!(cart.quantity("A", "S2"), 2);
        assert_eq!(cart.shops().count(), 1);
    }

    #[test]
    fn test_clear_all_empties_every_shop() {
        let mut cart = Cart::new();
        for shop in ["S1", "S2", "S3"] {
            cart.add_item(&ItemId::new("A"), &ShopId::new(shop));
            cart.add_item(&ItemId::new("B"), &ShopId::new(shop));
        }
        cart.clear_all();
        for shop in ["S1", "S2", "S3"] {
            assert_eq!(cart.item_count(shop), 0);
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_item_count_bounded_by_distinct_items_for_all_short_sequences() {
        // Every sequence of up to 6 operations over two items plus an
        // item that is never added.
        #[derive(Clone, Copy)]
        enum Op {
            Add(&'static str),
            Remove(&'static str),
        }
        const OPS: [Op; 5] = [
            Op::Add("A"),
            Op::Add("B"),
            Op::Remove("A"),
            Op::Remove("B"),
            Op::Remove("C"),
        ];

        let shop = ShopId::new("S1");
        for len in 0..=6u32 {
            for mut code in 0..OPS.len().pow(len) {
                let mut cart = Cart::new();
                let mut added = HashSet::new();
                for _ in 0..len {
                    match OPS[code % OPS.len()] {
                        Op::Add(id) => {
                            cart.add_item(&ItemId::new(id), &shop);
                            added.insert(id);
                        }
                        Op::Remove(id) => {
                            cart.remove_item(&ItemId::new(id), &shop);
                        }
                    }
                    code /= OPS.len();
                    assert!(cart.item_count("S1") <= added.len());
                    assert!(cart.shop("S1").is_none_or(|c| c.iter().all(|(_, q)| q >= 1)));
                }
            }
        }
    }

    #[test]
    fn test_serializes_as_nested_map() {
        let mut cart = Cart::new();
        let (a, s1) = ids("A", "S1");
        cart.add_item(&a, &s1);
        cart.add_item(&a, &s1);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json, serde_json::json!({ "S1": { "A": 2 } }));
    }
}
