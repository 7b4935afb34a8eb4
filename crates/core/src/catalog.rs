//! Read-only menu data for a shop.
//!
//! Catalog items are owned by the API server. The client only uses them to
//! resolve prices and package sizes for the items in a cart.

use serde::{Deserialize, Serialize};

use crate::types::{ItemId, Price, ShopId, Unit};

/// Menu categories offered by the storefront's category strip.
pub const CATEGORIES: &[&str] = &[
    "Milk", "Butter", "Yogurt", "Ghee", "Cheese", "Paneer", "Cake", "Cream",
];

/// A food item on a shop's menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "_id")]
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price of one package.
    pub price: Price,
    /// Image file name, served from `{api}/images/{image}`.
    #[serde(default)]
    pub image: String,
    /// Amount of product in one package, in `unit`.
    #[serde(default = "default_package_quantity")]
    pub quantity: u32,
    pub unit: Unit,
    #[serde(default)]
    pub category: String,
    /// Owning shop, when the endpoint includes it.
    #[serde(rename = "shopId", default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<ShopId>,
}

const fn default_package_quantity() -> u32 {
    1
}

impl CatalogItem {
    /// Total amount of product for `packages` packages, in the item's unit.
    #[must_use]
    pub fn total_base_quantity(&self, packages: u32) -> u64 {
        u64::from(packages) * u64::from(self.quantity)
    }

    /// Human readable amount for `packages` packages, e.g. `1 kg 500 g`.
    #[must_use]
    pub fn display_quantity(&self, packages: u32) -> String {
        self.unit.display_total(self.total_base_quantity(packages))
    }
}

/// Which part of a menu to show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Returns `true` if `item` passes the filter.
    #[must_use]
    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => item.category == *category,
        }
    }

    /// Selecting the active category again goes back to `All`.
    #[must_use]
    pub fn toggle(self, category: &str) -> Self {
        match self {
            Self::Only(current) if current == category => Self::All,
            _ => Self::Only(category.to_owned()),
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Only(s.to_owned()))
        }
    }
}

/// The menu of one shop, in the order the API returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    #[must_use]
    pub const fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    /// Unit price of an item, if it is on the menu.
    #[must_use]
    pub fn price_of(&self, id: &str) -> Option<Price> {
        self.get(id).map(|item| item.price)
    }

    /// Items passing `filter`.
    pub fn filtered<'a>(
        &'a self,
        filter: &'a CategoryFilter,
    ) -> impl Iterator<Item = &'a CatalogItem> + 'a {
        self.items.iter().filter(move |item| filter.matches(item))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<CatalogItem>> for Catalog {
    fn from(items: Vec<CatalogItem>) -> Self {
        Self::new(items)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogItem;
    type IntoIter = std::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::item;
    use super::*;
    use crate::types::UnitKind;

    #[test]
    fn test_deserialize_api_item() {
        let json = r#"{
            "_id": "66f1",
            "name": "Toned Milk",
            "description": "Fresh",
            "price": 28,
            "image": "1727000000-milk.png",
            "quantity": 500,
            "unit": "ml",
            "category": "Milk",
            "shopId": "shop-9"
        }"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id.as_str(), "66f1");
        assert_eq!(item.price, Price::from_rupees(28));
        assert_eq!(item.unit.kind(), UnitKind::Ml);
        assert_eq!(item.display_quantity(3), "1 l 500 ml");
        assert_eq!(item.shop_id, Some(ShopId::new("shop-9")));
    }

    #[test]
    fn test_lookup_and_price() {
        let catalog = Catalog::new(vec![item("a", 20, "Milk"), item("b", 15, "Ghee")]);
        assert_eq!(catalog.price_of("b"), Some(Price::from_rupees(15)));
        assert!(catalog.get("missing").is_none());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_category_filter() {
        let catalog = Catalog::new(vec![
            item("a", 20, "Milk"),
            item("b", 15, "Ghee"),
            item("c", 30, "Milk"),
        ]);
        let milk = CategoryFilter::Only("Milk".to_owned());
        let ids: Vec<_> = catalog.filtered(&milk).map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(catalog.filtered(&CategoryFilter::All).count(), 3);
    }

    #[test]
    fn test_category_toggle() {
        let filter = CategoryFilter::All.toggle("Milk");
        assert_eq!(filter, CategoryFilter::Only("Milk".to_owned()));
        assert_eq!(filter.toggle("Milk"), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
    }
}
