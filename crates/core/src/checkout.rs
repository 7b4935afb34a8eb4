//! Checkout rules and the order payload sent to the API.

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::{Catalog, CatalogItem};
use crate::types::{ItemId, Phone, PhoneError, Price, ShopId, Unit};

/// Smallest subtotal, in rupees, a shop accepts an order for.
pub const MINIMUM_ORDER_RUPEES: i64 = 60;

/// Delivery fee tiers as `(upper bound in metres, fee in rupees)`.
const DELIVERY_TIERS: &[(u32, i64)] = &[(1_000, 9), (2_500, 15), (4_000, 25), (6_000, 35)];

/// Fee charged beyond the last tier.
const LONG_DISTANCE_FEE: i64 = 50;

/// Reasons an order cannot be placed.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("the cart for this shop is empty")]
    EmptyCart,

    #[error("minimum purchase of {minimum} is required to checkout (cart total is {subtotal})")]
    BelowMinimum { subtotal: Price, minimum: Price },

    #[error("missing delivery detail: {0}")]
    MissingField(&'static str),

    #[error("delivery location has no coordinates")]
    MissingLocation,

    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),
}

/// Delivery fee for a driving distance in metres.
#[must_use]
pub fn delivery_charge(distance_metres: u32) -> Price {
    let fee = DELIVERY_TIERS
        .iter()
        .find(|(limit, _)| distance_metres < *limit)
        .map_or(LONG_DISTANCE_FEE, |(_, fee)| *fee);
    Price::from_rupees(fee)
}

/// Minimum order amount as a [`Price`].
#[must_use]
pub fn minimum_order() -> Price {
    Price::from_rupees(MINIMUM_ORDER_RUPEES)
}

/// Check that a subtotal is large enough to check out.
///
/// # Errors
///
/// Returns [`CheckoutError::BelowMinimum`] if `subtotal` is under ₹60.
pub fn ensure_minimum(subtotal: Price) -> Result<(), CheckoutError> {
    let minimum = minimum_order();
    if subtotal < minimum {
        return Err(CheckoutError::BelowMinimum { subtotal, minimum });
    }
    Ok(())
}

/// Where an order should be delivered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// Formatted street address from the maps provider.
    pub street: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Flat, house number or building name.
    pub flat: String,
    #[serde(default)]
    pub floor: String,
    #[serde(default)]
    pub landmark: String,
}

impl DeliveryAddress {
    /// Check the required fields and the phone number.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.latitude.is_none() || self.longitude.is_none() || self.street.trim().is_empty() {
            return Err(CheckoutError::MissingLocation);
        }

        let required = [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("phone", &self.phone),
            ("flat / house number", &self.flat),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CheckoutError::MissingField(*name));
        }

        Phone::parse_mobile(&self.phone)?;
        Ok(())
    }

    /// Set a new street address; the old coordinates no longer apply.
    pub fn set_street(&mut self, street: impl Into<String>) {
        self.street = street.into();
        self.latitude = None;
        self.longitude = None;
    }

    /// Google Maps driving directions to this address.
    #[must_use]
    pub fn directions_url(&self) -> Option<String> {
        let (lat, lng) = self.latitude.zip(self.longitude)?;
        Some(format!(
            "https://www.google.com/maps/dir/?api=1&destination={lat},{lng}"
        ))
    }
}

/// One line of an order as the shop sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    /// Amount ordered with its unit, e.g. `1.50 kg`.
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub category: String,
}

impl OrderLine {
    /// Build a line for `packages` packages of `item`.
    #[must_use]
    pub fn from_catalog(item: &CatalogItem, packages: u32) -> Self {
        Self {
            id: Some(item.id.clone()),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            image: item.image.clone(),
            quantity: item
                .unit
                .order_line_quantity(item.total_base_quantity(packages)),
            unit: Some(item.unit.clone()),
            category: item.category.clone(),
        }
    }
}

/// Body of `POST /api/order/place`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub address: DeliveryAddress,
    pub items: Vec<OrderLine>,
    pub amount: Price,
    pub delivery_charge: Price,
    pub shop_id: ShopId,
}

impl PlaceOrder {
    /// Turn `shop`'s cart into an order.
    ///
    /// Lines follow the menu order of `catalog`; cart entries that are not on
    /// the menu are left out, as they are from the subtotal.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty, the subtotal is under the
    /// minimum, the address is incomplete, or no delivery charge was given.
    pub fn from_cart(
        cart: &Cart,
        shop: &ShopId,
        catalog: &Catalog,
        address: DeliveryAddress,
        delivery_charge: Price,
    ) -> Result<Self, CheckoutError> {
        let items: Vec<OrderLine> = catalog
            .iter()
            .filter_map(|item| {
                let packages = cart.quantity(item.id.as_str(), shop.as_str());
                (packages > 0).then(|| OrderLine::from_catalog(item, packages))
            })
            .collect();

        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let amount = cart.total_amount(shop.as_str(), catalog);
        ensure_minimum(amount)?;
        address.validate()?;
        // A zero fee means the driving distance was never worked out
        if delivery_charge.is_zero() {
            return Err(CheckoutError::MissingLocation);
        }

        Ok(Self {
            address,
            items,
            amount,
            delivery_charge,
            shop_id: shop.clone(),
        })
    }

    /// Subtotal plus delivery.
    #[must_use]
    pub fn grand_total(&self) -> Price {
        self.amount + self.delivery_charge
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::item;

    fn address() -> DeliveryAddress {
        DeliveryAddress {
            first_name: "Asha".to_owned(),
            last_name: "Rao".to_owned(),
            phone: "9876543210".to_owned(),
            street: "12 MG Road, Pune".to_owned(),
            latitude: Some(18.52),
            longitude: Some(73.85),
            flat: "4B".to_owned(),
            floor: String::new(),
            landmark: String::new(),
        }
    }

    #[test]
    fn test_delivery_charge_tiers() {
        assert_eq!(delivery_charge(0), Price::from_rupees(9));
        assert_eq!(delivery_charge(999), Price::from_rupees(9));
        assert_eq!(delivery_charge(1_000), Price::from_rupees(15));
        assert_eq!(delivery_charge(2_499), Price::from_rupees(15));
        assert_eq!(delivery_charge(3_999), Price::from_rupees(25));
        assert_eq!(delivery_charge(5_999), Price::from_rupees(35));
        assert_eq!(delivery_charge(6_000), Price::from_rupees(50));
    }

    #[test]
    fn test_minimum_order() {
        assert!(ensure_minimum(Price::from_rupees(60)).is_ok());
        assert!(matches!(
            ensure_minimum(Price::from_rupees(59)),
            Err(CheckoutError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_address_validation() {
        assert!(address().validate().is_ok());

        let mut no_flat = address();
        no_flat.flat = " ".to_owned();
        assert_eq!(no_flat.validate(), Err(CheckoutError::MissingField("flat / house number")));

        let mut bad_phone = address();
        bad_phone.phone = "5876543210".to_owned();
        assert_eq!(
            bad_phone.validate(),
            Err(CheckoutError::InvalidPhone(PhoneError::NotMobile))
        );

        let mut moved = address();
        moved.set_street("Somewhere else");
        assert_eq!(moved.validate(), Err(CheckoutError::MissingLocation));
    }

    #[test]
    fn test_place_order_from_cart() {
        let catalog = Catalog::new(vec![item("A", 20, "Milk"), item("B", 15, "Ghee")]);
        let shop = ShopId::new("S1");
        let mut cart = Cart::new();
        for _ in 0..3 {
            cart.add_item(&ItemId::new("A"), &shop);
        }
        cart.add_item(&ItemId::new("B"), &shop);

        let order =
            PlaceOrder::from_cart(&cart, &shop, &catalog, address(), delivery_charge(1_200))
                .unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].quantity, "1.50 kg");
        assert_eq!(order.items[1].quantity, "500 grams");
        assert_eq!(order.amount, Price::from_rupees(75));
        assert_eq!(order.grand_total(), Price::from_rupees(90));

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["shopId"], "S1");
        assert_eq!(json["deliveryCharge"], 15.0);
        assert_eq!(json["address"]["firstName"], "Asha");
        assert_eq!(json["items"][0]["_id"], "A");
    }

    #[test]
    fn test_place_order_rejects_small_or_empty_carts() {
        let catalog = Catalog::new(vec![item("A", 20, "Milk")]);
        let shop = ShopId::new("S1");
        let mut cart = Cart::new();

        assert_eq!(
            PlaceOrder::from_cart(&cart, &shop, &catalog, address(), Price::ZERO).unwrap_err(),
            CheckoutError::EmptyCart
        );

        cart.add_item(&ItemId::new("A"), &shop);
        assert!(matches!(
            PlaceOrder::from_cart(&cart, &shop, &catalog, address(), Price::ZERO),
            Err(CheckoutError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_place_order_requires_delivery_charge() {
        let catalog = Catalog::new(vec![item("A", 100, "Milk")]);
        let shop = ShopId::new("S1");
        let mut cart = Cart::new();
        cart.add_item(&ItemId::new("A"), &shop);

        assert_eq!(
            PlaceOrder::from_cart(&cart, &shop, &catalog, address(), Price::ZERO).unwrap_err(),
            CheckoutError::MissingLocation
        );
        assert!(
            PlaceOrder::from_cart(&cart, &shop, &catalog, address(), delivery_charge(0)).is_ok()
        );
    }

    #[test]
    fn test_directions_url() {
        assert_eq!(
            address().directions_url().unwrap(),
            "https://www.google.com/maps/dir/?api=1&destination=18.52,73.85"
        );
    }
}
