//! One-shot checkout: fill a shop's cart and place the order.

#![allow(clippy::print_stdout)]

use clap::Args;
use drovo_client::Store;
use drovo_core::checkout::delivery_charge;
use drovo_core::{DeliveryAddress, ItemId, ShopId};

use super::InputError;

#[derive(Args)]
pub struct CheckoutArgs {
    /// Shop id
    shop: String,

    /// Item to buy, as `ITEM` or `ITEM=QUANTITY`; repeatable
    #[arg(short, long = "item", required = true)]
    items: Vec<String>,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// Mobile number (10 digits starting with 7, 8 or 9)
    #[arg(long)]
    phone: String,

    /// Street address
    #[arg(long)]
    street: String,

    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    /// Flat, house number or building
    #[arg(long)]
    flat: String,

    #[arg(long, default_value = "")]
    floor: String,

    #[arg(long, default_value = "")]
    landmark: String,

    /// Driving distance from the shop in metres
    #[arg(long)]
    distance: u32,

    /// Show the order without placing it
    #[arg(long)]
    dry_run: bool,
}

/// Most packages of one item a single entry may ask for.
const MAX_QUANTITY: u32 = 99;

/// Split `ITEM=QUANTITY` (quantity defaults to 1).
fn parse_entry(entry: &str) -> Result<(ItemId, u32), InputError> {
    let (id, quantity) = match entry.split_once('=') {
        Some((id, quantity)) => (
            id,
            quantity
                .trim()
                .parse::<u32>()
                .map_err(|_| InputError::CartEntry(entry.to_string()))?,
        ),
        None => (entry, 1),
    };
    let id = id.trim();
    if id.is_empty() || quantity == 0 {
        return Err(InputError::CartEntry(entry.to_string()));
    }
    if quantity > MAX_QUANTITY {
        return Err(InputError::TooMany {
            quantity,
            max: MAX_QUANTITY,
        });
    }
    Ok((ItemId::new(id), quantity))
}

/// `drovo checkout`
pub async fn run(store: &mut Store, args: CheckoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let entries = args
        .items
        .iter()
        .map(|entry| parse_entry(entry))
        .collect::<Result<Vec<_>, _>>()?;

    // Check login before touching the cart
    store.token()?;

    let shop = ShopId::new(args.shop);
    store.open_shop(&shop).await?;

    for (item, _) in &entries {
        if store.catalog().get(item.as_str()).is_none() {
            tracing::warn!(item_id = %item, "Item is not on this shop's menu");
        }
    }

    let address = DeliveryAddress {
        first_name: args.first_name,
        last_name: args.last_name,
        phone: args.phone,
        street: args.street,
        latitude: Some(args.lat),
        longitude: Some(args.lng),
        flat: args.flat,
        floor: args.floor,
        landmark: args.landmark,
    };
    let fee = delivery_charge(args.distance);

    // A dry run works on a copy of the cart so nothing is mirrored
    let order = if args.dry_run {
        store.preview_order(&entries, address, fee)?
    } else {
        for (item, quantity) in &entries {
            for _ in 0..*quantity {
                store.add_to_cart(item, &shop);
            }
        }
        store.place_order(address, fee).await?
    };

    for line in &order.items {
        println!("{:<30} {:>12}  {}", line.name, line.quantity, line.price);
    }
    println!("Subtotal: {}", order.amount);
    println!("Delivery: {}", order.delivery_charge);
    println!("Total:    {}", order.grand_total());
    if args.dry_run {
        println!("(dry run, nothing was ordered)");
    } else {
        println!("Order placed successfully!");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry() {
        assert_eq!(parse_entry("abc").unwrap(), (ItemId::new("abc"), 1));
        assert_eq!(parse_entry("abc=3").unwrap(), (ItemId::new("abc"), 3));
        assert!(parse_entry("abc=0").is_err());
        assert!(parse_entry("abc=lots").is_err());
        assert!(parse_entry("=2").is_err());
    }

    #[test]
    fn test_parse_entry_caps_quantity() {
        assert_eq!(parse_entry("abc=99").unwrap(), (ItemId::new("abc"), 99));
        assert!(matches!(
            parse_entry("abc=100"),
            Err(InputError::TooMany { quantity: 100, max: 99 })
        ));
        assert!(parse_entry("abc=4294967295").is_err());
    }
}
