//! Browsing shops and menus.

#![allow(clippy::print_stdout)]

use drovo_client::Store;
use drovo_core::{CategoryFilter, ShopId, catalog::CATEGORIES};

/// `drovo shops`
pub async fn list(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let shops = store.api().list_shops().await?;
    if shops.is_empty() {
        println!("No shops yet.");
        return Ok(());
    }

    for shop in shops {
        let address = shop
            .shop_address
            .as_ref()
            .map_or("", |a| a.address.as_str());
        println!("{:<26} {:<30} {address}", shop.id, shop.name);
    }
    Ok(())
}

/// `drovo menu <shop> [--category]`
pub async fn menu(
    store: &mut Store,
    shop: &str,
    category: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter: CategoryFilter = category.unwrap_or("ALL").parse()?;
    if let CategoryFilter::Only(name) = &filter
        && !CATEGORIES.contains(&name.as_str())
    {
        tracing::warn!(category = %name, "Not one of the storefront categories");
    }

    let shop = ShopId::new(shop);
    let page = store.api().shop_page(&shop, store.session().token()).await;
    let page = store.observe(page)?;
    println!("{}", page.shop.name);
    if let Some(address) = &page.shop.shop_address {
        println!("{}  ({})", address.address, address.maps_url());
    }
    println!();

    let catalog = store.open_shop(&shop).await?;
    for item in catalog.filtered(&filter) {
        println!(
            "{:<26} {:<28} {:>8}  per {} {:<8} [{}]",
            item.id, item.name, item.price.to_string(), item.quantity, item.unit, item.category
        );
    }
    Ok(())
}
