//! Shop owner commands: dashboard, items and incoming orders.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use chrono::Utc;
use drovo_client::Store;
use drovo_client::api::types::{ImageUpload, NewFoodItem};
use drovo_core::{ItemId, OrderId, OrderStatus, Price, Unit};

use super::orders::print_order;
use super::{InputError, print_message};

/// Fields of `drovo food add`.
pub struct NewItemArgs {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub unit: String,
    pub quantity: u32,
    pub image: PathBuf,
}

pub(crate) fn read_image(path: &PathBuf) -> Result<ImageUpload, InputError> {
    let bytes = std::fs::read(path).map_err(|source| InputError::File {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
    Ok(ImageUpload { file_name, bytes })
}

/// `drovo dashboard`
pub async fn dashboard(store: &mut Store) -> Result<(), Box<dyn std::error::Error>> {
    let token = store.token()?.clone();
    let shop = store.api().my_shop(&token).await;
    let shop = store.observe(shop)?;

    println!("{}", shop.name);
    if let Some(email) = &shop.email {
        println!("Email:        {email}");
    }
    if let Some(phone) = &shop.phone {
        println!("Phone:        {phone}");
    }
    if let Some(address) = &shop.shop_address {
        println!("Address:      {}", address.address);
    }
    match shop.plan() {
        Some(plan) => println!("Plan:         {plan}"),
        None => println!("Plan:         none"),
    }
    if let Some(end) = shop.sub_end_date {
        let state = if shop.subscription_expired(Utc::now()) {
            " (expired, run `drovo subscribe renew`)"
        } else {
            ""
        };
        println!("Valid until:  {}{state}", end.format("%d %b %Y"));
    }
    if let Some(image) = &shop.shop_image {
        println!("Banner:       {}", store.api().image_url(image)?);
    }
    Ok(())
}

/// `drovo food list`
pub async fn list_food(store: &mut Store) -> Result<(), Box<dyn std::error::Error>> {
    let token = store.token()?.clone();
    let catalog = store.api().my_food(&token).await;
    let catalog = store.observe(catalog)?;

    if catalog.is_empty() {
        println!("No items yet. Add one with `drovo food add`.");
    }
    for item in &catalog {
        println!(
            "{:<26} {:<28} {:>8}  {} {:<8} [{}]",
            item.id,
            item.name,
            item.price.to_string(),
            item.quantity,
            item.unit,
            item.category
        );
    }
    Ok(())
}

/// `drovo food add`
pub async fn add_food(store: &mut Store, args: NewItemArgs) -> Result<(), Box<dyn std::error::Error>> {
    let token = store.token()?.clone();
    let item = NewFoodItem {
        name: args.name,
        description: args.description,
        price: args.price.parse::<Price>()?,
        category: args.category,
        unit: Unit::from(args.unit),
        quantity: args.quantity,
        image: read_image(&args.image)?,
    };
    let result = store.api().add_food(&token, item).await;
    print_message(store.observe(result)?, "Food item added successfully!");
    Ok(())
}

/// `drovo food remove <id>`
pub async fn remove_food(store: &mut Store, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let token = store.token()?.clone();
    let result = store.api().remove_food(&token, &ItemId::new(id)).await;
    print_message(store.observe(result)?, "Food item removed");
    Ok(())
}

/// `drovo manage orders`
pub async fn orders(store: &mut Store) -> Result<(), Box<dyn std::error::Error>> {
    let token = store.token()?.clone();
    let orders = store.api().shop_orders(&token).await;
    let orders = store.observe(orders)?;

    if orders.is_empty() {
        println!("No orders yet.");
    }
    for order in &orders {
        print_order(order);
        let address = &order.address;
        println!(
            "    {} {}, {}  {}, {}",
            address.first_name, address.last_name, address.phone, address.flat, address.street
        );
        if let Some(url) = address.directions_url() {
            println!("    {url}");
        }
    }
    Ok(())
}

/// `drovo manage status <id> <status>`
pub async fn set_status(
    store: &mut Store,
    id: &str,
    status: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let status: OrderStatus = status.parse()?;
    let token = store.token()?.clone();
    let result = store
        .api()
        .update_order_status(&token, &OrderId::new(id), status)
        .await;
    store.observe(result)?;
    println!("Order {id} is now {status}");
    Ok(())
}
