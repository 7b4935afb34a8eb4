//! Customer order commands.

#![allow(clippy::print_stdout)]

use drovo_client::Store;
use drovo_client::api::types::{Feedback, Order};
use drovo_core::OrderId;

use super::{parse_email, print_message};

pub(crate) fn print_order(order: &Order) {
    println!(
        "{}  {}  {:<17} {:>6}  {}",
        order.id,
        order.date.format("%d %b %Y %H:%M"),
        order.status.as_str(),
        order.grand_total().to_string(),
        order.summary()
    );
}

/// `drovo orders`
pub async fn mine(store: &mut Store) -> Result<(), Box<dyn std::error::Error>> {
    let token = store.token()?.clone();
    let orders = store.api().my_orders(&token).await;
    let orders = store.observe(orders)?;

    if orders.is_empty() {
        println!("No orders yet.");
    }
    for order in &orders {
        print_order(order);
    }
    Ok(())
}

/// `drovo order <id>`
pub async fn show(store: &mut Store, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let token = store.token()?.clone();
    let details = store.api().order_details(&token, &OrderId::new(id)).await;
    let details = store.observe(details)?;
    let order = &details.order;

    println!("Order {}", order.id);
    println!("Placed:   {}", order.date.format("%d %b %Y %H:%M"));
    let progress = drovo_core::OrderStatus::STAGES
        .iter()
        .map(|stage| {
            if stage.stage_index() <= order.status.stage_index() {
                format!("[x] {stage}")
            } else {
                format!("[ ] {stage}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    println!("Status:   {progress}");
    if let Some(shop) = &details.shop {
        println!("Shop:     {}", shop.name);
    }
    println!();
    for line in &order.items {
        println!("  {:<30} {:>12}  {}", line.name, line.quantity, line.price);
    }
    println!();
    println!("Subtotal: {}", order.amount);
    println!("Delivery: {}", order.delivery_charge);
    println!("Total:    {}", order.grand_total());

    let address = &order.address;
    println!(
        "Deliver to {} {}, {}, {}",
        address.first_name, address.last_name, address.flat, address.street
    );
    Ok(())
}

/// `drovo feedback <order>`
pub async fn feedback(
    store: &mut Store,
    order: &str,
    name: &str,
    email: &str,
    rating: u8,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = store.token()?.clone();
    let details = store.api().order_details(&token, &OrderId::new(order)).await;
    let details = store.observe(details)?;
    let shop_email = details
        .shop
        .and_then(|shop| shop.email)
        .ok_or("the shop of this order has no email address")?;

    let feedback = Feedback {
        name: name.to_string(),
        email: parse_email(email)?,
        rating,
        message: message.to_string(),
        shop_email,
    };
    let result = store.api().send_feedback(&token, &feedback).await;
    print_message(store.observe(result)?, "Thanks for your feedback!");
    Ok(())
}
