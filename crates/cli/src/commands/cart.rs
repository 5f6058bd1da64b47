//! Cart commands. Each one goes through the cart engine, which persists the
//! cart before the process exits.

use anyhow::bail;

use webstore_core::{ProductId, UserId};

use super::print_json;
use crate::Engine;

pub fn show(engine: &mut Engine, user: &UserId, json: bool) -> anyhow::Result<()> {
    let summary = engine.get_cart_summary(user);
    if json {
        return print_json(&summary);
    }

    println!("Cart for {user}");
    for item in &summary.items {
        println!(
            "  {}  {} x{} @ {} = {}",
            item.product_id(),
            item.product_name(),
            item.quantity(),
            item.price_per_unit(),
            item.total_price()
        );
    }
    println!("{}", engine.get_cart(user));
    Ok(())
}

pub fn add(
    engine: &mut Engine,
    user: &UserId,
    product: &ProductId,
    quantity: u32,
    json: bool,
) -> anyhow::Result<()> {
    engine.add_to_cart(user, product, quantity)?;
    show(engine, user, json)
}

pub fn remove(
    engine: &mut Engine,
    user: &UserId,
    product: &ProductId,
    json: bool,
) -> anyhow::Result<()> {
    if !engine.remove_from_cart(user, product) {
        bail!("product {product} is not in {user}'s cart");
    }
    show(engine, user, json)
}

pub fn update(
    engine: &mut Engine,
    user: &UserId,
    product: &ProductId,
    quantity: i64,
    json: bool,
) -> anyhow::Result<()> {
    engine.update_cart_item_quantity(user, product, quantity)?;
    show(engine, user, json)
}

pub fn clear(engine: &mut Engine, user: &UserId, json: bool) -> anyhow::Result<()> {
    engine.clear_cart(user);
    show(engine, user, json)
}

pub fn validate(engine: &mut Engine, user: &UserId, json: bool) -> anyhow::Result<()> {
    let validation = engine.validate_cart_stock(user);
    if json {
        print_json(&validation)?;
    } else if validation.valid {
        println!("All items in {user}'s cart are in stock.");
    } else {
        for message in validation.messages() {
            println!("- {message}");
        }
    }

    if !validation.valid {
        bail!("{} cart line(s) cannot be fulfilled", validation.issues.len());
    }
    Ok(())
}

pub fn checkout(engine: &mut Engine, user: &UserId, json: bool) -> anyhow::Result<()> {
    let order = engine.checkout(user)?;
    if json {
        return print_json(&order);
    }

    println!("Order {} completed", order.order_id);
    for item in &order.items {
        println!(
            "  {} x{} = {}",
            item.product_name(),
            item.quantity(),
            item.total_price()
        );
    }
    println!("Total: {} ({} items)", order.total, order.item_count);
    Ok(())
}
