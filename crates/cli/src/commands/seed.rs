//! Sample catalog for a fresh store.

use tracing::info;

use webstore_core::{Entity, Money};
use webstore_products::NewProduct;

use super::print_json;
use crate::Engine;

fn sample_products() -> Vec<NewProduct> {
    [
        ("Gaming Laptop", 129_999, "Electronics", 5, "High-performance gaming laptop"),
        ("Wireless Mouse", 4_999, "Electronics", 15, "Ergonomic wireless mouse"),
        ("Coffee Mug", 1_499, "Home", 25, "Ceramic coffee mug"),
        ("Notebook", 899, "Office", 30, "Spiral-bound notebook"),
    ]
    .into_iter()
    .map(|(name, cents, category, stock, description)| NewProduct {
        name: name.to_string(),
        price: Money::from_cents(cents),
        category: category.to_string(),
        stock,
        description: description.to_string(),
    })
    .collect()
}

/// Create the sample products unless the catalog already has some.
pub fn sample_catalog(engine: &Engine, json: bool) -> anyhow::Result<()> {
    let catalog = engine.catalog();
    let existing = catalog.list_products().len();
    if existing > 0 {
        println!("Catalog already has {existing} products; nothing to seed.");
        return Ok(());
    }

    let mut created = Vec::new();
    for input in sample_products() {
        created.push(catalog.create_product(input)?);
    }
    info!(count = created.len(), "sample catalog created");

    if json {
        return print_json(&created);
    }
    for product in &created {
        println!("Created {}  {}", product.id(), product);
    }
    Ok(())
}
