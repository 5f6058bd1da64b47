//! Catalog browsing.

use webstore_core::Entity;
use webstore_products::Product;

use super::print_json;
use crate::Engine;

pub fn list(
    engine: &Engine,
    category: Option<&str>,
    search: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let catalog = engine.catalog();
    let mut products = match category {
        Some(category) => catalog.products_by_category(category),
        None => catalog.list_products(),
    };
    if let Some(query) = search {
        products.retain(|p| p.matches_query(query));
    }

    if json {
        return print_json(&products);
    }
    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    for product in &products {
        print_product(product);
    }
    Ok(())
}

pub fn categories(engine: &Engine, json: bool) -> anyhow::Result<()> {
    let categories = engine.catalog().categories();
    if json {
        return print_json(&categories);
    }
    for category in categories {
        println!("{category}");
    }
    Ok(())
}

fn print_product(product: &Product) {
    println!("{}  {}  [stock: {}]", product.id(), product, product.stock());
    if !product.description().is_empty() {
        println!("    {}", product.description());
    }
}
