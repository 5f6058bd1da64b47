//! Product catalog on top of a `StorageBackend`.
//!
//! Products are stored as flat records under the `products` entity type.
//! Reads skip records that fail validation (with a warning) instead of failing
//! the whole listing.

use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, warn};

use webstore_core::{DomainError, Entity, Money, ProductId};
use webstore_products::{ExpectedStock, NewProduct, Product};

use crate::storage::{Record, StorageBackend};

pub const PRODUCTS: &str = "products";

/// Attempts at drawing an unused product id before giving up.
const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage rejected write for product {0}")]
    Rejected(ProductId),

    #[error("could not allocate a unique product id")]
    IdExhausted,

    #[error("failed to encode product: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ProductCatalog<S> {
    store: S,
}

impl<S> ProductCatalog<S>
where
    S: StorageBackend,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn decode(record: Record) -> Option<Product> {
        let id = record
            .get("id")
            .and_then(JsonValue::as_str)
            .unwrap_or("<missing>")
            .to_string();
        match serde_json::from_value::<Product>(JsonValue::Object(record)) {
            Ok(product) => Some(product),
            Err(err) => {
                warn!(product_id = %id, error = %err, "skipping invalid product record");
                None
            }
        }
    }

    fn encode(product: &Product) -> Result<Record, CatalogError> {
        match serde_json::to_value(product)? {
            JsonValue::Object(record) => Ok(record),
            _ => Err(CatalogError::Domain(DomainError::invariant(
                "product did not encode to an object",
            ))),
        }
    }

    pub fn list_products(&self) -> Vec<Product> {
        self.store
            .load_all(PRODUCTS)
            .into_iter()
            .filter_map(Self::decode)
            .collect()
    }

    pub fn get_product(&self, id: &ProductId) -> Option<Product> {
        self.store
            .load_by_id(PRODUCTS, id.as_str())
            .and_then(Self::decode)
    }

    pub fn exists(&self, id: &ProductId) -> bool {
        self.store.exists(PRODUCTS, id.as_str())
    }

    /// Insert or replace a product under its own id.
    pub fn save_product(&self, product: &Product) -> Result<(), CatalogError> {
        let record = Self::encode(product)?;
        if self.store.save(PRODUCTS, record) {
            Ok(())
        } else {
            Err(CatalogError::Rejected(product.id().clone()))
        }
    }

    /// Create a product under a freshly generated `PRD-` id.
    pub fn create_product(&self, input: NewProduct) -> Result<Product, CatalogError> {
        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| ProductId::generate())
            .find(|id| !self.exists(id))
            .ok_or(CatalogError::IdExhausted)?;

        let product = Product::new(id, input, Utc::now())?;
        self.save_product(&product)?;
        debug!(product_id = %product.id(), name = product.name(), "product created");
        Ok(product)
    }

    /// Exact category match.
    pub fn products_by_category(&self, category: &str) -> Vec<Product> {
        let mut filter = Record::new();
        filter.insert("category".into(), JsonValue::from(category));
        self.store
            .load_by_filter(PRODUCTS, &filter)
            .into_iter()
            .filter_map(Self::decode)
            .collect()
    }

    /// Case-insensitive substring match on name or description.
    pub fn search_products(&self, query: &str) -> Vec<Product> {
        self.list_products()
            .into_iter()
            .filter(|p| p.matches_query(query))
            .collect()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.list_products()
            .into_iter()
            .map(|p| p.category().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn low_stock_products(&self, threshold: u32) -> Vec<Product> {
        self.list_products()
            .into_iter()
            .filter(|p| p.stock() <= threshold)
            .collect()
    }

    /// Reprice a product. Carts keep the price they snapshotted when the
    /// product was added.
    pub fn update_price(&self, id: &ProductId, price: Money) -> Result<Product, CatalogError> {
        let product = self
            .get_product(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?
            .with_price(price);
        self.save_product(&product)?;
        debug!(product_id = %id, price = %price, "price updated");
        Ok(product)
    }

    /// Overwrite stock without any expectation (manual correction).
    pub fn update_stock(&self, id: &ProductId, new_stock: u32) -> Result<Product, CatalogError> {
        self.write_stock(id, ExpectedStock::Any, |_| Ok(new_stock))
    }

    /// Remove `quantity` units, failing if the stored stock no longer matches
    /// `expected` or would go negative.
    pub fn decrement_stock(
        &self,
        id: &ProductId,
        quantity: u32,
        expected: ExpectedStock,
    ) -> Result<Product, CatalogError> {
        self.write_stock(id, expected, |product| {
            Ok(product.stock_after_sale(quantity)?)
        })
    }

    fn write_stock<F>(
        &self,
        id: &ProductId,
        expected: ExpectedStock,
        next: F,
    ) -> Result<Product, CatalogError>
    where
        F: FnOnce(&Product) -> Result<u32, CatalogError>,
    {
        let product = self
            .get_product(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        expected.check(product.stock())?;
        let stock = next(&product)?;

        let mut fields = Record::new();
        fields.insert("stock".into(), JsonValue::from(stock));
        if !self.store.update(PRODUCTS, id.as_str(), fields) {
            return Err(CatalogError::Rejected(id.clone()));
        }
        debug!(product_id = %id, from = product.stock(), to = stock, "stock updated");
        Ok(product.with_stock(stock))
    }

    pub fn delete_product(&self, id: &ProductId) -> bool {
        self.store.delete(PRODUCTS, id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryBackend;
    use serde_json::json;

    fn catalog() -> ProductCatalog<InMemoryBackend> {
        ProductCatalog::new(InMemoryBackend::new())
    }

    fn input(name: &str, cents: u64, category: &str, stock: u32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: Money::from_cents(cents),
            category: category.to_string(),
            stock,
            description: format!("{name} description"),
        }
    }

    #[test]
    fn create_assigns_prefixed_id_and_persists() {
        let catalog = catalog();
        let product = catalog.create_product(input("Coffee Mug", 1499, "Home", 25)).unwrap();

        assert!(product.id().as_str().starts_with("PRD-"));
        assert_eq!(catalog.get_product(product.id()), Some(product));
    }

    #[test]
    fn create_rejects_blank_name() {
        let catalog = catalog();
        let err = catalog.create_product(input("  ", 100, "Home", 1)).unwrap_err();
        match err {
            CatalogError::Domain(DomainError::Validation(msg)) if msg.contains("name") => {}
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert!(catalog.list_products().is_empty());
    }

    #[test]
    fn queries_filter_the_catalog() {
        let catalog = catalog();
        catalog.create_product(input("Gaming Laptop", 129_999, "Electronics", 5)).unwrap();
        catalog.create_product(input("Wireless Mouse", 4_999, "Electronics", 15)).unwrap();
        catalog.create_product(input("Notebook", 899, "Office", 3)).unwrap();

        assert_eq!(catalog.products_by_category("Electronics").len(), 2);
        assert!(catalog.products_by_category("electronics").is_empty());
        assert_eq!(catalog.search_products("MOUSE").len(), 1);
        assert_eq!(catalog.categories(), vec!["Electronics", "Office"]);

        let low: Vec<String> = catalog
            .low_stock_products(5)
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(low.len(), 2);
        assert!(low.contains(&"Notebook".to_string()));
    }

    #[test]
    fn invalid_records_are_skipped() {
        let catalog = catalog();
        catalog.create_product(input("Mug", 100, "Home", 1)).unwrap();

        let mut bad = Record::new();
        bad.insert("id".into(), json!("PRD-BAD"));
        bad.insert("name".into(), json!("Broken"));
        bad.insert("price".into(), json!(-5));
        bad.insert("category".into(), json!("Home"));
        catalog.store().save(PRODUCTS, bad);

        assert_eq!(catalog.list_products().len(), 1);
        assert!(catalog.get_product(&ProductId::new("PRD-BAD")).is_none());
    }

    #[test]
    fn decrement_checks_expected_stock() {
        let catalog = catalog();
        let product = catalog.create_product(input("Mug", 100, "Home", 5)).unwrap();
        let id = product.id().clone();

        let err = catalog
            .decrement_stock(&id, 1, ExpectedStock::Exact(4))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::Conflict(_))));
        assert_eq!(catalog.get_product(&id).unwrap().stock(), 5);

        let updated = catalog
            .decrement_stock(&id, 2, ExpectedStock::Exact(5))
            .unwrap();
        assert_eq!(updated.stock(), 3);
        assert_eq!(catalog.get_product(&id).unwrap().stock(), 3);
    }

    #[test]
    fn decrement_never_goes_negative() {
        let catalog = catalog();
        let product = catalog.create_product(input("Mug", 100, "Home", 2)).unwrap();

        let err = catalog
            .decrement_stock(product.id(), 3, ExpectedStock::Any)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Domain(DomainError::InvariantViolation(_))));
        assert_eq!(catalog.get_product(product.id()).unwrap().stock(), 2);
    }

    #[test]
    fn update_price_keeps_everything_else() {
        let catalog = catalog();
        let product = catalog.create_product(input("Mug", 1_499, "Home", 7)).unwrap();

        let repriced = catalog.update_price(product.id(), Money::from_cents(999)).unwrap();
        assert_eq!(repriced.price(), Money::from_cents(999));

        let stored = catalog.get_product(product.id()).unwrap();
        assert_eq!(stored.price(), Money::from_cents(999));
        assert_eq!(stored.stock(), 7);
        assert_eq!(stored.created_at(), product.created_at());
        assert!(matches!(
            catalog.update_price(&ProductId::new("PRD-NOPE"), Money::ZERO),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn update_and_delete() {
        let catalog = catalog();
        let product = catalog.create_product(input("Mug", 100, "Home", 2)).unwrap();

        assert_eq!(catalog.update_stock(product.id(), 40).unwrap().stock(), 40);
        assert!(matches!(
            catalog.update_stock(&ProductId::new("PRD-NOPE"), 1),
            Err(CatalogError::NotFound(_))
        ));

        assert!(catalog.delete_product(product.id()));
        assert!(!catalog.delete_product(product.id()));
        assert!(catalog.get_product(product.id()).is_none());
    }
}
