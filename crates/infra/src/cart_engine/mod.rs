//! Cart engine: per-user carts validated against the live catalog.
//!
//! The engine owns the `user_id -> Cart` cache. Persisted carts are loaded
//! lazily on first access, once per engine. Every successful mutation writes
//! the whole cache back through the persistence adapter.

mod checkout;
mod persistence;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use webstore_cart::{Cart, CartSummary, StockIssue, StockValidation};
use webstore_core::{DomainError, ProductId, UserId};

use crate::catalog::ProductCatalog;
use crate::storage::StorageBackend;

pub use checkout::CheckoutError;
pub use persistence::{CARTS, CARTS_RECORD_ID};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    #[error("only {available} of product {product_id} available, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: u32,
    },

    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// A stock write checkout intends to make, with the stock it was planned against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedDecrement {
    pub product_id: ProductId,
    pub quantity: u32,
    pub observed_stock: u32,
}

#[derive(Debug)]
pub struct CartEngine<S> {
    catalog: ProductCatalog<S>,
    store: S,
    carts: BTreeMap<UserId, Cart>,
    loaded: bool,
}

impl<S> CartEngine<S>
where
    S: StorageBackend + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            catalog: ProductCatalog::new(store.clone()),
            store,
            carts: BTreeMap::new(),
            loaded: false,
        }
    }
}

impl<S> CartEngine<S>
where
    S: StorageBackend,
{
    pub fn catalog(&self) -> &ProductCatalog<S> {
        &self.catalog
    }

    fn ensure_loaded(&mut self) {
        if !self.loaded {
            self.load_carts();
        }
    }

    fn cart_mut(&mut self, user_id: &UserId) -> &mut Cart {
        self.ensure_loaded();
        self.carts
            .entry(user_id.clone())
            .or_insert_with(|| Cart::new(user_id.clone()))
    }

    /// The user's cart, created empty on first access.
    pub fn get_cart(&mut self, user_id: &UserId) -> &Cart {
        self.cart_mut(user_id)
    }

    pub fn add_to_cart(
        &mut self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(0));
        }
        let product = self
            .catalog
            .get_product(product_id)
            .ok_or_else(|| CartError::ProductNotFound(product_id.clone()))?;
        if !product.is_available() {
            return Err(CartError::OutOfStock(product_id.clone()));
        }
        // Stock must cover the whole line once merged, not just this request.
        let in_cart = self
            .cart_mut(user_id)
            .item(product_id)
            .map_or(0, |item| item.quantity());
        let merged = i64::from(in_cart) + i64::from(quantity);
        if merged > i64::from(product.stock()) {
            return Err(CartError::InsufficientStock {
                product_id: product_id.clone(),
                requested: merged,
                available: product.stock(),
            });
        }

        self.cart_mut(user_id).add_item(
            product_id.clone(),
            product.name(),
            product.price(),
            quantity,
        )?;
        debug!(user_id = %user_id, product_id = %product_id, quantity, "added to cart");
        self.save_all_carts();
        Ok(())
    }

    /// `false` when the product was not in the cart (nothing is persisted then).
    pub fn remove_from_cart(&mut self, user_id: &UserId, product_id: &ProductId) -> bool {
        let removed = self.cart_mut(user_id).remove_item(product_id);
        if removed {
            debug!(user_id = %user_id, product_id = %product_id, "removed from cart");
            self.save_all_carts();
        }
        removed
    }

    /// Set a line's quantity; zero removes the line.
    pub fn update_cart_item_quantity(
        &mut self,
        user_id: &UserId,
        product_id: &ProductId,
        new_quantity: i64,
    ) -> Result<(), CartError> {
        if new_quantity < 0 {
            return Err(CartError::InvalidQuantity(new_quantity));
        }
        if let Some(product) = self.catalog.get_product(product_id) {
            if new_quantity > i64::from(product.stock()) {
                return Err(CartError::InsufficientStock {
                    product_id: product_id.clone(),
                    requested: new_quantity,
                    available: product.stock(),
                });
            }
        }

        if !self
            .cart_mut(user_id)
            .update_item_quantity(product_id, new_quantity)
        {
            return Err(CartError::NotInCart(product_id.clone()));
        }
        debug!(user_id = %user_id, product_id = %product_id, new_quantity, "cart quantity updated");
        self.save_all_carts();
        Ok(())
    }

    pub fn clear_cart(&mut self, user_id: &UserId) {
        self.cart_mut(user_id).clear();
        debug!(user_id = %user_id, "cart cleared");
        self.save_all_carts();
    }

    pub fn get_cart_summary(&mut self, user_id: &UserId) -> CartSummary {
        CartSummary::of(self.cart_mut(user_id))
    }

    /// Check every line against current stock. Read-only.
    pub fn validate_cart_stock(&mut self, user_id: &UserId) -> StockValidation {
        self.ensure_loaded();
        match self.carts.get(user_id) {
            Some(cart) => StockValidation::from_issues(self.inspect(cart).0),
            None => StockValidation::from_issues(Vec::new()),
        }
    }

    /// One pass over the cart: the lines that cannot be fulfilled, and the
    /// stock writes that would fulfil the rest.
    fn inspect(&self, cart: &Cart) -> (Vec<StockIssue>, Vec<PlannedDecrement>) {
        let mut issues = Vec::new();
        let mut plan = Vec::new();

        for item in cart.items() {
            let product_id = item.product_id().clone();
            let product_name = item.product_name().to_string();
            match self.catalog.get_product(&product_id) {
                None => issues.push(StockIssue::ProductMissing {
                    product_id,
                    product_name,
                }),
                Some(product) if !product.is_available() => issues.push(StockIssue::OutOfStock {
                    product_id,
                    product_name,
                }),
                Some(product) if !product.can_fulfil(item.quantity()) => {
                    issues.push(StockIssue::Insufficient {
                        product_id,
                        product_name,
                        available: product.stock(),
                        in_cart: item.quantity(),
                    })
                }
                Some(product) => plan.push(PlannedDecrement {
                    product_id,
                    quantity: item.quantity(),
                    observed_stock: product.stock(),
                }),
            }
        }
        (issues, plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use webstore_core::{AggregateRoot, Money};
    use webstore_products::{NewProduct, Product};

    use crate::storage::InMemoryBackend;

    fn engine_with(products: &[(&str, u64, u32)]) -> CartEngine<Arc<InMemoryBackend>> {
        let engine = CartEngine::new(Arc::new(InMemoryBackend::new()));
        for (id, cents, stock) in products {
            let product = Product::new(
                ProductId::new(*id),
                NewProduct {
                    name: format!("Product {id}"),
                    price: Money::from_cents(*cents),
                    category: "Test".to_string(),
                    stock: *stock,
                    description: String::new(),
                },
                Utc::now(),
            )
            .unwrap();
            engine.catalog().save_product(&product).unwrap();
        }
        engine
    }

    fn alice() -> UserId {
        UserId::new("alice")
    }

    fn pid(id: &str) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn get_cart_creates_empty_cart_lazily() {
        let mut engine = engine_with(&[]);
        let cart = engine.get_cart(&alice());
        assert!(cart.is_empty());
        assert_eq!(cart.user_id(), &alice());
    }

    #[test]
    fn add_snapshots_name_and_price() {
        let mut engine = engine_with(&[("P", 1_000, 5)]);
        engine.add_to_cart(&alice(), &pid("P"), 2).unwrap();

        let cart = engine.get_cart(&alice());
        let item = cart.item(&pid("P")).unwrap();
        assert_eq!(item.product_name(), "Product P");
        assert_eq!(item.price_per_unit(), Money::from_cents(1_000));
        assert_eq!(cart.total(), Money::from_cents(2_000));
    }

    #[test]
    fn add_rejects_without_mutation() {
        let mut engine = engine_with(&[("P", 1_000, 5), ("Z", 500, 0)]);

        assert!(matches!(
            engine.add_to_cart(&alice(), &pid("P"), 0),
            Err(CartError::InvalidQuantity(0))
        ));
        assert!(matches!(
            engine.add_to_cart(&alice(), &pid("missing"), 1),
            Err(CartError::ProductNotFound(_))
        ));
        assert!(matches!(
            engine.add_to_cart(&alice(), &pid("Z"), 1),
            Err(CartError::OutOfStock(_))
        ));
        match engine.add_to_cart(&alice(), &pid("P"), 6) {
            Err(CartError::InsufficientStock {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 6);
                assert_eq!(available, 5);
            }
            other => panic!("Expected InsufficientStock, got {other:?}"),
        }
        assert!(engine.get_cart(&alice()).is_empty());
    }

    #[test]
    fn add_checks_stock_against_merged_line_quantity() {
        let mut engine = engine_with(&[("P", 1_000, 5)]);
        engine.add_to_cart(&alice(), &pid("P"), 3).unwrap();
        engine.add_to_cart(&alice(), &pid("P"), 2).unwrap();
        assert_eq!(engine.get_cart(&alice()).item_count(), 5);

        match engine.add_to_cart(&alice(), &pid("P"), 1) {
            Err(CartError::InsufficientStock {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 6);
                assert_eq!(available, 5);
            }
            other => panic!("Expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn rejected_merge_leaves_cart_unchanged() {
        let mut engine = engine_with(&[("P", 1_000, 5)]);
        engine.add_to_cart(&alice(), &pid("P"), 3).unwrap();
        let version = engine.get_cart(&alice()).version();

        assert!(matches!(
            engine.add_to_cart(&alice(), &pid("P"), 3),
            Err(CartError::InsufficientStock { requested: 6, .. })
        ));

        let cart = engine.get_cart(&alice());
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total().to_string(), "30.00");
        assert_eq!(cart.version(), version);
    }

    #[test]
    fn cart_keeps_price_snapshot_after_repricing() {
        let mut engine = engine_with(&[("P", 1_000, 5)]);
        engine.add_to_cart(&alice(), &pid("P"), 1).unwrap();
        engine
            .catalog()
            .update_price(&pid("P"), Money::from_cents(2_500))
            .unwrap();
        engine.add_to_cart(&alice(), &pid("P"), 1).unwrap();

        let cart = engine.get_cart(&alice());
        assert_eq!(cart.item(&pid("P")).unwrap().price_per_unit(), Money::from_cents(1_000));
        assert_eq!(cart.total(), Money::from_cents(2_000));
    }

    #[test]
    fn update_validates_against_live_stock() {
        let mut engine = engine_with(&[("P", 1_000, 5)]);
        engine.add_to_cart(&alice(), &pid("P"), 1).unwrap();

        assert!(matches!(
            engine.update_cart_item_quantity(&alice(), &pid("P"), -1),
            Err(CartError::InvalidQuantity(-1))
        ));
        assert!(matches!(
            engine.update_cart_item_quantity(&alice(), &pid("P"), 6),
            Err(CartError::InsufficientStock { .. })
        ));
        engine.update_cart_item_quantity(&alice(), &pid("P"), 4).unwrap();
        assert_eq!(engine.get_cart(&alice()).item_count(), 4);
    }

    #[test]
    fn update_to_zero_removes_line() {
        let mut engine = engine_with(&[("P", 1_000, 5)]);
        engine.add_to_cart(&alice(), &pid("P"), 2).unwrap();
        engine.update_cart_item_quantity(&alice(), &pid("P"), 0).unwrap();
        assert!(engine.get_cart(&alice()).is_empty());
    }

    #[test]
    fn update_of_absent_line_fails() {
        let mut engine = engine_with(&[("P", 1_000, 5)]);
        assert!(matches!(
            engine.update_cart_item_quantity(&alice(), &pid("P"), 2),
            Err(CartError::NotInCart(_))
        ));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut engine = engine_with(&[("P", 1_000, 5)]);
        engine.add_to_cart(&alice(), &pid("P"), 2).unwrap();
        assert!(engine.remove_from_cart(&alice(), &pid("P")));
        assert!(!engine.remove_from_cart(&alice(), &pid("P")));
    }

    #[test]
    fn carts_are_per_user() {
        let mut engine = engine_with(&[("P", 1_000, 5)]);
        engine.add_to_cart(&alice(), &pid("P"), 2).unwrap();
        assert!(engine.get_cart(&UserId::new("bob")).is_empty());

        engine.clear_cart(&alice());
        let summary = engine.get_cart_summary(&alice());
        assert!(summary.is_empty);
        assert_eq!(summary.total, Money::ZERO);
    }

    #[test]
    fn validation_reports_each_problem_line() {
        let mut engine = engine_with(&[("A", 100, 5), ("B", 100, 5), ("C", 100, 5), ("D", 100, 5)]);
        for id in ["A", "B", "C", "D"] {
            engine.add_to_cart(&alice(), &pid(id), 3).unwrap();
        }
        engine.catalog().delete_product(&pid("A"));
        engine.catalog().update_stock(&pid("B"), 0).unwrap();
        engine.catalog().update_stock(&pid("C"), 2).unwrap();

        let validation = engine.validate_cart_stock(&alice());
        assert!(!validation.valid);
        assert_eq!(
            validation.messages(),
            vec![
                "Product Product A no longer exists".to_string(),
                "Product Product B is out of stock".to_string(),
                "Only 2 of Product C available, but 3 in cart".to_string(),
            ]
        );
    }

    #[test]
    fn validation_of_unknown_user_is_valid() {
        let mut engine = engine_with(&[]);
        let validation = engine.validate_cart_stock(&UserId::new("nobody"));
        assert!(validation.valid);
        assert!(validation.issues.is_empty());
    }
}
