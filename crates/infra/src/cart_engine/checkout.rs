//! Checkout: turn a validated cart into a completed order and take the stock.

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use webstore_cart::{Order, StockIssue};
use webstore_core::{DomainError, OrderId, UserId};
use webstore_products::ExpectedStock;

use super::CartEngine;
use crate::storage::StorageBackend;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("stock validation failed: {}", join_issues(.issues))]
    StockValidation { issues: Vec<StockIssue> },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

fn join_issues(issues: &[StockIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl<S> CartEngine<S>
where
    S: StorageBackend,
{
    /// Check out the user's cart.
    ///
    /// Every stock write is planned before any is made. Each write is then
    /// applied only if the product still has the stock seen while planning; a
    /// write that fails is logged and the remaining ones still go through.
    /// The cart is cleared and persisted once the order exists.
    pub fn checkout(&mut self, user_id: &UserId) -> Result<Order, CheckoutError> {
        self.ensure_loaded();
        let cart = match self.carts.get(user_id) {
            Some(cart) if !cart.is_empty() => cart,
            _ => return Err(CheckoutError::EmptyCart),
        };

        let (issues, plan) = self.inspect(cart);
        if !issues.is_empty() {
            return Err(CheckoutError::StockValidation { issues });
        }

        let order = Order::from_cart(OrderId::generate(), cart, Utc::now())?;

        let mut failed = 0usize;
        for step in &plan {
            if let Err(err) = self.catalog.decrement_stock(
                &step.product_id,
                step.quantity,
                ExpectedStock::Exact(step.observed_stock),
            ) {
                failed += 1;
                error!(
                    order_id = %order.order_id,
                    product_id = %step.product_id,
                    quantity = step.quantity,
                    error = %err,
                    "stock decrement failed during checkout"
                );
            }
        }

        if let Some(cart) = self.carts.get_mut(user_id) {
            cart.clear();
        }
        self.save_all_carts();

        info!(
            order_id = %order.order_id,
            user_id = %user_id,
            total = %order.total,
            items = order.item_count,
            failed_decrements = failed,
            "checkout completed"
        );
        Ok(order)
    }
}
