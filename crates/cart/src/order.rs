use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use webstore_core::{DomainError, DomainResult, Money, OrderId, UserId};

use crate::cart::{Cart, CartItem};

/// Order status lifecycle.
///
/// Checkout only ever produces completed orders; there is no order history to
/// move them through further states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
}

/// Summary of a checked-out cart, returned to the caller of checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub total: Money,
    pub item_count: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Snapshot a cart into a completed order. The cart is not modified.
    pub fn from_cart(order_id: OrderId, cart: &Cart, created_at: DateTime<Utc>) -> DomainResult<Self> {
        if cart.is_empty() {
            return Err(DomainError::validation("cannot create an order from an empty cart"));
        }
        Ok(Self {
            order_id,
            user_id: cart.user_id().clone(),
            items: cart.items().to_vec(),
            total: cart.total(),
            item_count: cart.item_count(),
            status: OrderStatus::Completed,
            created_at,
        })
    }
}
