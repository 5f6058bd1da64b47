//! Persisted shape of a cart.
//!
//! Quantities are read back as signed integers so that a hand-edited or corrupt
//! file can be detected line by line during restore instead of failing the
//! whole document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use webstore_core::{Money, ProductId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemSnapshot {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub price_per_unit: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub user_id: UserId,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<CartItemSnapshot>,
}
