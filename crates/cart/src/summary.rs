//! Read-side views of a cart: totals summary and stock validation results.

use serde::{Serialize, Serializer};

use webstore_core::{Money, ProductId, UserId};

use crate::cart::{Cart, CartItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub total: Money,
    pub item_count: u64,
    pub is_empty: bool,
}

impl CartSummary {
    pub fn of(cart: &Cart) -> Self {
        Self {
            user_id: cart.user_id().clone(),
            items: cart.items().to_vec(),
            total: cart.total(),
            item_count: cart.item_count(),
            is_empty: cart.is_empty(),
        }
    }
}

/// A cart line that can no longer be fulfilled from current stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockIssue {
    ProductMissing {
        product_id: ProductId,
        product_name: String,
    },
    OutOfStock {
        product_id: ProductId,
        product_name: String,
    },
    Insufficient {
        product_id: ProductId,
        product_name: String,
        available: u32,
        in_cart: u32,
    },
}

impl StockIssue {
    pub fn product_id(&self) -> &ProductId {
        match self {
            StockIssue::ProductMissing { product_id, .. }
            | StockIssue::OutOfStock { product_id, .. }
            | StockIssue::Insufficient { product_id, .. } => product_id,
        }
    }
}

impl core::fmt::Display for StockIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StockIssue::ProductMissing { product_name, .. } => {
                write!(f, "Product {product_name} no longer exists")
            }
            StockIssue::OutOfStock { product_name, .. } => {
                write!(f, "Product {product_name} is out of stock")
            }
            StockIssue::Insufficient {
                product_name,
                available,
                in_cart,
                ..
            } => write!(
                f,
                "Only {available} of {product_name} available, but {in_cart} in cart"
            ),
        }
    }
}

impl Serialize for StockIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of checking every cart line against live stock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockValidation {
    pub valid: bool,
    pub issues: Vec<StockIssue>,
}

impl StockValidation {
    pub fn from_issues(issues: Vec<StockIssue>) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}
