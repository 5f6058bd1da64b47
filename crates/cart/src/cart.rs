use chrono::{DateTime, Utc};
use serde::Serialize;

use webstore_core::{
    AggregateRoot, DomainError, DomainResult, Money, ProductId, UserId, ValueObject,
};

use crate::snapshot::{CartItemSnapshot, CartSnapshot};

/// One product line in a cart.
///
/// Name and unit price are snapshots taken when the product was first added;
/// they are not refreshed when more units of the same product are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    product_id: ProductId,
    product_name: String,
    quantity: u32,
    price_per_unit: Money,
}

impl ValueObject for CartItem {}

impl CartItem {
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: u32,
        price_per_unit: Money,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(Self {
            product_id,
            product_name: product_name.into(),
            quantity,
            price_per_unit,
        })
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price_per_unit(&self) -> Money {
        self.price_per_unit
    }

    /// `quantity × price_per_unit`, saturating on overflow.
    pub fn total_price(&self) -> Money {
        self.price_per_unit
            .checked_mul(self.quantity)
            .unwrap_or(Money::from_cents(u64::MAX))
    }

    /// Same line with a different quantity.
    pub fn with_quantity(&self, quantity: u32) -> DomainResult<Self> {
        Self::new(
            self.product_id.clone(),
            self.product_name.clone(),
            quantity,
            self.price_per_unit,
        )
    }

    pub fn snapshot(&self) -> CartItemSnapshot {
        CartItemSnapshot {
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
            quantity: i64::from(self.quantity),
            price_per_unit: self.price_per_unit,
        }
    }
}

/// Aggregate root: Cart.
///
/// Holds at most one line per product, in insertion order. Lines are replaced
/// by index, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    user_id: UserId,
    items: Vec<CartItem>,
    created_at: DateTime<Utc>,
    version: u64,
}

impl Cart {
    pub fn new(user_id: UserId) -> Self {
        Self::with_created_at(user_id, Utc::now())
    }

    /// Empty cart with a known creation time (used when restoring from disk).
    pub fn with_created_at(user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            created_at,
            version: 0,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items.iter().position(|i| &i.product_id == product_id)
    }

    /// Add `quantity` units, merging into an existing line for the same product.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        product_name: impl Into<String>,
        price: Money,
        quantity: u32,
    ) -> DomainResult<()> {
        match self.position(&product_id) {
            Some(idx) => {
                let existing = &self.items[idx];
                let merged = existing.quantity.checked_add(quantity).ok_or_else(|| {
                    DomainError::validation("quantity exceeds the supported maximum")
                })?;
                let updated = existing.with_quantity(merged)?;
                self.items[idx] = updated;
            }
            None => {
                let item = CartItem::new(product_id, product_name, quantity, price)?;
                self.items.push(item);
            }
        }
        self.version += 1;
        Ok(())
    }

    /// Remove the line for `product_id`; `false` when there was none.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        match self.position(product_id) {
            Some(idx) => {
                self.items.remove(idx);
                self.version += 1;
                true
            }
            None => false,
        }
    }

    /// Set the quantity of an existing line. Zero or less removes the line.
    pub fn update_item_quantity(&mut self, product_id: &ProductId, new_quantity: i64) -> bool {
        if new_quantity <= 0 {
            return self.remove_item(product_id);
        }
        let Ok(quantity) = u32::try_from(new_quantity) else {
            return false;
        };
        let Some(idx) = self.position(product_id) else {
            return false;
        };
        match self.items[idx].with_quantity(quantity) {
            Ok(item) => {
                self.items[idx] = item;
                self.version += 1;
                true
            }
            Err(_) => false,
        }
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::total_price).sum()
    }

    /// Number of units across all lines (not the number of lines).
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.version += 1;
        }
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            user_id: self.user_id.clone(),
            created_at: self.created_at,
            items: self.items.iter().map(CartItem::snapshot).collect(),
        }
    }
}

impl AggregateRoot for Cart {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.user_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl core::fmt::Display for Cart {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            return f.write_str("Empty cart");
        }
        write!(f, "Cart: {} items, {}", self.item_count(), self.total())
    }
}
