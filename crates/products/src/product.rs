use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use webstore_core::{DomainError, DomainResult, Entity, Money, ProductId};

/// Input for creating a product (the id is assigned by the catalog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub category: String,
    pub stock: u32,
    pub description: String,
}

/// Flat storage shape of a product.
///
/// Every field is loosely typed so that records written by hand (or by an older
/// build) can be read and then validated by `Product::try_from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub price: i64,
    pub category: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Entity: Product.
///
/// Updates are by value: `with_stock` / `with_price` return a new product with
/// the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord", into = "ProductRecord")]
pub struct Product {
    id: ProductId,
    name: String,
    price: Money,
    category: String,
    stock: u32,
    description: String,
    created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(id: ProductId, input: NewProduct, created_at: DateTime<Utc>) -> DomainResult<Self> {
        if id.as_str().trim().is_empty() {
            return Err(DomainError::invalid_id("product id cannot be empty"));
        }
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(Self {
            id,
            name: input.name,
            price: input.price,
            category: input.category,
            stock: input.stock,
            description: input.description,
            created_at,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// A product can be put in a cart only while it has stock.
    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    pub fn can_fulfil(&self, quantity: u32) -> bool {
        self.is_available() && self.stock >= quantity
    }

    pub fn with_stock(&self, stock: u32) -> Self {
        Self {
            stock,
            ..self.clone()
        }
    }

    pub fn with_price(&self, price: Money) -> Self {
        Self {
            price,
            ..self.clone()
        }
    }

    /// Stock left after selling `quantity` units, if there is enough.
    pub fn stock_after_sale(&self, quantity: u32) -> DomainResult<u32> {
        self.stock.checked_sub(quantity).ok_or_else(|| {
            DomainError::invariant(format!(
                "stock cannot go negative ({} available, {} requested)",
                self.stock, quantity
            ))
        })
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let price = u64::try_from(record.price)
            .map_err(|_| DomainError::validation("price cannot be negative"))?;
        let stock = u32::try_from(record.stock)
            .map_err(|_| DomainError::validation("stock must be between 0 and u32::MAX"))?;

        Product::new(
            ProductId::new(record.id),
            NewProduct {
                name: record.name,
                price: Money::from_cents(price),
                category: record.category,
                stock,
                description: record.description,
            },
            record.created_at.unwrap_or_else(Utc::now),
        )
    }
}

impl From<Product> for ProductRecord {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.into_inner(),
            name: product.name,
            price: i64::try_from(product.price.cents()).unwrap_or(i64::MAX),
            category: product.category,
            stock: i64::from(product.stock),
            description: product.description,
            created_at: Some(product.created_at),
        }
    }
}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let status = if self.is_available() {
            "Available"
        } else {
            "Out of Stock"
        };
        write!(f, "{} - {} ({}) - {}", self.name, self.price, self.category, status)
    }
}

/// Optimistic concurrency expectation for a stock write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedStock {
    /// Skip the check (manual stock corrections).
    Any,
    /// Require the stored stock to still be exactly this value.
    Exact(u32),
}

impl ExpectedStock {
    pub fn matches(self, actual: u32) -> bool {
        match self {
            ExpectedStock::Any => true,
            ExpectedStock::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u32) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "stock changed since it was read (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn laptop() -> Product {
        Product::new(
            ProductId::new("PRD-0000LAPT"),
            NewProduct {
                name: "Gaming Laptop".to_string(),
                price: Money::from_cents(129_999),
                category: "Electronics".to_string(),
                stock: 5,
                description: "Fast".to_string(),
            },
            test_time(),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_blank_name() {
        let err = Product::new(
            ProductId::new("PRD-1"),
            NewProduct {
                name: "   ".to_string(),
                price: Money::ZERO,
                category: String::new(),
                stock: 0,
                description: String::new(),
            },
            test_time(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("name cannot be empty") => {}
            _ => panic!("Expected Validation error for blank name"),
        }
    }

    #[test]
    fn availability_follows_stock() {
        let product = laptop();
        assert!(product.is_available());
        assert!(product.can_fulfil(5));
        assert!(!product.can_fulfil(6));

        let sold_out = product.with_stock(0);
        assert!(!sold_out.is_available());
        assert!(!sold_out.can_fulfil(0));
    }

    #[test]
    fn with_stock_keeps_identity_and_leaves_original_untouched() {
        let product = laptop();
        let updated = product.with_stock(2);

        assert_eq!(updated.id(), product.id());
        assert_eq!(updated.stock(), 2);
        assert_eq!(product.stock(), 5);
        assert_eq!(updated.created_at(), product.created_at());
    }

    #[test]
    fn stock_after_sale_refuses_to_go_negative() {
        let product = laptop();
        assert_eq!(product.stock_after_sale(5).unwrap(), 0);
        assert!(matches!(
            product.stock_after_sale(6),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn record_validation_rejects_negative_values() {
        let mut record = ProductRecord::from(laptop());
        record.price = -1;
        assert!(Product::try_from(record.clone()).is_err());

        record.price = 100;
        record.stock = -3;
        assert!(Product::try_from(record).is_err());
    }

    #[test]
    fn deserializes_legacy_record_with_defaults() {
        let json = serde_json::json!({
            "id": "PRD-ABCDEF12",
            "name": "Coffee Mug",
            "price": 1499,
            "category": "Home"
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.stock(), 0);
        assert_eq!(product.description(), "");
        assert_eq!(product.price(), Money::from_cents(1499));
    }

    #[test]
    fn search_matches_name_or_description_case_insensitively() {
        let product = laptop();
        assert!(product.matches_query("LAPTOP"));
        assert!(product.matches_query("fast"));
        assert!(!product.matches_query("mug"));
    }

    #[test]
    fn display_mentions_price_and_status() {
        let product = laptop();
        assert_eq!(
            product.to_string(),
            "Gaming Laptop - 1299.99 (Electronics) - Available"
        );
        assert!(product.with_stock(0).to_string().ends_with("Out of Stock"));
    }

    #[test]
    fn expected_stock_check() {
        assert!(ExpectedStock::Any.check(7).is_ok());
        assert!(ExpectedStock::Exact(7).check(7).is_ok());
        assert!(matches!(
            ExpectedStock::Exact(7).check(6),
            Err(DomainError::Conflict(_))
        ));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: the storage record round-trips every valid product.
            #[test]
            fn record_roundtrip_preserves_product(
                name in "[A-Za-z][A-Za-z0-9 ]{0,40}",
                price in 0u64..10_000_000,
                stock in 0u32..100_000,
            ) {
                let product = Product::new(
                    ProductId::new("PRD-PROPTEST"),
                    NewProduct {
                        name,
                        price: Money::from_cents(price),
                        category: "Test".to_string(),
                        stock,
                        description: String::new(),
                    },
                    Utc::now(),
                ).unwrap();

                let back = Product::try_from(ProductRecord::from(product.clone())).unwrap();
                prop_assert_eq!(back, product);
            }

            /// Property: selling never yields more stock than before and fails exactly when short.
            #[test]
            fn stock_after_sale_is_exact(stock in 0u32..10_000, quantity in 0u32..10_000) {
                let product = Product::new(
                    ProductId::new("PRD-PROPTEST"),
                    NewProduct {
                        name: "Widget".to_string(),
                        price: Money::ZERO,
                        category: String::new(),
                        stock,
                        description: String::new(),
                    },
                    Utc::now(),
                ).unwrap();

                match product.stock_after_sale(quantity) {
                    Ok(left) => prop_assert_eq!(left + quantity, stock),
                    Err(_) => prop_assert!(quantity > stock),
                }
            }
        }
    }
}
