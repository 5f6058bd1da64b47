//! Shopping cart domain module.
//!
//! This crate contains the cart aggregate, the order produced at checkout and
//! the read-side shapes (summary, stock validation, persisted snapshot),
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod cart;
pub mod order;
pub mod snapshot;
pub mod summary;

pub use cart::{Cart, CartItem};
pub use order::{Order, OrderStatus};
pub use snapshot::{CartItemSnapshot, CartSnapshot};
pub use summary::{CartSummary, StockIssue, StockValidation};
