//! Product catalog domain module.
//!
//! This crate contains the product model and its validation rules, implemented
//! purely as deterministic domain logic (no IO, no storage).

pub mod product;

pub use product::{ExpectedStock, NewProduct, Product, ProductRecord};
