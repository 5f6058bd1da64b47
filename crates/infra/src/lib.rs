//! Infrastructure layer: flat-file storage, configuration, and the services
//! (product catalog, cart engine) that sit on top of it.

pub mod cart_engine;
pub mod catalog;
pub mod config;
pub mod storage;

pub use cart_engine::{CartEngine, CartError, CheckoutError};
pub use catalog::{CatalogError, ProductCatalog};
pub use config::{BackendKind, ConfigError, StoreConfig};
