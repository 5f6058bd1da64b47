//! Flat-file storage boundary.
//!
//! This module defines the record-oriented storage abstraction used by the
//! catalog and the cart engine, plus three interchangeable backends:
//! - `JsonFileBackend`: one pretty-printed JSON array per entity type
//! - `CsvFileBackend`: one CSV file per entity type, fixed typed columns
//! - `InMemoryBackend`: tests/dev
//!
//! Backends never return errors to callers. Failures are logged and reported
//! as "no data" (reads) or `false` (writes); the in-memory state held by the
//! services stays the source of truth for the rest of the process.

pub mod csv;
pub mod error;
pub mod in_memory;
pub mod json;
pub mod schema;
mod table;
pub mod r#trait;

pub use self::csv::CsvFileBackend;
pub use error::StorageError;
pub use in_memory::InMemoryBackend;
pub use json::JsonFileBackend;
pub use schema::{Column, ColumnKind, CsvSchema};
pub use r#trait::{Record, StorageBackend, matches_filter, record_id};
