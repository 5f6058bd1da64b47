use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

/// A flat record: string keys to JSON scalars (nested values only where the
/// backend supports them).
pub type Record = Map<String, JsonValue>;

/// Returns the record's `id` field when it is a string.
pub fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(JsonValue::as_str)
}

/// Field-equality filter; an empty filter matches everything.
pub fn matches_filter(record: &Record, filter: &Record) -> bool {
    filter
        .iter()
        .all(|(key, expected)| record.get(key) == Some(expected))
}

/// Record-oriented persistence keyed by entity type and id.
///
/// ## Semantics
///
/// - `save` upserts: a record whose `id` already exists replaces the stored one,
///   anything else is appended
/// - `update` merges `fields` into the stored record (the `id` is kept)
/// - reads of an entity type that was never written return nothing
///
/// ## Failure model
///
/// Implementations catch their own IO/encoding failures, log them, and return
/// `false` / empty / `None`. An unreadable file reads as empty; the next write
/// moves it aside (`*.corrupt`) and replaces it with the caller's data.
pub trait StorageBackend: Send + Sync {
    fn save(&self, entity_type: &str, record: Record) -> bool;

    fn load_all(&self, entity_type: &str) -> Vec<Record>;

    fn load_by_id(&self, entity_type: &str, id: &str) -> Option<Record> {
        self.load_all(entity_type)
            .into_iter()
            .find(|r| record_id(r) == Some(id))
    }

    fn load_by_filter(&self, entity_type: &str, filter: &Record) -> Vec<Record> {
        self.load_all(entity_type)
            .into_iter()
            .filter(|r| matches_filter(r, filter))
            .collect()
    }

    fn update(&self, entity_type: &str, id: &str, fields: Record) -> bool;

    fn delete(&self, entity_type: &str, id: &str) -> bool;

    fn exists(&self, entity_type: &str, id: &str) -> bool {
        self.load_by_id(entity_type, id).is_some()
    }
}

impl<S> StorageBackend for Arc<S>
where
    S: StorageBackend + ?Sized,
{
    fn save(&self, entity_type: &str, record: Record) -> bool {
        (**self).save(entity_type, record)
    }

    fn load_all(&self, entity_type: &str) -> Vec<Record> {
        (**self).load_all(entity_type)
    }

    fn load_by_id(&self, entity_type: &str, id: &str) -> Option<Record> {
        (**self).load_by_id(entity_type, id)
    }

    fn load_by_filter(&self, entity_type: &str, filter: &Record) -> Vec<Record> {
        (**self).load_by_filter(entity_type, filter)
    }

    fn update(&self, entity_type: &str, id: &str, fields: Record) -> bool {
        (**self).update(entity_type, id, fields)
    }

    fn delete(&self, entity_type: &str, id: &str) -> bool {
        (**self).delete(entity_type, id)
    }

    fn exists(&self, entity_type: &str, id: &str) -> bool {
        (**self).exists(entity_type, id)
    }
}
