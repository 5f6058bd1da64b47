use std::collections::HashMap;
use std::sync::RwLock;

use super::table;
use super::r#trait::{Record, StorageBackend};

/// In-memory backend for tests/dev.
///
/// Same upsert/merge semantics as the file backends, no persistence.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for InMemoryBackend {
    fn save(&self, entity_type: &str, record: Record) -> bool {
        let Ok(mut tables) = self.tables.write() else {
            return false;
        };
        table::upsert(tables.entry(entity_type.to_string()).or_default(), record);
        true
    }

    fn load_all(&self, entity_type: &str) -> Vec<Record> {
        let tables = match self.tables.read() {
            Ok(t) => t,
            Err(_) => return vec![],
        };
        tables.get(entity_type).cloned().unwrap_or_default()
    }

    fn update(&self, entity_type: &str, id: &str, fields: Record) -> bool {
        let Ok(mut tables) = self.tables.write() else {
            return false;
        };
        tables
            .get_mut(entity_type)
            .is_some_and(|rows| table::merge(rows, id, fields))
    }

    fn delete(&self, entity_type: &str, id: &str) -> bool {
        let Ok(mut tables) = self.tables.write() else {
            return false;
        };
        tables
            .get_mut(entity_type)
            .is_some_and(|rows| table::remove(rows, id))
    }
}
