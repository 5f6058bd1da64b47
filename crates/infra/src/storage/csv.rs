//! CSV file backend: `<data_dir>/<entity_type>.csv` with a fixed header per entity type.
//!
//! Cells are text, so each column carries a `ColumnKind` describing how values
//! are coerced on read and flattened on write. Nested values (the cart table)
//! live in `Json` columns. Fields outside the schema are not stored.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::warn;

use super::error::{StorageError, check_entity_type};
use super::schema::CsvSchema;
use super::table;
use super::r#trait::{Record, StorageBackend};

#[derive(Debug, Clone)]
pub struct CsvFileBackend {
    data_dir: PathBuf,
    schemas: HashMap<String, CsvSchema>,
}

impl CsvFileBackend {
    /// Open (and create if needed) the data directory with the default schemas.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        let schemas = CsvSchema::defaults()
            .into_iter()
            .map(|s| (s.entity_type().to_string(), s))
            .collect();
        Ok(Self { data_dir, schemas })
    }

    /// Register (or replace) the layout for one entity type.
    pub fn with_schema(mut self, schema: CsvSchema) -> Self {
        self.schemas.insert(schema.entity_type().to_string(), schema);
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, entity_type: &str) -> PathBuf {
        self.data_dir.join(format!("{entity_type}.csv"))
    }

    fn schema(&self, entity_type: &str) -> Result<&CsvSchema, StorageError> {
        check_entity_type(entity_type)?;
        self.schemas
            .get(entity_type)
            .ok_or_else(|| StorageError::UnknownEntity(entity_type.to_string()))
    }

    fn read_table(&self, entity_type: &str) -> Result<Vec<Record>, StorageError> {
        let schema = self.schema(entity_type)?;
        let path = self.path(entity_type);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&path)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();
        if !headers.iter().any(|h| h == "id") {
            return Err(StorageError::Malformed {
                entity_type: entity_type.to_string(),
                reason: "header has no id column".to_string(),
            });
        }

        // Position of each schema column in this file, if present.
        let positions: Vec<Option<usize>> = schema
            .columns()
            .iter()
            .map(|c| headers.iter().position(|h| h == c.name))
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let cells = result?;
            let mut record = Record::new();
            for (column, position) in schema.columns().iter().zip(&positions) {
                let value = match position.and_then(|i| cells.get(i)) {
                    Some(cell) => column.kind.decode(cell),
                    None => JsonValue::Null,
                };
                record.insert(column.name.clone(), value);
            }
            rows.push(record);
        }
        Ok(rows)
    }

    /// Write through a sibling temp file so a crash never leaves a truncated table.
    fn write_table(&self, entity_type: &str, rows: &[Record]) -> Result<(), StorageError> {
        let schema = self.schema(entity_type)?;
        let path = self.path(entity_type);
        let tmp = path.with_extension("csv.tmp");

        let mut writer = ::csv::Writer::from_path(&tmp)?;
        writer.write_record(schema.header())?;
        for row in rows {
            let cells: Vec<String> = schema
                .columns()
                .iter()
                .map(|c| c.kind.encode(row.get(&c.name)))
                .collect();
            writer.write_record(&cells)?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Move an unreadable file to `<entity_type>.csv.corrupt` so the next write
    /// starts clean without losing the old bytes.
    fn set_aside(&self, entity_type: &str) -> Result<PathBuf, StorageError> {
        let path = self.path(entity_type);
        let target = path.with_extension("csv.corrupt");
        fs::rename(&path, &target)?;
        Ok(target)
    }

    fn modify<F>(&self, entity_type: &str, op: &'static str, edit: F) -> bool
    where
        F: FnOnce(&mut Vec<Record>) -> bool,
    {
        let mut rows = match self.read_table(entity_type) {
            Ok(rows) => rows,
            Err(err @ StorageError::UnknownEntity(_)) => {
                warn!(entity_type, op, error = %err, "csv write rejected");
                return false;
            }
            Err(err) => match self.set_aside(entity_type) {
                Ok(moved_to) => {
                    warn!(
                        entity_type,
                        op,
                        error = %err,
                        moved_to = %moved_to.display(),
                        "existing data unreadable; kept a copy and starting from empty"
                    );
                    Vec::new()
                }
                Err(move_err) => {
                    warn!(
                        entity_type,
                        op,
                        error = %err,
                        move_error = %move_err,
                        "refusing to write: existing data unreadable"
                    );
                    return false;
                }
            },
        };
        if !edit(&mut rows) {
            return false;
        }
        match self.write_table(entity_type, &rows) {
            Ok(()) => true,
            Err(err) => {
                warn!(entity_type, op, error = %err, "csv write failed");
                false
            }
        }
    }

    /// Truncate the table to just its header.
    pub fn clear_all(&self, entity_type: &str) -> bool {
        match self.write_table(entity_type, &[]) {
            Ok(()) => true,
            Err(err) => {
                warn!(entity_type, error = %err, "csv clear failed");
                false
            }
        }
    }

    pub fn count(&self, entity_type: &str) -> usize {
        self.load_all(entity_type).len()
    }
}

impl StorageBackend for CsvFileBackend {
    fn save(&self, entity_type: &str, record: Record) -> bool {
        self.modify(entity_type, "save", |rows| {
            table::upsert(rows, record);
            true
        })
    }

    fn load_all(&self, entity_type: &str) -> Vec<Record> {
        match self.read_table(entity_type) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(entity_type, error = %err, "csv read failed; treating as empty");
                Vec::new()
            }
        }
    }

    fn update(&self, entity_type: &str, id: &str, fields: Record) -> bool {
        self.modify(entity_type, "update", |rows| table::merge(rows, id, fields))
    }

    fn delete(&self, entity_type: &str, id: &str) -> bool {
        self.modify(entity_type, "delete", |rows| table::remove(rows, id))
    }
}
