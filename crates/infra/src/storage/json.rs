//! JSON file backend: `<data_dir>/<entity_type>.json`, one array per file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::{StorageError, check_entity_type};
use super::table;
use super::r#trait::{Record, StorageBackend};

#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    data_dir: PathBuf,
}

impl JsonFileBackend {
    /// Open (and create if needed) the data directory.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, entity_type: &str) -> PathBuf {
        self.data_dir.join(format!("{entity_type}.json"))
    }

    fn read_table(&self, entity_type: &str) -> Result<Vec<Record>, StorageError> {
        check_entity_type(entity_type)?;
        let path = self.path(entity_type);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&path)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write through a sibling temp file so a crash never leaves half a document.
    fn write_table(&self, entity_type: &str, rows: &[Record]) -> Result<(), StorageError> {
        check_entity_type(entity_type)?;
        let path = self.path(entity_type);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(rows)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Move an unreadable file to `<entity_type>.json.corrupt` so the next write
    /// starts clean without losing the old bytes.
    fn set_aside(&self, entity_type: &str) -> Result<PathBuf, StorageError> {
        let path = self.path(entity_type);
        let target = path.with_extension("json.corrupt");
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
                warn!(entity_type, op, error = %err, "json write rejected");
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
                warn!(entity_type, op, error = %err, "json write failed");
                false
            }
        }
    }

    /// Remove every record of `entity_type`.
    pub fn clear_all(&self, entity_type: &str) -> bool {
        match self.write_table(entity_type, &[]) {
            Ok(()) => true,
            Err(err) => {
                warn!(entity_type, error = %err, "json clear failed");
                false
            }
        }
    }

    pub fn count(&self, entity_type: &str) -> usize {
        self.load_all(entity_type).len()
    }
}

impl StorageBackend for JsonFileBackend {
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
                warn!(entity_type, error = %err, "json read failed; treating as empty");
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
