//! Row-level edits shared by the whole-table backends.

use super::r#trait::{Record, record_id};

pub(crate) fn upsert(rows: &mut Vec<Record>, record: Record) {
    let existing = record_id(&record)
        .and_then(|id| rows.iter().position(|r| record_id(r) == Some(id)));
    match existing {
        Some(idx) => rows[idx] = record,
        None => rows.push(record),
    }
}

/// Merge `fields` into the row with `id`; `false` when there is none.
pub(crate) fn merge(rows: &mut [Record], id: &str, fields: Record) -> bool {
    let Some(row) = rows.iter_mut().find(|r| record_id(r) == Some(id)) else {
        return false;
    };
    for (key, value) in fields {
        if key != "id" {
            row.insert(key, value);
        }
    }
    true
}

/// Drop the row with `id`; `false` when there is none.
pub(crate) fn remove(rows: &mut Vec<Record>, id: &str) -> bool {
    let before = rows.len();
    rows.retain(|r| record_id(r) != Some(id));
    rows.len() < before
}
