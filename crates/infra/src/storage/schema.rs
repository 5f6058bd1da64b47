//! Fixed column layouts for the CSV backend.

use serde_json::Value as JsonValue;

/// How a CSV cell is converted to and from a record value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Always a string (an empty cell is an empty string).
    Text,
    /// A string, or null when the cell is empty.
    NullableText,
    /// An integer; an empty cell is null and an unparsable cell stays a string.
    Integer,
    /// Embedded JSON document (nested values).
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSchema {
    entity_type: String,
    columns: Vec<Column>,
}

impl CsvSchema {
    pub fn new<'a>(
        entity_type: impl Into<String>,
        columns: impl IntoIterator<Item = (&'a str, ColumnKind)>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            columns: columns
                .into_iter()
                .map(|(name, kind)| Column {
                    name: name.to_string(),
                    kind,
                })
                .collect(),
        }
    }

    /// Layouts for the entity types the storefront writes.
    pub fn defaults() -> Vec<CsvSchema> {
        use ColumnKind::*;
        vec![
            CsvSchema::new(
                "products",
                [
                    ("id", Text),
                    ("name", Text),
                    ("price", Integer),
                    ("category", Text),
                    ("stock", Integer),
                    ("description", Text),
                    ("created_at", NullableText),
                ],
            ),
            CsvSchema::new("carts", [("id", Text), ("carts", Json)]),
        ]
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

impl ColumnKind {
    pub fn encode(self, value: Option<&JsonValue>) -> String {
        match (self, value) {
            (_, None) | (_, Some(JsonValue::Null)) => String::new(),
            (ColumnKind::Json, Some(v)) => v.to_string(),
            (_, Some(JsonValue::String(s))) => s.clone(),
            (_, Some(v)) => v.to_string(),
        }
    }

    pub fn decode(self, cell: &str) -> JsonValue {
        match self {
            ColumnKind::Text => JsonValue::String(cell.to_string()),
            _ if cell.is_empty() => JsonValue::Null,
            ColumnKind::NullableText => JsonValue::String(cell.to_string()),
            ColumnKind::Integer => cell
                .trim()
                .parse::<i64>()
                .map(JsonValue::from)
                .unwrap_or_else(|_| JsonValue::String(cell.to_string())),
            ColumnKind::Json => serde_json::from_str(cell)
                .unwrap_or_else(|_| JsonValue::String(cell.to_string())),
        }
    }
}
