//! Row set loading.
//!
//! Rows are read from JSON in one of two shapes:
//!
//! - an array of objects: `[{"name": "Alpha"}, ...]`
//! - an object with explicit field order: `{"fields": [...], "rows": [...]}`
//!
//! Without an explicit `fields` list the field order is the order in which
//! keys first appear across the rows.

use blockdeck_core::{Error, FieldValue, Result, Row};
use serde_json::Value;
use std::path::Path;

/// Rows plus the ordered field list every component expects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub fields: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Read a row set from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }
        let content = std::fs::read_to_string(path)?;
        let set = Self::from_json_str(&content)?;
        log::debug!(
            "Loaded {} rows with {} fields from {}",
            set.rows.len(),
            set.fields.len(),
            path.display()
        );
        Ok(set)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| Error::parse_error(format!("Invalid rows JSON: {}", e)))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let (declared, rows) = match value {
            Value::Array(rows) => (None, rows),
            Value::Object(map) => {
                let rows = map
                    .get("rows")
                    .and_then(Value::as_array)
                    .ok_or_else(|| Error::parse_error("Expected a \"rows\" array"))?;
                let fields = match map.get("fields") {
                    None | Some(Value::Null) => None,
                    Some(Value::Array(names)) => Some(
                        names
                            .iter()
                            .map(|n| {
                                n.as_str().map(str::to_string).ok_or_else(|| {
                                    Error::parse_error("Field names must be strings")
                                })
                            })
                            .collect::<Result<Vec<_>>>()?,
                    ),
                    Some(_) => return Err(Error::parse_error("\"fields\" must be an array")),
                };
                (fields, rows)
            }
            _ => {
                return Err(Error::parse_error(
                    "Expected an array of rows or an object with \"rows\"",
                ));
            }
        };

        let mut fields = declared.unwrap_or_default();
        let discover = fields.is_empty();
        let mut parsed = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let Value::Object(map) = row else {
                return Err(Error::parse_error(format!("Row {} is not an object", index)));
            };
            if discover {
                for key in map.keys() {
                    if !fields.contains(key) {
                        fields.push(key.clone());
                    }
                }
            }
            parsed.push(
                map.iter()
                    .map(|(k, v)| (k.clone(), field_value(v)))
                    .collect::<Row>(),
            );
        }

        Ok(Self {
            fields,
            rows: parsed,
        })
    }

    /// Replace the field order (e.g. from `--fields`)
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }
}

/// Nested arrays and objects are kept as their JSON text
fn field_value(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => n
            .as_f64()
            .map(FieldValue::Number)
            .unwrap_or_else(|| FieldValue::Text(n.to_string())),
        Value::String(s) => FieldValue::Text(s.clone()),
        other => FieldValue::Text(other.to_string()),
    }
}
