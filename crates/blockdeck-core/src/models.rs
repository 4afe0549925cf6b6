//! Core data models: rows, field values, reserved fields and body blocks.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Field holding the block heading marker (`#` column in table view)
pub const HEADING_FIELD: &str = "#";
/// Internal row identifier assigned by the data store
pub const ROW_ID_FIELD: &str = "__rowId";
/// Internal kanban status key
pub const INTERNAL_STATUS_FIELD: &str = "__status";
/// Internal ordering index
pub const INDEX_FIELD: &str = "__index";
/// User-visible status column
pub const STATUS_FIELD: &str = "status";
/// Timestamp of the last status change
pub const STATUS_CHANGED_FIELD: &str = "statusChanged";

/// Every reserved field name. Components must exclude exactly these keys.
pub const RESERVED_FIELD_NAMES: [&str; 6] = [
    HEADING_FIELD,
    ROW_ID_FIELD,
    INTERNAL_STATUS_FIELD,
    INDEX_FIELD,
    STATUS_FIELD,
    STATUS_CHANGED_FIELD,
];

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Trimmed string form, `None` for null or blank values
    pub fn display(&self) -> Option<String> {
        let raw = match self {
            FieldValue::Null => return None,
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
        };
        if raw.is_empty() { None } else { Some(raw) }
    }}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// One structured record extracted from a Markdown block.
///
/// Owned by the data store; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: HashMap<String, FieldValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Trimmed string form of a field, `None` when absent or blank
    pub fn display_value(&self, field: &str) -> Option<String> {
        self.values.get(field).and_then(FieldValue::display)
    }

    /// Raw string form of a field (untrimmed, empty for null/absent)
    pub fn raw_value(&self, field: &str) -> String {
        self.values
            .get(field)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The set of field names that never take part in templating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedFields {
    names: HashSet<String>,
}

impl ReservedFields {
    /// The standard reserved set shared by every component
    pub fn standard() -> Self {
        Self::from_names(RESERVED_FIELD_NAMES)
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.names.contains(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for ReservedFields {
    fn default() -> Self {
        Self::standard()
    }
}

/// Content fields in their original order, reserved fields removed.
pub fn content_fields<S: AsRef<str>>(fields: &[S], reserved: &ReservedFields) -> Vec<String> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .map(AsRef::as_ref)
        .filter(|f| !reserved.contains(f))
        .filter(|f| seen.insert(*f))
        .map(str::to_string)
        .collect()
}

/// One renderable unit of a rendered body template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BodyBlock {
    Text { text: String },
    Image { markdown: String },
}

impl BodyBlock {
    pub fn text(text: impl Into<String>) -> Self {
        BodyBlock::Text { text: text.into() }
    }

    pub fn image(markdown: impl Into<String>) -> Self {
        BodyBlock::Image {
            markdown: markdown.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, BodyBlock::Image { .. })
    }

    /// Text for text blocks, embed markdown for image blocks
    pub fn content(&self) -> &str {
        match self {
            BodyBlock::Text { text } => text,
            BodyBlock::Image { markdown } => markdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value_trims_and_omits_blank() {
        let row = Row::new()
            .with("name", "  Alpha  ")
            .with("blank", "   ")
            .with("none", FieldValue::Null);

        assert_eq!(row.display_value("name").as_deref(), Some("Alpha"));
        assert_eq!(row.display_value("blank"), None);
        assert_eq!(row.display_value("none"), None);
        assert_eq!(row.display_value("missing"), None);
    }

    #[test]
    fn test_number_display() {
        assert_eq!(FieldValue::Number(3.0).display().as_deref(), Some("3"));
        assert_eq!(FieldValue::Number(2.5).display().as_deref(), Some("2.5"));
        assert_eq!(FieldValue::Bool(true).display().as_deref(), Some("true"));
    }

    #[test]
    fn test_row_deserializes_scalars() {
        let row: Row =
            serde_json::from_str(r#"{"name": "Alpha", "count": 4, "done": false, "note": null}"#)
                .unwrap();
        assert_eq!(row.get("name"), Some(&FieldValue::Text("Alpha".into())));
        assert_eq!(row.get("count"), Some(&FieldValue::Number(4.0)));
        assert_eq!(row.get("done"), Some(&FieldValue::Bool(false)));
        assert_eq!(row.get("note"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_standard_reserved_fields() {
        let reserved = ReservedFields::standard();
        for name in RESERVED_FIELD_NAMES {
            assert!(reserved.contains(name));
        }
        assert!(!reserved.contains("name"));
    }

    #[test]
    fn test_content_fields_excludes_reserved_and_duplicates() {
        let fields = ["#", "name", "status", "cover", "name", "__rowId"];
        let content = content_fields(&fields, &ReservedFields::standard());
        assert_eq!(content, vec!["name", "cover"]);
    }

    #[test]
    fn test_body_block_serialization() {
        let json = serde_json::to_string(&BodyBlock::image("![[a.png]]")).unwrap();
        assert_eq!(json, r#"{"type":"image","markdown":"![[a.png]]"}"#);
        let json = serde_json::to_string(&BodyBlock::text("hi")).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"hi"}"#);
    }
}
