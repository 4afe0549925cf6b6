//! Decomposition of templates into editable segments and back.
//!
//! A template such as `"{name} lives in {city}"` becomes
//! `[Field(name), Text(" lives in "), Field(city)]`. Serializing the
//! segments reproduces the template: field segments always emit `{name}`,
//! whatever value the user typed into them.

use crate::template::PLACEHOLDER;
use blockdeck_core::{ReservedFields, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One editable unit of a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TemplateSegment {
    /// Literal template text
    Text { text: String },
    /// A `{name}` placeholder with its current value
    Field { name: String, value: String },
}

impl TemplateSegment {
    pub fn text(text: impl Into<String>) -> Self {
        TemplateSegment::Text { text: text.into() }
    }

    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        TemplateSegment::Field {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Split `template` into literal and field segments.
///
/// A placeholder is a field segment only when its trimmed key is one of
/// `fields` and not reserved; any other placeholder is replaced by an empty
/// literal segment. Field values come from `live_values` when present
/// (edits made earlier in the session), otherwise from the row.
pub fn parse_into_segments<S: AsRef<str>>(
    template: &str,
    row: &Row,
    fields: &[S],
    reserved: &ReservedFields,
    live_values: &HashMap<String, String>,
) -> Vec<TemplateSegment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(TemplateSegment::text(&template[last..whole.start()]));
        }
        last = whole.end();

        let key = caps[1].trim();
        let known = !key.is_empty()
            && !reserved.contains(key)
            && fields.iter().any(|f| f.as_ref() == key);

        if known {
            let value = live_values
                .get(key)
                .cloned()
                .or_else(|| row.display_value(key))
                .unwrap_or_default();
            segments.push(TemplateSegment::field(key, value));
        } else {
            log::debug!("Dropping placeholder {{{}}}: not an editable field", key);
            segments.push(TemplateSegment::text(""));
        }
    }

    if last < template.len() {
        segments.push(TemplateSegment::text(&template[last..]));
    }

    segments
}

/// Rebuild the template string from segments
pub fn serialize_segments(segments: &[TemplateSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            TemplateSegment::Text { text } => out.push_str(text),
            TemplateSegment::Field { name, .. } => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
    }
    out
}
