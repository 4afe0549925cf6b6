//! `{field}` placeholder rendering.

use blockdeck_core::ReservedFields;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// A `{key}` placeholder: everything between one `{` and the next `}`, no nesting
pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

/// Field name → substituted text
pub type TemplateValues = HashMap<String, String>;

/// Substitute every `{key}` in `template` with `values[key]`.
///
/// Keys are trimmed. Unknown keys, empty keys and reserved keys all render
/// as the empty string. CRLF line endings are normalized to LF first.
/// Unbalanced braces stay literal.
///
/// # Example
/// ```
/// use blockdeck_core::ReservedFields;
/// use blockdeck_parser::{TemplateValues, render_template};
///
/// let mut values = TemplateValues::new();
/// values.insert("name".into(), "Alpha".into());
/// values.insert("status".into(), "done".into());
///
/// let reserved = ReservedFields::standard();
/// assert_eq!(render_template("# { name } ({status})", &values, &reserved), "# Alpha ()");
/// ```
pub fn render_template(template: &str, values: &TemplateValues, reserved: &ReservedFields) -> String {
    let normalized = normalize_line_endings(template);
    PLACEHOLDER
        .replace_all(&normalized, |caps: &regex::Captures| {
            let key = caps[1].trim();
            if key.is_empty() || reserved.contains(key) {
                return String::new();
            }
            values.get(key).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Distinct placeholder keys in order of first appearance
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].trim().to_string())
        .filter(|key| !key.is_empty())
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}
