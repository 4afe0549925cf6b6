//! In-place editing of a page's template.
//!
//! A session parses the title and body templates into segments. Field
//! segments share one value per field name: setting `name` once updates every
//! `{name}` occurrence in both title and body. On save the segments are
//! serialized back into templates and the changed field values are reported
//! separately, so values never get baked into the template text.

use blockdeck_core::{Error, ReservedFields, Result, Row, TextTemplate};
use blockdeck_parser::{TemplateSegment, parse_into_segments, serialize_segments};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplatePart {
    Title,
    Body,
}

/// Address of one segment inside a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SegmentHandle {
    pub part: TemplatePart,
    pub index: usize,
}

/// Result of saving an edit session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEditOutcome {
    /// Reconstructed templates (layouts carried over from the original)
    pub template: TextTemplate,
    /// Fields whose value differs from the row's stored value
    pub changed_values: BTreeMap<String, String>,
}

impl TemplateEditOutcome {
    pub fn has_value_changes(&self) -> bool {
        !self.changed_values.is_empty()
    }
}

/// Transient editing state for one page
#[derive(Debug, Clone)]
pub struct TemplateEditSession {
    base: TextTemplate,
    stored: HashMap<String, String>,
    values: HashMap<String, String>,
    title: Vec<TemplateSegment>,
    body: Vec<TemplateSegment>,
    bindings: HashMap<String, Vec<SegmentHandle>>,
}

impl TemplateEditSession {
    /// Start editing `template` for `row`
    pub fn begin(
        template: &TextTemplate,
        row: &Row,
        fields: &[String],
        reserved: &ReservedFields,
    ) -> Self {
        Self::begin_with_values(template, row, fields, reserved, &HashMap::new())
    }

    /// Start editing with values typed earlier taking precedence over the row
    pub fn begin_with_values(
        template: &TextTemplate,
        row: &Row,
        fields: &[String],
        reserved: &ReservedFields,
        live_values: &HashMap<String, String>,
    ) -> Self {
        let title =
            parse_into_segments(&template.title_template, row, fields, reserved, live_values);
        let body = parse_into_segments(&template.body_template, row, fields, reserved, live_values);

        let mut session = Self {
            base: template.clone(),
            stored: HashMap::new(),
            values: HashMap::new(),
            title,
            body,
            bindings: HashMap::new(),
        };

        let handles: Vec<(String, String, SegmentHandle)> = session
            .handles()
            .into_iter()
            .filter_map(|handle| match session.segment(handle) {
                Some(TemplateSegment::Field { name, value }) => {
                    Some((name.clone(), value.clone(), handle))
                }
                _ => None,
            })
            .collect();

        for (name, value, handle) in handles {
            session
                .stored
                .entry(name.clone())
                .or_insert_with(|| row.display_value(&name).unwrap_or_default());
            session.values.entry(name.clone()).or_insert(value);
            session.bindings.entry(name).or_default().push(handle);
        }

        // The first occurrence wins; make every occurrence agree with it
        let values = session.values.clone();
        for (name, value) in values {
            session.write_value(&name, &value);
        }

        session
    }

    fn handles(&self) -> Vec<SegmentHandle> {
        let title = (0..self.title.len()).map(|index| SegmentHandle {
            part: TemplatePart::Title,
            index,
        });
        let body = (0..self.body.len()).map(|index| SegmentHandle {
            part: TemplatePart::Body,
            index,
        });
        title.chain(body).collect()
    }

    fn part(&self, part: TemplatePart) -> &Vec<TemplateSegment> {
        match part {
            TemplatePart::Title => &self.title,
            TemplatePart::Body => &self.body,
        }
    }

    fn part_mut(&mut self, part: TemplatePart) -> &mut Vec<TemplateSegment> {
        match part {
            TemplatePart::Title => &mut self.title,
            TemplatePart::Body => &mut self.body,
        }
    }

    pub fn title_segments(&self) -> &[TemplateSegment] {
        &self.title
    }

    pub fn body_segments(&self) -> &[TemplateSegment] {
        &self.body
    }

    pub fn segment(&self, handle: SegmentHandle) -> Option<&TemplateSegment> {
        self.part(handle.part).get(handle.index)
    }

    /// Current shared value of a field
    pub fn field_value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Every segment bound to `field`
    pub fn bindings(&self, field: &str) -> &[SegmentHandle] {
        self.bindings.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Fields that appear in the title or body, sorted
    pub fn fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Set a field's value everywhere it appears.
    ///
    /// Returns the handles of all segments that now show the new value.
    pub fn set_field_value(
        &mut self,
        field: &str,
        value: impl Into<String>,
    ) -> Result<Vec<SegmentHandle>> {
        if !self.bindings.contains_key(field) {
            return Err(Error::unknown_field(field));
        }
        let value = value.into();
        self.values.insert(field.to_string(), value.clone());
        self.write_value(field, &value);
        Ok(self.bindings(field).to_vec())
    }

    fn write_value(&mut self, field: &str, new_value: &str) {
        let handles = self.bindings(field).to_vec();
        for handle in handles {
            if let Some(TemplateSegment::Field { value, .. }) =
                self.part_mut(handle.part).get_mut(handle.index)
            {
                *value = new_value.to_string();
            }
        }
    }

    /// Replace the text of a literal segment
    pub fn set_literal_text(&mut self, handle: SegmentHandle, text: impl Into<String>) -> Result<()> {
        match self.part_mut(handle.part).get_mut(handle.index) {
            Some(TemplateSegment::Text { text: current }) => {
                *current = text.into();
                Ok(())
            }
            Some(TemplateSegment::Field { name, .. }) => Err(Error::validation_error(format!(
                "segment {} of the {:?} is the field '{}', not literal text",
                handle.index, handle.part, name
            ))),
            None => Err(Error::validation_error(format!(
                "no segment {} in the {:?}",
                handle.index, handle.part
            ))),
        }
    }

    /// Title as the user currently sees it
    pub fn preview_title(&self) -> String {
        preview(&self.title)
    }

    /// Body as the user currently sees it
    pub fn preview_body(&self) -> String {
        preview(&self.body)
    }

    /// True when any field value differs from the row
    pub fn is_dirty(&self) -> bool {
        self.values
            .iter()
            .any(|(name, value)| self.stored.get(name) != Some(value))
            || serialize_segments(&self.title) != self.base.title_template
            || serialize_segments(&self.body) != self.base.body_template
    }

    /// Discard the session
    pub fn cancel(self) {
        log::debug!("Template edit cancelled");
    }

    /// Reconstruct the templates and collect changed values
    pub fn finish(self) -> TemplateEditOutcome {
        let changed_values = self
            .values
            .iter()
            .filter(|(name, value)| self.stored.get(*name) != Some(*value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let template = TextTemplate {
            title_template: serialize_segments(&self.title),
            body_template: serialize_segments(&self.body),
            ..self.base
        };

        TemplateEditOutcome {
            template,
            changed_values,
        }
    }
}

fn preview(segments: &[TemplateSegment]) -> String {
    segments
        .iter()
        .map(|s| match s {
            TemplateSegment::Text { text } => text.as_str(),
            TemplateSegment::Field { value, .. } => value.as_str(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<String> {
        ["name", "city", "notes"].iter().map(|s| s.to_string()).collect()
    }

    fn row() -> Row {
        Row::new().with("name", "Alpha").with("city", "Oslo")
    }

    fn session(title: &str, body: &str) -> TemplateEditSession {
        TemplateEditSession::begin(
            &TextTemplate::new(title, body),
            &row(),
            &fields(),
            &ReservedFields::standard(),
        )
    }

    #[test]
    fn test_repeated_field_shares_value() {
        let mut session = session("{name}", "About {name} in {city}");
        assert_eq!(session.bindings("name").len(), 2);

        let touched = session.set_field_value("name", "Beta").unwrap();
        assert_eq!(touched.len(), 2);
        assert_eq!(session.preview_title(), "Beta");
        assert_eq!(session.preview_body(), "About Beta in Oslo");
    }

    #[test]
    fn test_finish_reconstructs_template() {
        let mut session = session("{name}", "About {name} in {city}");
        session.set_field_value("city", "Bergen").unwrap();
        let outcome = session.finish();

        assert_eq!(outcome.template.title_template, "{name}");
        assert_eq!(outcome.template.body_template, "About {name} in {city}");
        assert_eq!(
            outcome.changed_values,
            BTreeMap::from([("city".to_string(), "Bergen".to_string())])
        );
    }

    #[test]
    fn test_literal_edit() {
        let mut session = session("{name}", "About {name}");
        let handle = SegmentHandle {
            part: TemplatePart::Body,
            index: 0,
        };
        session.set_literal_text(handle, "Profile of ").unwrap();
        assert!(session.is_dirty());

        let outcome = session.finish();
        assert_eq!(outcome.template.body_template, "Profile of {name}");
        assert!(!outcome.has_value_changes());
    }

    #[test]
    fn test_literal_edit_rejects_field_segment() {
        let mut session = session("{name}", "");
        let handle = SegmentHandle {
            part: TemplatePart::Title,
            index: 0,
        };
        assert!(session.set_literal_text(handle, "x").is_err());
        let missing = SegmentHandle {
            part: TemplatePart::Body,
            index: 9,
        };
        assert!(session.set_literal_text(missing, "x").is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut session = session("{name}", "");
        assert!(matches!(
            session.set_field_value("city", "x"),
            Err(Error::UnknownField { .. })
        ));
    }

    #[test]
    fn test_untouched_session_is_clean() {
        let session = session("{name}", "{notes}\n{city}");
        assert!(!session.is_dirty());
        assert_eq!(session.field_value("notes"), Some(""));
        assert_eq!(session.fields(), vec!["city", "name", "notes"]);
        let outcome = session.finish();
        assert!(outcome.changed_values.is_empty());
        assert_eq!(outcome.template.body_template, "{notes}\n{city}");
    }

    #[test]
    fn test_live_values_seed_session() {
        let live = HashMap::from([("name".to_string(), "Draft".to_string())]);
        let session = TemplateEditSession::begin_with_values(
            &TextTemplate::new("{name}", "{name}"),
            &row(),
            &fields(),
            &ReservedFields::standard(),
            &live,
        );
        assert_eq!(session.preview_title(), "Draft");
        assert!(session.is_dirty());
        assert_eq!(
            session.finish().changed_values.get("name").map(String::as_str),
            Some("Draft")
        );
    }

    #[test]
    fn test_layouts_survive_finish() {
        let template = TextTemplate::new("{name}", "")
            .with_layouts(Default::default(), Default::default());
        let session =
            TemplateEditSession::begin(&template, &row(), &fields(), &ReservedFields::standard());
        let outcome = session.finish();
        assert_eq!(outcome.template, template);
    }
}
