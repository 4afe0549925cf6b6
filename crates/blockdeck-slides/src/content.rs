//! Turns one (row, text template) pair into a title and body blocks.

use blockdeck_core::{BodyBlock, ReservedFields, Row, STATUS_FIELD, TextTemplate};
use blockdeck_parser::{
    TemplateValues, contains_image_marker, detect_image, render_template,
};
use serde::Serialize;

/// Inputs for [`resolve_slide_content`]
#[derive(Debug, Clone, Copy)]
pub struct SlideContentRequest<'a> {
    pub row: &'a Row,
    pub fields: &'a [String],
    pub template: &'a TextTemplate,
    pub reserved: &'a ReservedFields,
    /// Image resolved separately from the body (dedicated image field/template)
    pub image_value: Option<&'a str>,
    /// `Some(false)` suppresses body image detection unless an image marker is present
    pub include_body_images: Option<bool>,
}

impl<'a> SlideContentRequest<'a> {
    pub fn new(
        row: &'a Row,
        fields: &'a [String],
        template: &'a TextTemplate,
        reserved: &'a ReservedFields,
    ) -> Self {
        Self {
            row,
            fields,
            template,
            reserved,
            image_value: None,
            include_body_images: None,
        }
    }

    pub fn with_image_value(mut self, image: Option<&'a str>) -> Self {
        self.image_value = image;
        self
    }

    pub fn include_body_images(mut self, include: bool) -> Self {
        self.include_body_images = Some(include);
        self
    }
}

/// Rendered title and ordered body blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedSlideContent {
    pub title: String,
    pub blocks: Vec<BodyBlock>,
}

/// Placeholder values for a row.
///
/// Reserved fields and `status` are skipped, values are trimmed, and blank
/// values are left out so their placeholders render empty.
pub fn build_template_values(
    row: &Row,
    fields: &[String],
    reserved: &ReservedFields,
) -> TemplateValues {
    fields
        .iter()
        .filter(|f| !reserved.contains(f) && f.as_str() != STATUS_FIELD)
        .filter_map(|f| row.display_value(f).map(|v| (f.clone(), v)))
        .collect()
}

/// Resolve the title and body blocks for one row.
///
/// Blank body lines become empty text blocks. A direct image value, when it
/// is detected, is appended as the last block.
pub fn resolve_slide_content(request: &SlideContentRequest<'_>) -> ResolvedSlideContent {
    let values = build_template_values(request.row, request.fields, request.reserved);
    let template = request.template;

    let title = if template.title_template.is_empty() {
        String::new()
    } else {
        render_template(&template.title_template, &values, request.reserved)
    };

    let mut blocks = resolve_body_blocks(
        &template.body_template,
        &values,
        request.reserved,
        request.include_body_images,
    );

    if let Some(image) = request.image_value.and_then(detect_image) {
        blocks.push(BodyBlock::image(image));
    }

    ResolvedSlideContent { title, blocks }
}

/// Render a body template and split it into blocks, one per line
pub fn resolve_body_blocks(
    body_template: &str,
    values: &TemplateValues,
    reserved: &ReservedFields,
    include_body_images: Option<bool>,
) -> Vec<BodyBlock> {
    if body_template.is_empty() {
        return Vec::new();
    }

    let rendered = render_template(body_template, values, reserved);
    let allow_images = include_body_images != Some(false)
        || contains_image_marker(body_template)
        || contains_image_marker(&rendered);

    rendered
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                return BodyBlock::text("");
            }
            if allow_images && let Some(image) = detect_image(line) {
                return BodyBlock::image(image);
            }
            BodyBlock::text(line)
        })
        .collect()
}
