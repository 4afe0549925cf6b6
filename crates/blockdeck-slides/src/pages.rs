//! Slide page assembly across a row set.
//!
//! Branch selection is driven by row content: a row is rendered with the
//! `withImage` branch when an image can be found for it, otherwise with the
//! `withoutImage` branch. In split mode the image additionally gets a page
//! of its own.

use crate::content::{
    ResolvedSlideContent, SlideContentRequest, build_template_values, resolve_body_blocks,
    resolve_slide_content,
};
use crate::editing::TemplateEditSession;
use blockdeck_core::{
    BodyBlock, ImageLayout, ImageSource, ReservedFields, Row, SlideColors, SlideMode,
    SlideTemplateConfig, TextLayout, TextTemplate,
};
use blockdeck_parser::{
    TemplateValues, detect_image, detect_image_strict, placeholder_names, render_template,
};
use serde::Serialize;

/// Which branch a row was rendered with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "branch", rename_all = "camelCase")]
pub enum BranchSelection {
    /// The row has an image. `image` is the normalized embed when it came from
    /// the branch's image source, `None` when it only appears in the body.
    WithImage { image: Option<String> },
    WithoutImage,
}

impl BranchSelection {
    pub fn has_image(&self) -> bool {
        matches!(self, BranchSelection::WithImage { .. })
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            BranchSelection::WithImage { image } => image.as_deref(),
            BranchSelection::WithoutImage => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageKind {
    Text,
    Image,
}

/// The configuration branch a page writes edits back into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateTarget {
    SingleWithImage,
    SingleWithoutImage,
    SplitTextPage,
    SplitWithoutImage,
}

impl TemplateTarget {
    pub fn template_mut<'c>(&self, config: &'c mut SlideTemplateConfig) -> &'c mut TextTemplate {
        match self {
            TemplateTarget::SingleWithImage => &mut config.single.with_image.template,
            TemplateTarget::SingleWithoutImage => &mut config.single.without_image,
            TemplateTarget::SplitTextPage => &mut config.split.with_image.text_page,
            TemplateTarget::SplitWithoutImage => &mut config.split.without_image,
        }
    }
}

/// One resolved presentation page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidePage {
    pub row_index: usize,
    pub kind: PageKind,
    pub selection: BranchSelection,
    pub title: String,
    pub blocks: Vec<BodyBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_layout: Option<TextLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_layout: Option<TextLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_layout: Option<ImageLayout>,
    pub colors: SlideColors,
    pub editable: bool,
    /// The template this page was rendered from
    pub template: TextTemplate,
    /// Where `update_template` writes; `None` for image pages
    pub target: Option<TemplateTarget>,
}

impl SlidePage {
    /// Text lines in order
    pub fn text_blocks(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                BodyBlock::Text { text } => Some(text.as_str()),
                BodyBlock::Image { .. } => None,
            })
            .collect()
    }

    /// Image embeds in order
    pub fn image_blocks(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                BodyBlock::Image { markdown } => Some(markdown.as_str()),
                BodyBlock::Text { .. } => None,
            })
            .collect()
    }

    /// No title and no body: the presentation layer shows its empty placeholder
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.blocks.is_empty()
    }

    /// Write an edited template back into the branch this page was built from.
    ///
    /// Layouts are only replaced when the edited template carries them.
    /// Returns `false` (and changes nothing) for non-editable pages.
    pub fn update_template(&self, config: &mut SlideTemplateConfig, edited: TextTemplate) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let slot = target.template_mut(config);
        slot.title_template = edited.title_template;
        slot.body_template = edited.body_template;
        if edited.title_layout.is_some() {
            slot.title_layout = edited.title_layout;
        }
        if edited.body_layout.is_some() {
            slot.body_layout = edited.body_layout;
        }
        log::debug!("Row {}: template written to {:?}", self.row_index, target);
        true
    }

    /// Start an in-place edit of this page's template
    pub fn begin_edit(
        &self,
        row: &Row,
        fields: &[String],
        reserved: &ReservedFields,
    ) -> Option<TemplateEditSession> {
        self.editable
            .then(|| TemplateEditSession::begin(&self.template, row, fields, reserved))
    }
}

/// Find the row's image through an image source.
///
/// Field sources test the raw value with the detector. Template sources
/// test the whole rendered string; if that fails, each referenced field's
/// raw value is tried in order, so `"Cover: {cover}"` still finds `cover`.
pub fn resolve_image_candidate(
    row: &Row,
    source: &ImageSource,
    values: &TemplateValues,
    reserved: &ReservedFields,
) -> Option<String> {
    match source {
        ImageSource::None => None,
        ImageSource::Field(field) => {
            if reserved.contains(field) {
                return None;
            }
            detect_image(&row.raw_value(field))
        }
        ImageSource::Template(template) => {
            let rendered = render_template(template, values, reserved);
            detect_image_strict(&rendered).or_else(|| {
                placeholder_names(template)
                    .iter()
                    .filter(|name| !reserved.contains(name))
                    .find_map(|name| detect_image(&row.raw_value(name)))
            })
        }
    }
}

/// Pick the branch for one row
pub fn select_branch(
    row: &Row,
    source: &ImageSource,
    with_image_template: &TextTemplate,
    values: &TemplateValues,
    reserved: &ReservedFields,
) -> BranchSelection {
    if let Some(image) = resolve_image_candidate(row, source, values, reserved) {
        return BranchSelection::WithImage { image: Some(image) };
    }
    if first_body_image(with_image_template, values, reserved).is_some() {
        return BranchSelection::WithImage { image: None };
    }
    BranchSelection::WithoutImage
}

fn first_body_image(
    template: &TextTemplate,
    values: &TemplateValues,
    reserved: &ReservedFields,
) -> Option<String> {
    resolve_body_blocks(&template.body_template, values, reserved, None)
        .into_iter()
        .find_map(|block| match block {
            BodyBlock::Image { markdown } => Some(markdown),
            BodyBlock::Text { .. } => None,
        })
}

/// Builds slide pages for a row set under one configuration.
///
/// Stateless apart from its borrowed inputs; every `build` call produces
/// fresh pages.
pub struct SlidePageBuilder<'a> {
    config: &'a SlideTemplateConfig,
    fields: &'a [String],
    reserved: &'a ReservedFields,
}

impl<'a> SlidePageBuilder<'a> {
    pub fn new(
        config: &'a SlideTemplateConfig,
        fields: &'a [String],
        reserved: &'a ReservedFields,
    ) -> Self {
        Self {
            config,
            fields,
            reserved,
        }
    }

    /// Pages for every row; row N's pages precede row N+1's
    pub fn build(&self, rows: &[Row]) -> Vec<SlidePage> {
        let mut pages = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match self.config.mode {
                SlideMode::Single => pages.push(self.single_page(index, row)),
                SlideMode::Split => pages.extend(self.split_pages(index, row)),
            }
        }
        log::debug!(
            "Built {} {} pages for {} rows",
            pages.len(),
            self.config.mode.as_str(),
            rows.len()
        );
        pages
    }

    /// The branch the active mode picks for `row`
    pub fn select_branch(&self, row: &Row) -> BranchSelection {
        let values = build_template_values(row, self.fields, self.reserved);
        self.select_with_values(row, &values)
    }

    fn select_with_values(&self, row: &Row, values: &TemplateValues) -> BranchSelection {
        let (source, template) = match self.config.mode {
            SlideMode::Single => (
                &self.config.single.with_image.image,
                &self.config.single.with_image.template,
            ),
            SlideMode::Split => (
                &self.config.split.with_image.image,
                &self.config.split.with_image.text_page,
            ),
        };
        select_branch(row, source, template, values, self.reserved)
    }

    fn single_page(&self, index: usize, row: &Row) -> SlidePage {
        let values = build_template_values(row, self.fields, self.reserved);
        let selection = self.select_with_values(row, &values);
        log::trace!("Row {}: {:?}", index, selection);

        let single = &self.config.single;
        let (template, target, image_layout, content) = match &selection {
            BranchSelection::WithImage { image } => {
                let template = &single.with_image.template;
                let request = SlideContentRequest::new(row, self.fields, template, self.reserved)
                    .with_image_value(image.as_deref());
                (
                    template,
                    TemplateTarget::SingleWithImage,
                    single.with_image.image_layout,
                    resolve_slide_content(&request),
                )
            }
            BranchSelection::WithoutImage => {
                let template = &single.without_image;
                let request = SlideContentRequest::new(row, self.fields, template, self.reserved)
                    .include_body_images(false);
                (
                    template,
                    TemplateTarget::SingleWithoutImage,
                    None,
                    resolve_slide_content(&request),
                )
            }
        };

        self.text_page(index, selection, template, target, image_layout, content)
    }

    fn split_pages(&self, index: usize, row: &Row) -> Vec<SlidePage> {
        let values = build_template_values(row, self.fields, self.reserved);
        let selection = self.select_with_values(row, &values);
        log::trace!("Row {}: {:?}", index, selection);

        let split = &self.config.split;
        let (template, target) = if selection.has_image() {
            (&split.with_image.text_page, TemplateTarget::SplitTextPage)
        } else {
            (&split.without_image, TemplateTarget::SplitWithoutImage)
        };

        let request = SlideContentRequest::new(row, self.fields, template, self.reserved)
            .include_body_images(false);
        let mut content = resolve_slide_content(&request);

        let image = match &selection {
            BranchSelection::WithImage { image: Some(image) } => Some(image.clone()),
            BranchSelection::WithImage { image: None } => {
                let promoted = first_body_image(template, &values, self.reserved);
                // A promoted body image moves to the image page
                if let Some(markdown) = &promoted
                    && let Some(position) = content
                        .blocks
                        .iter()
                        .position(|b| b.is_image() && b.content() == markdown.as_str())
                {
                    content.blocks.remove(position);
                }
                promoted
            }
            BranchSelection::WithoutImage => None,
        };

        let text_page = self.text_page(index, selection.clone(), template, target, None, content);
        let Some(image) = image else {
            return vec![text_page];
        };

        let title = if split.with_image.image_page.show_title {
            text_page.title.clone()
        } else {
            String::new()
        };
        let image_page = SlidePage {
            row_index: index,
            kind: PageKind::Image,
            selection,
            title,
            blocks: vec![BodyBlock::image(image)],
            title_layout: template.title_layout,
            body_layout: None,
            image_layout: split.with_image.image_layout,
            colors: self.config.colors.clone(),
            editable: false,
            template: template.clone(),
            target: None,
        };
        vec![text_page, image_page]
    }

    fn text_page(
        &self,
        index: usize,
        selection: BranchSelection,
        template: &TextTemplate,
        target: TemplateTarget,
        image_layout: Option<ImageLayout>,
        content: ResolvedSlideContent,
    ) -> SlidePage {
        SlidePage {
            row_index: index,
            kind: PageKind::Text,
            selection,
            title: content.title,
            blocks: content.blocks,
            title_layout: template.title_layout,
            body_layout: template.body_layout,
            image_layout,
            colors: self.config.colors.clone(),
            editable: true,
            template: template.clone(),
            target: Some(target),
        }
    }
}

/// Build pages for `rows` under `config`
pub fn build_slide_pages(
    rows: &[Row],
    fields: &[String],
    config: &SlideTemplateConfig,
    reserved: &ReservedFields,
) -> Vec<SlidePage> {
    SlidePageBuilder::new(config, fields, reserved).build(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn single_config() -> SlideTemplateConfig {
        let mut config = SlideTemplateConfig::default();
        config.single.with_image.template = TextTemplate::new("{name} (image)", "{notes}");
        config.single.with_image.image = ImageSource::Field("cover".into());
        config.single.without_image = TextTemplate::new("{name}", "{notes}");
        config
    }

    fn split_config(show_title: bool) -> SlideTemplateConfig {
        let mut config = SlideTemplateConfig::default().with_mode(SlideMode::Split);
        config.split.with_image.text_page = TextTemplate::new("{name} text", "{notes}");
        config.split.with_image.image = ImageSource::Field("cover".into());
        config.split.with_image.image_page.show_title = show_title;
        config.split.without_image = TextTemplate::new("{name}", "{notes}");
        config
    }

    #[test]
    fn test_single_mode_with_image_field() {
        let rows = vec![Row::new().with("name", "Alpha").with("cover", "cover.jpg")];
        let fields = fields(&["name", "cover", "notes"]);
        let reserved = ReservedFields::standard();
        let pages = build_slide_pages(&rows, &fields, &single_config(), &reserved);

        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.title, "Alpha (image)");
        assert_eq!(page.target, Some(TemplateTarget::SingleWithImage));
        assert_eq!(page.blocks.last(), Some(&BodyBlock::image("![[cover.jpg]]")));
        assert_eq!(
            page.selection,
            BranchSelection::WithImage {
                image: Some("![[cover.jpg]]".into())
            }
        );
    }

    #[test]
    fn test_single_mode_without_image() {
        let rows = vec![Row::new().with("name", "Beta").with("notes", "hello")];
        let fields = fields(&["name", "cover", "notes"]);
        let reserved = ReservedFields::standard();
        let pages = build_slide_pages(&rows, &fields, &single_config(), &reserved);

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Beta");
        assert_eq!(pages[0].text_blocks(), vec!["hello"]);
        assert_eq!(pages[0].selection, BranchSelection::WithoutImage);
        assert_eq!(pages[0].target, Some(TemplateTarget::SingleWithoutImage));
    }

    #[test]
    fn test_incidental_body_image_selects_with_image() {
        let rows = vec![Row::new().with("name", "Gamma").with("notes", "![[inline.png]]")];
        let fields = fields(&["name", "cover", "notes"]);
        let reserved = ReservedFields::standard();
        let pages = build_slide_pages(&rows, &fields, &single_config(), &reserved);

        assert_eq!(pages[0].selection, BranchSelection::WithImage { image: None });
        assert_eq!(pages[0].image_blocks(), vec!["![[inline.png]]"]);
    }

    #[test]
    fn test_split_mode_page_counts() {
        let rows = vec![
            Row::new().with("name", "NoImage"),
            Row::new().with("name", "HasImage").with("cover", "c.png"),
        ];
        let fields = fields(&["name", "cover", "notes"]);
        let reserved = ReservedFields::standard();
        let pages = build_slide_pages(&rows, &fields, &split_config(true), &reserved);

        assert_eq!(pages.len(), 3);
        assert_eq!((pages[0].row_index, pages[0].kind), (0, PageKind::Text));
        assert_eq!((pages[1].row_index, pages[1].kind), (1, PageKind::Text));
        assert_eq!((pages[2].row_index, pages[2].kind), (1, PageKind::Image));

        assert_eq!(pages[0].target, Some(TemplateTarget::SplitWithoutImage));
        assert_eq!(pages[1].target, Some(TemplateTarget::SplitTextPage));
        assert_eq!(pages[1].title, "HasImage text");
        assert!(pages[1].image_blocks().is_empty());

        let image_page = &pages[2];
        assert!(!image_page.editable);
        assert_eq!(image_page.title, "HasImage text");
        assert_eq!(image_page.blocks, vec![BodyBlock::image("![[c.png]]")]);
    }

    #[test]
    fn test_split_image_page_title_hidden() {
        let rows = vec![Row::new().with("name", "HasImage").with("cover", "c.png")];
        let fields = fields(&["name", "cover"]);
        let reserved = ReservedFields::standard();
        let pages = build_slide_pages(&rows, &fields, &split_config(false), &reserved);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].title, "");
    }

    #[test]
    fn test_image_page_update_is_noop() {
        let rows = vec![Row::new().with("name", "HasImage").with("cover", "c.png")];
        let fields = fields(&["name", "cover"]);
        let reserved = ReservedFields::standard();
        let mut config = split_config(true);
        let pages = build_slide_pages(&rows, &fields, &config, &reserved);

        let before = config.clone();
        assert!(!pages[1].update_template(&mut config, TextTemplate::new("x", "y")));
        assert_eq!(config, before);
    }

    #[test]
    fn test_update_writes_into_used_branch() {
        let fields = fields(&["name", "cover", "notes"]);
        let reserved = ReservedFields::standard();
        let mut config = single_config();
        let rows = vec![Row::new().with("name", "Plain")];
        let pages = build_slide_pages(&rows, &fields, &config, &reserved);

        assert!(pages[0].update_template(&mut config, TextTemplate::new("{name}!", "")));
        assert_eq!(config.single.without_image.title_template, "{name}!");
        assert_eq!(config.single.with_image.template.title_template, "{name} (image)");
    }

    #[test]
    fn test_image_template_fallback_to_field() {
        let row = Row::new().with("coverPath", "covers/a.png");
        let fields = fields(&["coverPath"]);
        let reserved = ReservedFields::standard();
        let values = build_template_values(&row, &fields, &reserved);
        let source = ImageSource::Template("Cover: {coverPath}".into());

        assert_eq!(
            resolve_image_candidate(&row, &source, &values, &reserved).as_deref(),
            Some("![[covers/a.png]]")
        );
    }

    #[test]
    fn test_image_template_rendered_whole() {
        let row = Row::new().with("id", "42");
        let fields = fields(&["id"]);
        let reserved = ReservedFields::standard();
        let values = build_template_values(&row, &fields, &reserved);
        let source = ImageSource::Template("attachments/{id}.png".into());

        assert_eq!(
            resolve_image_candidate(&row, &source, &values, &reserved).as_deref(),
            Some("![[attachments/42.png]]")
        );
    }

    #[test]
    fn test_reserved_image_field_ignored() {
        let row = Row::new().with("status", "a.png");
        let reserved = ReservedFields::standard();
        let source = ImageSource::Field("status".into());
        assert_eq!(
            resolve_image_candidate(&row, &source, &TemplateValues::new(), &reserved),
            None
        );
    }

    #[test]
    fn test_empty_row_still_produces_page() {
        let rows = vec![Row::new()];
        let fields = fields(&["name"]);
        let reserved = ReservedFields::standard();
        let pages = build_slide_pages(&rows, &fields, &SlideTemplateConfig::default(), &reserved);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let rows = vec![
            Row::new().with("name", "A").with("cover", "a.png"),
            Row::new().with("name", "B"),
        ];
        let fields = fields(&["name", "cover", "notes"]);
        let reserved = ReservedFields::standard();
        let config = single_config();
        let first = build_slide_pages(&rows, &fields, &config, &reserved);
        let second = build_slide_pages(&rows, &fields, &config, &reserved);
        assert_eq!(first, second);
    }

    #[test]
    fn test_branch_selection_json_shape() {
        let with_image = BranchSelection::WithImage {
            image: Some("![[a.png]]".into()),
        };
        assert_eq!(
            serde_json::to_string(&with_image).unwrap(),
            r#"{"branch":"withImage","image":"![[a.png]]"}"#
        );
        assert_eq!(
            serde_json::to_string(&BranchSelection::WithoutImage).unwrap(),
            r#"{"branch":"withoutImage"}"#
        );
    }

    #[test]
    fn test_split_body_image_moves_to_image_page() {
        let mut config = SlideTemplateConfig::default().with_mode(SlideMode::Split);
        config.split.with_image.text_page = TextTemplate::new("{name}", "![[inline.png]]\n{notes}");
        let rows = vec![Row::new().with("name", "Alpha").with("notes", "n")];
        let fields = fields(&["name", "notes"]);

        let pages = build_slide_pages(&rows, &fields, &config, &ReservedFields::standard());
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].kind, PageKind::Text);
        assert_eq!(pages[0].blocks, vec![BodyBlock::text("n")]);
        assert_eq!(pages[1].kind, PageKind::Image);
        assert_eq!(pages[1].blocks, vec![BodyBlock::image("![[inline.png]]")]);
        assert_eq!(pages[1].selection, BranchSelection::WithImage { image: None });
    }
}
