//! Gallery cards: one card per row with an optional cover image.

use crate::content::{SlideContentRequest, build_template_values, resolve_slide_content};
use crate::pages::resolve_image_candidate;
use blockdeck_core::{BodyBlock, ImageSource, ReservedFields, Row, SlideDefaults, TextTemplate};
use serde::{Deserialize, Serialize};

/// Card template for the gallery view
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryTemplate {
    #[serde(flatten)]
    pub text: TextTemplate,
    pub cover: ImageSource,
}

impl GalleryTemplate {
    /// Title from the first field, image column as cover, no body
    pub fn from_defaults(defaults: &SlideDefaults) -> Self {
        Self {
            text: TextTemplate::new(defaults.title_template(), ""),
            cover: defaults
                .image_field()
                .map(|f| ImageSource::Field(f.to_string()))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryCard {
    pub row_index: usize,
    pub title: String,
    pub blocks: Vec<BodyBlock>,
    /// Normalized cover embed
    pub cover: Option<String>,
}

/// Build one card per row.
///
/// The cover comes from the template's cover source; when that finds
/// nothing, the first body image is promoted to cover and removed from the
/// body.
pub fn build_gallery_cards(
    rows: &[Row],
    fields: &[String],
    template: &GalleryTemplate,
    reserved: &ReservedFields,
) -> Vec<GalleryCard> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let values = build_template_values(row, fields, reserved);
            let request = SlideContentRequest::new(row, fields, &template.text, reserved);
            let mut content = resolve_slide_content(&request);

            let cover = resolve_image_candidate(row, &template.cover, &values, reserved).or_else(|| {
                let position = content.blocks.iter().position(BodyBlock::is_image)?;
                Some(content.blocks.remove(position).content().to_string())
            });

            GalleryCard {
                row_index: index,
                title: content.title,
                blocks: content.blocks,
                cover,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cover_from_field() {
        let rows = vec![Row::new().with("name", "Alpha").with("cover", "a.png")];
        let fields = fields(&["name", "cover"]);
        let reserved = ReservedFields::standard();
        let template =
            GalleryTemplate::from_defaults(&SlideDefaults::from_fields(&fields, &reserved));

        let cards = build_gallery_cards(&rows, &fields, &template, &reserved);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Alpha");
        assert_eq!(cards[0].cover.as_deref(), Some("![[a.png]]"));
        assert!(cards[0].blocks.is_empty());
    }

    #[test]
    fn test_body_image_promoted_to_cover() {
        let rows = vec![Row::new().with("notes", "intro").with("pic", "https://x.org/p.jpg")];
        let fields = fields(&["notes", "pic"]);
        let reserved = ReservedFields::standard();
        let template = GalleryTemplate {
            text: TextTemplate::new("", "{notes}\n{pic}"),
            cover: ImageSource::None,
        };

        let cards = build_gallery_cards(&rows, &fields, &template, &reserved);
        assert_eq!(cards[0].cover.as_deref(), Some("![](https://x.org/p.jpg)"));
        assert_eq!(cards[0].blocks, vec![BodyBlock::text("intro")]);
    }

    #[test]
    fn test_card_without_cover() {
        let rows = vec![Row::new().with("name", "Plain")];
        let fields = fields(&["name"]);
        let reserved = ReservedFields::standard();
        let template = GalleryTemplate {
            text: TextTemplate::new("{name}", ""),
            cover: ImageSource::Field("cover".into()),
        };
        let cards = build_gallery_cards(&rows, &fields, &template, &reserved);
        assert_eq!(cards[0].cover, None);
    }
}
