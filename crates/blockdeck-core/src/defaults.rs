//! Base slide templates derived from a field list.
//!
//! The base configuration is an ordinary value: build it once when the view
//! is composed and pass it by reference to whoever needs it.

use crate::config::{
    ImageBranch, ImageLayout, ImageSource, SingleModeTemplates, SlideColors, SlideMode,
    SlideTemplateConfig, SplitImageBranch, SplitModeTemplates, TextLayout, TextTemplate,
};
use crate::models::{ReservedFields, content_fields};

/// Field-name fragments that mark a likely image column
const IMAGE_FIELD_HINTS: [&str; 8] = [
    "image", "img", "cover", "photo", "picture", "thumbnail", "banner", "poster",
];

/// Default templates for one field list
#[derive(Debug, Clone, PartialEq)]
pub struct SlideDefaults {
    title_field: Option<String>,
    body_fields: Vec<String>,
    image_field: Option<String>,
}

impl SlideDefaults {
    /// Derive defaults from the table's fields
    ///
    /// The first content field becomes the title, the first field whose name
    /// looks like an image column becomes the image source, and every other
    /// field gets its own body line.
    pub fn from_fields<S: AsRef<str>>(fields: &[S], reserved: &ReservedFields) -> Self {
        let fields = content_fields(fields, reserved);
        let mut iter = fields.into_iter();
        let title_field = iter.next();
        let rest: Vec<String> = iter.collect();

        let image_field = rest.iter().find(|f| looks_like_image_field(f)).cloned();
        let body_fields = rest
            .into_iter()
            .filter(|f| Some(f) != image_field.as_ref())
            .collect();

        Self {
            title_field,
            body_fields,
            image_field,
        }
    }

    pub fn image_field(&self) -> Option<&str> {
        self.image_field.as_deref()
    }

    pub fn title_template(&self) -> String {
        self.title_field
            .as_deref()
            .map(placeholder)
            .unwrap_or_default()
    }

    /// One placeholder per body field, newline separated
    pub fn body_template(&self) -> String {
        self.body_fields
            .iter()
            .map(|f| placeholder(f))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn text_template(&self) -> TextTemplate {
        TextTemplate::new(self.title_template(), self.body_template())
            .with_layouts(TextLayout::title(), TextLayout::default())
    }

    fn image_source(&self) -> ImageSource {
        self.image_field
            .clone()
            .map(ImageSource::Field)
            .unwrap_or_default()
    }

    /// The complete base configuration
    pub fn base_config(&self) -> SlideTemplateConfig {
        let text = self.text_template();
        let narrow_body = TextLayout {
            width: 44.0,
            ..TextLayout::default()
        };

        SlideTemplateConfig {
            mode: SlideMode::Single,
            single: SingleModeTemplates {
                with_image: ImageBranch {
                    template: TextTemplate {
                        body_layout: Some(narrow_body),
                        ..text.clone()
                    },
                    image: self.image_source(),
                    image_layout: Some(ImageLayout {
                        left: 52.0,
                        top: 20.0,
                        width: 42.0,
                        height: 70.0,
                    }),
                },
                without_image: text.clone(),
            },
            split: SplitModeTemplates {
                with_image: SplitImageBranch {
                    text_page: text.clone(),
                    image: self.image_source(),
                    image_layout: Some(ImageLayout::default()),
                    image_page: Default::default(),
                },
                without_image: text,
            },
            colors: SlideColors::default(),
        }
    }
}

/// Does the field name suggest it holds an image path?
pub fn looks_like_image_field(field: &str) -> bool {
    let lower = field.to_lowercase();
    IMAGE_FIELD_HINTS.iter().any(|hint| lower.contains(hint))
}

fn placeholder(field: &str) -> String {
    format!("{{{}}}", field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_fields() {
        let fields = ["#", "name", "cover", "notes", "status", "owner"];
        let defaults = SlideDefaults::from_fields(&fields, &ReservedFields::standard());

        assert_eq!(defaults.title_template(), "{name}");
        assert_eq!(defaults.body_template(), "{notes}\n{owner}");
        assert_eq!(defaults.image_field(), Some("cover"));
    }

    #[test]
    fn test_base_config_uses_image_field() {
        let defaults =
            SlideDefaults::from_fields(&["title", "Photo URL"], &ReservedFields::standard());
        let config = defaults.base_config();

        assert_eq!(
            config.single.with_image.image,
            ImageSource::Field("Photo URL".to_string())
        );
        assert_eq!(config.split.with_image.image, config.single.with_image.image);
        assert_eq!(config.single.without_image.title_template, "{title}");
        assert_eq!(config.single.without_image.body_template, "");
    }

    #[test]
    fn test_no_fields() {
        let defaults = SlideDefaults::from_fields::<&str>(&[], &ReservedFields::standard());
        let config = defaults.base_config();
        assert_eq!(config.single.without_image.title_template, "");
        assert!(config.single.with_image.image.is_none());
    }

    #[test]
    fn test_independent_instances() {
        let reserved = ReservedFields::standard();
        let a = SlideDefaults::from_fields(&["alpha", "beta"], &reserved);
        let b = SlideDefaults::from_fields(&["gamma"], &reserved);
        assert_ne!(a.base_config(), b.base_config());
        assert_eq!(a.base_config(), a.base_config());
    }
}
