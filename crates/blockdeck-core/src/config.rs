//! Template configuration for slide and gallery views.
//!
//! The configuration is a plain serializable tree. Untrusted input goes
//! through [`crate::sanitize`] before it reaches the engine; `load` does
//! that automatically.

use crate::error::{Error, Result};
use crate::sanitize::{SanitizeReport, sanitize_template_config};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Page layout strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideMode {
    /// One page per row
    #[default]
    Single,
    /// A text page plus, when the row has an image, an image page
    Split,
}

impl SlideMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideMode::Single => "single",
            SlideMode::Split => "split",
        }
    }
}

impl std::str::FromStr for SlideMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(SlideMode::Single),
            "split" => Ok(SlideMode::Split),
            other => Err(Error::config_error(format!(
                "Unknown slide mode '{}'. Expected single or split",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Placement of a text area, in percent of the slide box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextLayout {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub align: TextAlign,
    pub font_weight: FontWeight,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            left: 6.0,
            top: 28.0,
            width: 88.0,
            align: TextAlign::Left,
            font_weight: FontWeight::Normal,
        }
    }
}

impl TextLayout {
    /// Default placement for slide titles
    pub fn title() -> Self {
        Self {
            top: 8.0,
            font_weight: FontWeight::Bold,
            ..Self::default()
        }
    }
}

/// Placement of an image area, in percent of the slide box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageLayout {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ImageLayout {
    fn default() -> Self {
        Self {
            left: 10.0,
            top: 20.0,
            width: 80.0,
            height: 70.0,
        }
    }
}

/// Title and body templates using `{field}` placeholders
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextTemplate {
    pub title_template: String,
    pub body_template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_layout: Option<TextLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_layout: Option<TextLayout>,
}

impl TextTemplate {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title_template: title.into(),
            body_template: body.into(),
            title_layout: None,
            body_layout: None,
        }
    }

    pub fn with_layouts(mut self, title: TextLayout, body: TextLayout) -> Self {
        self.title_layout = Some(title);
        self.body_layout = Some(body);
        self
    }
}

/// Where a branch finds the row's image
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    #[default]
    None,
    /// Literal field reference; the raw value is tested directly
    Field(String),
    /// Placeholder template rendered against the row first
    Template(String),
}

impl ImageSource {
    pub fn is_none(&self) -> bool {
        matches!(self, ImageSource::None)
    }}

/// Single-mode branch used when a row has an image
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageBranch {
    #[serde(flatten)]
    pub template: TextTemplate,
    pub image: ImageSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_layout: Option<ImageLayout>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SingleModeTemplates {
    pub with_image: ImageBranch,
    pub without_image: TextTemplate,
}

/// Options for the image-only page of split mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagePageOptions {
    pub show_title: bool,
}

impl Default for ImagePageOptions {
    fn default() -> Self {
        Self { show_title: true }
    }
}

/// Split-mode branch used when a row has an image
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitImageBranch {
    pub text_page: TextTemplate,
    pub image: ImageSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_layout: Option<ImageLayout>,
    pub image_page: ImagePageOptions,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitModeTemplates {
    pub with_image: SplitImageBranch,
    pub without_image: TextTemplate,
}

/// Colors handed to the presentation layer with every page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlideColors {
    pub title: String,
    pub body: String,
    pub background: String,
}

impl Default for SlideColors {
    fn default() -> Self {
        Self {
            title: "#1f2328".to_string(),
            body: "#3d444d".to_string(),
            background: "#ffffff".to_string(),
        }
    }
}

/// Complete slide template configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlideTemplateConfig {
    pub mode: SlideMode,
    pub single: SingleModeTemplates,
    pub split: SplitModeTemplates,
    pub colors: SlideColors,
}

impl SlideTemplateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style mode switch
    pub fn with_mode(mut self, mode: SlideMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sanitize an untrusted JSON value against `defaults`
    pub fn from_value(
        value: &serde_json::Value,
        defaults: &SlideTemplateConfig,
    ) -> (Self, SanitizeReport) {
        sanitize_template_config(value, defaults)
    }

    /// Load configuration from a YAML or JSON file
    ///
    /// The file contents are sanitized; corrections are logged and
    /// returned alongside the configuration.
    pub fn load(path: &Path, defaults: &SlideTemplateConfig) -> Result<(Self, SanitizeReport)> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config_error(format!(
                "Failed to load template config from {}: {}",
                path.display(),
                e
            ))
        })?;

        // YAML is a superset of JSON, one parser covers both
        let value: serde_json::Value = serde_yaml::from_str(&content)
            .map_err(|e| Error::config_error(format!("Invalid template configuration: {}", e)))?;

        let (config, report) = sanitize_template_config(&value, defaults);
        for issue in &report.issues {
            log::warn!("{}: {} ({})", path.display(), issue.message, issue.path);
        }
        Ok((config, report))
    }

    /// Save configuration as JSON (`.json` extension) or YAML
    pub fn save(&self, path: &Path) -> Result<()> {
        // Going through a JSON value keeps enum variants as plain maps instead of YAML tags
        let value = serde_json::to_value(self).map_err(|e| {
            Error::config_error(format!("Failed to serialize template config: {}", e))
        })?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let content = if is_json {
            serde_json::to_string_pretty(&value).map_err(|e| e.to_string())
        } else {
            serde_yaml::to_string(&value).map_err(|e| e.to_string())
        }
        .map_err(|e| Error::config_error(format!("Failed to serialize template config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            Error::config_error(format!(
                "Failed to save template config to {}: {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("single".parse::<SlideMode>().unwrap(), SlideMode::Single);
        assert_eq!(" Split ".parse::<SlideMode>().unwrap(), SlideMode::Split);
        assert!("carousel".parse::<SlideMode>().is_err());
    }

    #[test]
    fn test_image_source_serialization() {
        let json = serde_json::to_string(&ImageSource::Field("cover".into())).unwrap();
        assert_eq!(json, r#"{"field":"cover"}"#);
        let json = serde_json::to_string(&ImageSource::None).unwrap();
        assert_eq!(json, r#""none""#);
    }

    #[test]
    fn test_image_branch_flattens_template() {
        let branch: ImageBranch = serde_json::from_str(
            r#"{"titleTemplate": "{name}", "bodyTemplate": "{notes}", "image": {"field": "cover"}}"#,
        )
        .unwrap();
        assert_eq!(branch.template.title_template, "{name}");
        assert_eq!(branch.image, ImageSource::Field("cover".into()));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("slides.yaml");

        let mut config = SlideTemplateConfig::new().with_mode(SlideMode::Split);
        config.split.without_image = TextTemplate::new("{name}", "{notes}");
        config.split.with_image.image = ImageSource::Template("{cover}".into());
        config.split.with_image.image_page.show_title = false;
        config.save(&path).unwrap();

        let (loaded, report) = SlideTemplateConfig::load(&path, &SlideTemplateConfig::default())
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result =
            SlideTemplateConfig::load(&temp.path().join("nope.yaml"), &Default::default());
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }
}
