//! Normalization of untrusted template configuration.
//!
//! Settings written by older plugin versions, hand-edited files and
//! partially-written saves all pass through here. The sanitizer never
//! fails: wrong types and unknown enum values fall back to the supplied
//! defaults, percentages are clamped into `[0, 100]`, and every correction
//! is recorded in a [`SanitizeReport`].

use crate::config::{
    FontWeight, ImageBranch, ImageLayout, ImagePageOptions, ImageSource, SingleModeTemplates,
    SlideColors, SlideMode, SlideTemplateConfig, SplitImageBranch, SplitModeTemplates, TextAlign,
    TextLayout, TextTemplate,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity level for sanitizer corrections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Value was accepted after a harmless coercion
    Info,
    /// Value was replaced or clamped
    Warning,
}

/// One correction applied while sanitizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeIssue {
    pub severity: Severity,
    /// Dotted path of the offending value (e.g. `single.withImage.titleLayout.left`)
    pub path: String,
    pub message: String,
}

impl SanitizeIssue {
    pub fn new(severity: Severity, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// All corrections applied to one configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SanitizeReport {
    pub issues: Vec<SanitizeIssue>,
}

impl SanitizeReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: SanitizeIssue) {
        self.issues.push(issue);
    }

    /// True when the input needed no corrections
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues_by_severity(&self, severity: Severity) -> Vec<&SanitizeIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }
}

/// Normalize arbitrary JSON into a well-shaped [`SlideTemplateConfig`].
pub fn sanitize_template_config(
    value: &Value,
    defaults: &SlideTemplateConfig,
) -> (SlideTemplateConfig, SanitizeReport) {
    let mut sanitizer = Sanitizer::default();
    let config = sanitizer.config(value, defaults);
    (config, sanitizer.report)
}

/// Clamp a percentage into `[0, 100]`, mapping non-finite input to `fallback`
pub fn clamp_percent(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        fallback
    }
}

#[derive(Default)]
struct Sanitizer {
    report: SanitizeReport,
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

impl Sanitizer {
    fn warn(&mut self, path: &str, message: impl Into<String>) {
        self.report
            .add_issue(SanitizeIssue::new(Severity::Warning, path, message));
    }

    fn info(&mut self, path: &str, message: impl Into<String>) {
        self.report
            .add_issue(SanitizeIssue::new(Severity::Info, path, message));
    }

    /// Object view of `value`; `None` for missing/null, warning for other types
    fn object<'a>(&mut self, value: Option<&'a Value>, path: &str) -> Option<&'a Map<String, Value>> {
        match value {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                self.warn(path, "expected an object, using defaults");
                None
            }
        }
    }

    fn config(&mut self, value: &Value, defaults: &SlideTemplateConfig) -> SlideTemplateConfig {
        let Some(map) = self.object(Some(value), "") else {
            return defaults.clone();
        };

        SlideTemplateConfig {
            mode: self.mode(map.get("mode"), "mode", defaults.mode),
            single: self.single(map.get("single"), "single", &defaults.single),
            split: self.split(map.get("split"), "split", &defaults.split),
            colors: self.colors(map.get("colors"), "colors", &defaults.colors),
        }
    }

    fn mode(&mut self, value: Option<&Value>, path: &str, default: SlideMode) -> SlideMode {
        match value {
            None | Some(Value::Null) => default,
            Some(Value::String(s)) => match s.parse() {
                Ok(mode) => mode,
                Err(_) => {
                    self.warn(path, format!("unknown mode '{}'", s));
                    default
                }
            },
            Some(_) => {
                self.warn(path, "mode must be a string");
                default
            }
        }
    }

    fn single(
        &mut self,
        value: Option<&Value>,
        path: &str,
        defaults: &SingleModeTemplates,
    ) -> SingleModeTemplates {
        let Some(map) = self.object(value, path) else {
            return defaults.clone();
        };
        SingleModeTemplates {
            with_image: self.image_branch(
                map.get("withImage"),
                &join(path, "withImage"),
                &defaults.with_image,
            ),
            without_image: self.text_template(
                map.get("withoutImage"),
                &join(path, "withoutImage"),
                &defaults.without_image,
            ),
        }
    }

    fn split(
        &mut self,
        value: Option<&Value>,
        path: &str,
        defaults: &SplitModeTemplates,
    ) -> SplitModeTemplates {
        let Some(map) = self.object(value, path) else {
            return defaults.clone();
        };

        let with_image_path = join(path, "withImage");
        let with_image = match self.object(map.get("withImage"), &with_image_path) {
            None => defaults.with_image.clone(),
            Some(branch) => SplitImageBranch {
                text_page: self.text_template(
                    branch.get("textPage"),
                    &join(&with_image_path, "textPage"),
                    &defaults.with_image.text_page,
                ),
                image: self.image_source(branch, &with_image_path, &defaults.with_image.image),
                image_layout: self.image_layout(
                    branch.get("imageLayout"),
                    &join(&with_image_path, "imageLayout"),
                    defaults.with_image.image_layout,
                ),
                image_page: self.image_page(
                    branch.get("imagePage"),
                    &join(&with_image_path, "imagePage"),
                    defaults.with_image.image_page,
                ),
            },
        };

        SplitModeTemplates {
            with_image,
            without_image: self.text_template(
                map.get("withoutImage"),
                &join(path, "withoutImage"),
                &defaults.without_image,
            ),
        }
    }

    fn image_branch(
        &mut self,
        value: Option<&Value>,
        path: &str,
        defaults: &ImageBranch,
    ) -> ImageBranch {
        let Some(map) = self.object(value, path) else {
            return defaults.clone();
        };
        ImageBranch {
            template: self.text_template_fields(map, path, &defaults.template),
            image: self.image_source(map, path, &defaults.image),
            image_layout: self.image_layout(
                map.get("imageLayout"),
                &join(path, "imageLayout"),
                defaults.image_layout,
            ),
        }
    }

    fn text_template(
        &mut self,
        value: Option<&Value>,
        path: &str,
        defaults: &TextTemplate,
    ) -> TextTemplate {
        match self.object(value, path) {
            Some(map) => self.text_template_fields(map, path, defaults),
            None => defaults.clone(),
        }
    }

    fn text_template_fields(
        &mut self,
        map: &Map<String, Value>,
        path: &str,
        defaults: &TextTemplate,
    ) -> TextTemplate {
        TextTemplate {
            title_template: self.string(
                map.get("titleTemplate"),
                &join(path, "titleTemplate"),
                &defaults.title_template,
            ),
            body_template: self.string(
                map.get("bodyTemplate"),
                &join(path, "bodyTemplate"),
                &defaults.body_template,
            ),
            title_layout: self.text_layout(
                map.get("titleLayout"),
                &join(path, "titleLayout"),
                defaults.title_layout,
            ),
            body_layout: self.text_layout(
                map.get("bodyLayout"),
                &join(path, "bodyLayout"),
                defaults.body_layout,
            ),
        }
    }

    /// Reads `image`, falling back to the legacy `imageField` / `imageTemplate` keys
    fn image_source(
        &mut self,
        map: &Map<String, Value>,
        path: &str,
        default: &ImageSource,
    ) -> ImageSource {
        let image_path = join(path, "image");
        match map.get("image") {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if s.eq_ignore_ascii_case("none") => return ImageSource::None,
            Some(Value::Object(obj)) => {
                if let Some(Value::String(field)) = obj.get("field") {
                    return ImageSource::Field(field.trim().to_string());
                }
                if let Some(Value::String(template)) = obj.get("template") {
                    return ImageSource::Template(template.clone());
                }
                self.warn(&image_path, "image source needs a 'field' or 'template' string");
                return default.clone();
            }
            Some(_) => {
                self.warn(&image_path, "unrecognized image source");
                return default.clone();
            }
        }

        if let Some(Value::String(field)) = map.get("imageField") {
            self.info(&join(path, "imageField"), "legacy imageField key converted");
            let field = field.trim();
            return if field.is_empty() {
                ImageSource::None
            } else {
                ImageSource::Field(field.to_string())
            };
        }
        if let Some(Value::String(template)) = map.get("imageTemplate") {
            self.info(&join(path, "imageTemplate"), "legacy imageTemplate key converted");
            return if template.trim().is_empty() {
                ImageSource::None
            } else {
                ImageSource::Template(template.clone())
            };
        }
        default.clone()
    }

    fn image_page(
        &mut self,
        value: Option<&Value>,
        path: &str,
        default: ImagePageOptions,
    ) -> ImagePageOptions {
        match self.object(value, path) {
            Some(map) => ImagePageOptions {
                show_title: self.boolean(
                    map.get("showTitle"),
                    &join(path, "showTitle"),
                    default.show_title,
                ),
            },
            None => default,
        }
    }

    fn text_layout(
        &mut self,
        value: Option<&Value>,
        path: &str,
        default: Option<TextLayout>,
    ) -> Option<TextLayout> {
        let map = self.object(value, path)?;
        let base = default.unwrap_or_default();
        Some(TextLayout {
            left: self.percent(map.get("left"), &join(path, "left"), base.left),
            top: self.percent(map.get("top"), &join(path, "top"), base.top),
            width: self.percent(map.get("width"), &join(path, "width"), base.width),
            align: self.align(map.get("align"), &join(path, "align"), base.align),
            font_weight: self.weight(
                map.get("fontWeight"),
                &join(path, "fontWeight"),
                base.font_weight,
            ),
        })
    }

    fn image_layout(
        &mut self,
        value: Option<&Value>,
        path: &str,
        default: Option<ImageLayout>,
    ) -> Option<ImageLayout> {
        let map = self.object(value, path)?;
        let base = default.unwrap_or_default();
        Some(ImageLayout {
            left: self.percent(map.get("left"), &join(path, "left"), base.left),
            top: self.percent(map.get("top"), &join(path, "top"), base.top),
            width: self.percent(map.get("width"), &join(path, "width"), base.width),
            height: self.percent(map.get("height"), &join(path, "height"), base.height),
        })
    }

    fn colors(&mut self, value: Option<&Value>, path: &str, defaults: &SlideColors) -> SlideColors {
        let Some(map) = self.object(value, path) else {
            return defaults.clone();
        };
        SlideColors {
            title: self.color(map.get("title"), &join(path, "title"), &defaults.title),
            body: self.color(map.get("body"), &join(path, "body"), &defaults.body),
            background: self.color(
                map.get("background"),
                &join(path, "background"),
                &defaults.background,
            ),
        }
    }

    fn string(&mut self, value: Option<&Value>, path: &str, default: &str) -> String {
        match value {
            None | Some(Value::Null) => default.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => {
                self.info(path, "number converted to text");
                n.to_string()
            }
            Some(_) => {
                self.warn(path, "expected a string");
                default.to_string()
            }
        }
    }

    fn boolean(&mut self, value: Option<&Value>, path: &str, default: bool) -> bool {
        match value {
            None | Some(Value::Null) => default,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                self.warn(path, "expected a boolean");
                default
            }
        }
    }

    fn percent(&mut self, value: Option<&Value>, path: &str, default: f64) -> f64 {
        let raw = match value {
            None | Some(Value::Null) => return default,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        let Some(raw) = raw else {
            self.warn(path, "expected a number");
            return default;
        };
        let clamped = clamp_percent(raw, default);
        if clamped != raw {
            self.warn(path, format!("{} clamped to {}", raw, clamped));
        }
        clamped
    }

    fn align(&mut self, value: Option<&Value>, path: &str, default: TextAlign) -> TextAlign {
        match value.and_then(Value::as_str).map(str::to_ascii_lowercase).as_deref() {
            Some("left") => TextAlign::Left,
            Some("center") => TextAlign::Center,
            Some("right") => TextAlign::Right,
            None if value.is_none_or(Value::is_null) => default,
            _ => {
                self.warn(path, "unknown alignment");
                default
            }
        }
    }

    fn weight(&mut self, value: Option<&Value>, path: &str, default: FontWeight) -> FontWeight {
        match value.and_then(Value::as_str).map(str::to_ascii_lowercase).as_deref() {
            Some("normal") => FontWeight::Normal,
            Some("bold") => FontWeight::Bold,
            None if value.is_none_or(Value::is_null) => default,
            _ => {
                self.warn(path, "unknown font weight");
                default
            }
        }
    }

    fn color(&mut self, value: Option<&Value>, path: &str, default: &str) -> String {
        match value {
            None | Some(Value::Null) => default.to_string(),
            Some(Value::String(s)) if is_color(s) => s.trim().to_string(),
            Some(_) => {
                self.warn(path, "invalid color");
                default.to_string()
            }
        }
    }
}

/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa` and bare CSS color names
fn is_color(value: &str) -> bool {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}
