//! # BlockDeck Core
//!
//! Core data models, error types and template configuration shared by every
//! BlockDeck crate.
//!
//! ## Architecture Principles
//!
//! - **Pure engine**: resolution never fails; only loading can return errors
//! - **Type-Driven Design**: image sources, modes and blocks are enums, not strings
//! - **One reserved-field set**: [`ReservedFields::standard`] is the single source
//! - **Explicit defaults**: [`SlideDefaults`] is a value, never a global
//!
//! ## Core Modules
//!
//! - [`models`] - Rows, field values, reserved fields, body blocks
//! - [`config`] - Slide template configuration tree
//! - [`sanitize`] - Normalization of untrusted configuration
//! - [`defaults`] - Base templates derived from a field list
//! - [`error`] - Error type and Result alias
//!
//! ## Usage
//!
//! ```
//! use blockdeck_core::prelude::*;
//!
//! let reserved = ReservedFields::standard();
//! let defaults = SlideDefaults::from_fields(&["name", "cover", "notes"], &reserved);
//! let config = defaults.base_config();
//!
//! assert_eq!(config.single.without_image.title_template, "{name}");
//! assert_eq!(config.single.with_image.image, ImageSource::Field("cover".into()));
//! ```
//!
//! ```
//! use blockdeck_core::prelude::*;
//!
//! let raw = serde_json::json!({"mode": "split", "colors": {"title": 42}});
//! let (config, report) = SlideTemplateConfig::from_value(&raw, &SlideTemplateConfig::default());
//! assert_eq!(config.mode, SlideMode::Split);
//! assert!(!report.is_clean());
//! ```

pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod sanitize;

pub use config::*;
pub use defaults::{SlideDefaults, looks_like_image_field};
pub use error::{Error, Result};
pub use models::*;
pub use sanitize::{
    SanitizeIssue, SanitizeReport, Severity, clamp_percent, sanitize_template_config,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        FontWeight, ImageBranch, ImageLayout, ImagePageOptions, ImageSource, SingleModeTemplates,
        SlideColors, SlideMode, SlideTemplateConfig, SplitImageBranch, SplitModeTemplates,
        TextAlign, TextLayout, TextTemplate,
    };
    pub use crate::defaults::SlideDefaults;
    pub use crate::error::{Error, Result};
    pub use crate::models::{BodyBlock, FieldValue, ReservedFields, Row, content_fields};
    pub use crate::sanitize::{SanitizeIssue, SanitizeReport, Severity};
}
