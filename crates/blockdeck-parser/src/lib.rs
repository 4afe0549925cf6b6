//! # BlockDeck Parser
//!
//! Text-level building blocks of the slide engine:
//!
//! - [`image`]: decides whether a fragment denotes an image (embed, markdown
//!   image, image wikilink, URL, data URI, bare path) and normalizes it to
//!   embed syntax
//! - [`template`]: `{field}` placeholder substitution
//! - [`segments`]: lossless decomposition of templates into literal and
//!   field segments for in-place editing
//!
//! Every function here is pure and total. Patterns are compiled once with
//! `std::sync::LazyLock`.
//!
//! ## Quick Start
//!
//! ```
//! use blockdeck_core::{ReservedFields, Row};
//! use blockdeck_parser::prelude::*;
//! use std::collections::HashMap;
//!
//! let reserved = ReservedFields::standard();
//! let mut values = TemplateValues::new();
//! values.insert("cover".into(), "covers/alpha.png".into());
//!
//! let line = render_template("{cover}", &values, &reserved);
//! assert_eq!(detect_image(&line).as_deref(), Some("![[covers/alpha.png]]"));
//!
//! let row = Row::new().with("name", "Alpha");
//! let segments = parse_into_segments("# {name}", &row, &["name"], &reserved, &HashMap::new());
//! assert_eq!(serialize_segments(&segments), "# {name}");
//! ```

pub mod image;
pub mod segments;
pub mod template;

pub use image::{
    IMAGE_EXTENSIONS, ImageTokenKind, classify_image_token, contains_image_marker, detect_image,
    detect_image_strict, extract_first_image_token, has_image_extension, is_image_path,
    normalize_image_token,
};
pub use segments::{TemplateSegment, parse_into_segments, serialize_segments};
pub use template::{
    TemplateValues, normalize_line_endings, placeholder_names, render_template,
};

/// Convenient prelude for common imports.
pub mod prelude {
    pub use crate::image::{
        ImageTokenKind, classify_image_token, detect_image, extract_first_image_token,
        normalize_image_token,
    };
    pub use crate::segments::{TemplateSegment, parse_into_segments, serialize_segments};
    pub use crate::template::{TemplateValues, placeholder_names, render_template};
}
