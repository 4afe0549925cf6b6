//! # BlockDeck Slides
//!
//! Presentation content for the slide and gallery views.
//!
//! - [`content`]: one (row, template) pair → title + ordered body blocks
//! - [`pages`]: per-row branch selection and page assembly (`single` / `split`)
//! - [`gallery`]: gallery cards with cover images
//! - [`editing`]: in-place template editing with shared field values
//!
//! Every build runs to completion synchronously and returns fresh values;
//! nothing is cached between calls. Callers that rebuild on each keystroke
//! should coalesce rebuilds themselves.
//!
//! ## Example
//!
//! ```
//! use blockdeck_core::prelude::*;
//! use blockdeck_slides::prelude::*;
//!
//! let fields: Vec<String> = vec!["name".into(), "cover".into(), "notes".into()];
//! let reserved = ReservedFields::standard();
//! let config = SlideDefaults::from_fields(&fields, &reserved)
//!     .base_config()
//!     .with_mode(SlideMode::Split);
//!
//! let rows = vec![
//!     Row::new().with("name", "Alpha").with("cover", "alpha.png"),
//!     Row::new().with("name", "Beta"),
//! ];
//!
//! let pages = build_slide_pages(&rows, &fields, &config, &reserved);
//! assert_eq!(pages.len(), 3);
//! assert_eq!(pages[1].image_blocks(), vec!["![[alpha.png]]"]);
//! ```

pub mod content;
pub mod editing;
pub mod gallery;
pub mod pages;

pub use content::{
    ResolvedSlideContent, SlideContentRequest, build_template_values, resolve_body_blocks,
    resolve_slide_content,
};
pub use editing::{SegmentHandle, TemplateEditOutcome, TemplateEditSession, TemplatePart};
pub use gallery::{GalleryCard, GalleryTemplate, build_gallery_cards};
pub use pages::{
    BranchSelection, PageKind, SlidePage, SlidePageBuilder, TemplateTarget, build_slide_pages,
    resolve_image_candidate, select_branch,
};

/// Convenient prelude for common imports.
pub mod prelude {
    pub use crate::content::{ResolvedSlideContent, SlideContentRequest, resolve_slide_content};
    pub use crate::editing::{TemplateEditOutcome, TemplateEditSession};
    pub use crate::gallery::{GalleryCard, GalleryTemplate, build_gallery_cards};
    pub use crate::pages::{
        BranchSelection, PageKind, SlidePage, SlidePageBuilder, TemplateTarget, build_slide_pages,
    };
}
