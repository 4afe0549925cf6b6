//! # BlockDeck
//!
//! Slide and gallery template resolution for H2-block Markdown notes.
//!
//! This crate bundles the engine crates behind one dependency and adds the
//! pieces the command line needs: [`input::RowSet`] for loading rows and
//! [`output::ResponseFormatter`] for printing pages and cards.
//!
//! ```
//! use blockdeck::prelude::*;
//!
//! let set = RowSet::from_json_str(r#"[{"name": "Alpha", "cover": "alpha.png"}]"#).unwrap();
//! let reserved = ReservedFields::standard();
//! let config = SlideDefaults::from_fields(&set.fields, &reserved).base_config();
//!
//! let pages = build_slide_pages(&set.rows, &set.fields, &config, &reserved);
//! assert_eq!(pages[0].title, "Alpha");
//! assert_eq!(pages[0].image_blocks(), vec!["![[alpha.png]]"]);
//! ```

pub mod input;
pub mod output;

pub use blockdeck_core;
pub use blockdeck_parser;
pub use blockdeck_slides;

pub use input::RowSet;
pub use output::{LogFormat, OutputFormat, ResponseFormatter};

/// Everything needed to load rows and build pages
pub mod prelude {
    pub use crate::input::RowSet;
    pub use crate::output::{OutputFormat, ResponseFormatter};
    pub use blockdeck_core::prelude::*;
    pub use blockdeck_parser::prelude::*;
    pub use blockdeck_slides::prelude::*;
}
