// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::Renderer)
    clippy::module_name_repetitions
)]

//! # mdtext
//!
//! Renders markdown as plain text for the terminal.
//!
//! mdtext turns a markdown document into text that reads well on its own:
//! - Paragraphs reflowed to a target width
//! - Headers that indent the sections below them
//! - Quotes, lists and footnotes with hanging prefixes
//! - Tables laid out as grids that fit the width
//! - Optional ANSI colors and syntax-highlighted code
//!
//! ## Example
//!
//! ```
//! use mdtext::prelude::*;
//!
//! let options = Options { width: 40, ..Options::default() };
//! let (metadata, body) = markdown_to_text("Title: Notes\n\n# Hello\n\nWorld", &options);
//! assert_eq!(metadata.get("Title"), Some("Notes"));
//! assert_eq!(body, "--[ Hello ]--\n\n    World\n");
//! ```
//!
//! ## Modules
//!
//! - [`render`]: Parsing, the render operations and reflow
//! - [`metadata`]: Leading `Name: value` blocks and summary markers
//! - [`options`]: Render options and their resolution
//! - [`align`]: Table grid layout
//! - [`highlight`]: Syntax highlighting
//! - [`terminal`]: Terminal width and color escapes
//! - [`config`]: Saved default flags

pub mod align;
pub mod config;
pub mod highlight;
pub mod metadata;
pub mod options;
pub mod render;
pub mod terminal;

pub use render::{markdown_to_text, markdown_to_text_no_metadata};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::align::TableStyle;
    pub use crate::metadata::Metadata;
    pub use crate::options::{Options, ResolvedOptions};
    pub use crate::render::{markdown_to_text, markdown_to_text_no_metadata};
}
