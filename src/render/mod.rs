//! Markdown to reflowed plain text.
//!
//! Rendering runs in three passes:
//!
//! 1. The syntax tree is walked and every construct writes literal text
//!    interleaved with control markers (see [`sentinel`]) into one stream.
//! 2. [`reflow`] resolves indent frames and wraps text to the target width.
//! 3. The surviving markers are decoded into spaces and newlines.

mod buffer;
mod renderer;
mod walk;

pub mod reflow;
pub mod sentinel;
pub mod table;

pub use buffer::{Mark, OutputBuffer};
pub use reflow::reflow;
pub use renderer::{ListItemKind, RenderContext, Renderer};
pub use walk::render_markdown;

use crate::metadata::{Metadata, extract_metadata, strip_summary_markers};
use crate::options::{Options, ResolvedOptions};
use sentinel::{LINE_BREAK, NBSP, sanitize};

/// Render `markdown` to plain text, splitting off leading metadata.
///
/// The body always ends with exactly one newline unless it is empty.
pub fn markdown_to_text(markdown: &str, options: &Options) -> (Metadata, String) {
    let source = sanitize(markdown);
    let (metadata, offset) = extract_metadata(&source);
    let body = render_body(&source[offset..], &options.resolve());
    (metadata, body)
}

/// Render `markdown` to plain text, treating it all as body.
pub fn markdown_to_text_no_metadata(markdown: &str, options: &Options) -> String {
    render_body(markdown, &options.resolve())
}

/// Render a metadata-free body with already resolved options.
pub fn render_body(markdown: &str, options: &ResolvedOptions) -> String {
    let source = sanitize(markdown);
    let source = strip_summary_markers(&source);

    let mut renderer = Renderer::new(options);
    render_markdown(&source, &mut renderer);
    let annotated = renderer.finish();
    tracing::debug!(
        input = source.len(),
        annotated = annotated.len(),
        width = options.width,
        "document rendered"
    );
    finalize(&annotated, options)
}

/// Reflow the annotated stream and decode what is left of the markers.
fn finalize(annotated: &str, options: &ResolvedOptions) -> String {
    if annotated.is_empty() {
        return String::new();
    }
    // Newlines surviving in raw HTML are soft.
    let joined = annotated.replace(" \n", " ").replace('\n', " ");
    let wrapped = reflow(
        &joined,
        &options.first_prefix,
        &options.rest_prefix,
        options.width,
    );

    let mut text: String = wrapped
        .chars()
        .map(|ch| match ch {
            NBSP => ' ',
            LINE_BREAK => '\n',
            ch => ch,
        })
        .collect();
    text.truncate(text.trim_end_matches('\n').len());
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
