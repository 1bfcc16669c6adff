//! Leading metadata block and summary markers.
//!
//! A document may open with `Name: value` lines terminated by a blank line.
//! Anywhere after that, a line holding only `///` marks the end of a summary:
//! once for a soft break (the summary stays in the body), twice in a row for
//! a hard break (the summary is only kept as metadata).

/// Name of the synthesized summary entry.
pub const SUMMARY: &str = "Summary";

/// The soft-break marker line including its surrounding newlines.
pub(crate) const SUMMARY_MARKER: &str = "\n///\n";

/// Ordered `(name, value)` pairs in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Split leading metadata off `raw`.
///
/// Returns the metadata and the byte offset where the body starts. Malformed
/// metadata is never an error: a line without `": "` before the first blank
/// line means the document has no metadata at all.
pub fn extract_metadata(raw: &str) -> (Metadata, usize) {
    let mut metadata = Metadata::new();
    let mut offset = 0;
    for line in raw.split('\n') {
        let trimmed = line.trim_end_matches('\r').trim_matches(' ');
        if trimmed.is_empty() {
            break;
        }
        let Some((name, value)) = trimmed.split_once(": ") else {
            // No blank line separated a block from the content, so there
            // never was a metadata block.
            metadata.clear();
            offset = 0;
            break;
        };
        metadata.push(name.trim_matches(' '), value.trim_matches(' '));
        offset += line.len() + 1;
    }
    if offset > raw.len() {
        offset = raw.len().saturating_sub(1);
    }
    // Keep the offset on a char boundary for multi-byte final lines.
    while !raw.is_char_boundary(offset) {
        offset -= 1;
    }
    if !metadata.is_empty() {
        tracing::debug!(entries = metadata.len(), offset, "metadata block found");
    }

    let rest = &raw[offset..];
    if let Some(found) = rest.find(SUMMARY_MARKER) {
        metadata.push(SUMMARY, rest[..found].trim());
        let after = &rest[found + SUMMARY_MARKER.len()..];
        if after.starts_with("///\n") || after == "///" {
            let skipped = SUMMARY_MARKER.len() + "///\n".len().min(after.len());
            offset += found + skipped;
            tracing::debug!(offset, "hard summary break");
        }
    }
    (metadata, offset)
}

/// Replace soft-break marker lines with paragraph breaks.
pub(crate) fn strip_summary_markers(body: &str) -> std::borrow::Cow<'_, str> {
    if body.contains(SUMMARY_MARKER) {
        std::borrow::Cow::Owned(body.replace(SUMMARY_MARKER, "\n\n"))
    } else {
        std::borrow::Cow::Borrowed(body)
    }
}
