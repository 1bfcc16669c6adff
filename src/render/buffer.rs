//! Output buffer with checkpoint and rollback.

use super::sentinel::{INDENT_STOP, LINE_BREAK, is_line_boundary};

/// A saved buffer length, see [`OutputBuffer::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

/// The annotated intermediate stream a render pass writes into.
#[derive(Debug, Default, Clone)]
pub struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn push(&mut self, ch: char) {
        self.text.push(ch);
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Remember the current length.
    pub fn mark(&self) -> Mark {
        Mark(self.text.len())
    }

    /// Discard everything written since `mark`.
    pub fn rollback_to(&mut self, mark: Mark) {
        self.text.truncate(mark.0);
    }

    /// Everything written since `mark`.
    pub fn since(&self, mark: Mark) -> &str {
        self.text.get(mark.0..).unwrap_or_default()
    }

    /// Text written between two marks; empty if `to` is out of range.
    pub fn between(&self, from: Mark, to: Mark) -> &str {
        self.text.get(from.0..to.0).unwrap_or_default()
    }

    /// Remove and return everything written since `mark`.
    pub fn split_off(&mut self, mark: Mark) -> String {
        if mark.0 >= self.text.len() {
            return String::new();
        }
        self.text.split_off(mark.0)
    }

    /// Drop hard line breaks written directly at `mark`.
    pub fn trim_breaks_at(&mut self, mark: Mark) {
        let count = self
            .since(mark)
            .chars()
            .take_while(|ch| *ch == LINE_BREAK)
            .count();
        if count > 0 {
            self.text.drain(mark.0..mark.0 + count);
        }
    }

    /// Drop trailing hard line breaks.
    pub fn trim_trailing_breaks(&mut self) {
        while self.text.ends_with(LINE_BREAK) {
            self.text.pop();
        }
    }

    /// Start a new line unless the stream already sits at one.
    pub fn ensure_new_line(&mut self) {
        if let Some(last) = self.text.chars().next_back()
            && !is_line_boundary(last)
        {
            self.text.push(LINE_BREAK);
        }
    }

    /// Make sure exactly one blank line separates what follows.
    ///
    /// Never emits anything into an empty buffer. A closed frame leaves the
    /// stream at the start of a line, and its own trailing breaks collapse
    /// into that line end.
    pub fn ensure_blank_line(&mut self) {
        let open = self.text.trim_end_matches(INDENT_STOP);
        if open.len() < self.text.len() {
            let breaks = open.chars().rev().take_while(|ch| *ch == LINE_BREAK).count();
            if breaks < 2 {
                self.text.push(LINE_BREAK);
            }
            return;
        }
        let mut tail = self.text.chars().rev();
        let Some(last) = tail.next() else {
            return;
        };
        if !is_line_boundary(last) {
            self.text.push(LINE_BREAK);
            self.text.push(LINE_BREAK);
        } else if !tail.next().is_some_and(is_line_boundary) {
            self.text.push(LINE_BREAK);
        }
    }
}
