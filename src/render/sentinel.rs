//! Control characters embedded in the intermediate render stream.
//!
//! The renderer writes literal text interleaved with these markers; the
//! reflow pass interprets them and the final pass turns the survivors back
//! into spaces and newlines. All markers live in the C0 control range and
//! [`sanitize`] strips any literal occurrence from the input first.

use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

/// Hard line break within a block.
pub const LINE_BREAK: char = '\u{1}';
/// A space that is never a wrap point.
pub const NBSP: char = '\u{2}';
/// Opens an indent frame.
pub const INDENT_START: char = '\u{3}';
/// Ends the first-line prefix of a frame.
pub const INDENT_MARK1: char = '\u{4}';
/// Ends the continuation-line prefix of a frame.
pub const INDENT_MARK2: char = '\u{5}';
/// Closes the most recent unmatched [`INDENT_START`].
pub const INDENT_STOP: char = '\u{6}';
/// Terminates a table row before layout.
pub const TABLE_ROW: char = '\u{7}';
/// Terminates a table cell before layout.
pub const TABLE_CELL: char = '\u{8}';
/// Followed by a fill character, expands to a full-width rule.
pub const HRULE: char = '\u{b}';

const ESC: char = '\u{1b}';

/// Returns true for every marker of the control alphabet.
pub const fn is_marker(ch: char) -> bool {
    matches!(
        ch,
        LINE_BREAK
            | NBSP
            | INDENT_START
            | INDENT_MARK1
            | INDENT_MARK2
            | INDENT_STOP
            | TABLE_ROW
            | TABLE_CELL
            | HRULE
    )
}

/// Markers after which the stream is already at the start of a line.
pub const fn is_line_boundary(ch: char) -> bool {
    matches!(ch, LINE_BREAK | INDENT_MARK2 | INDENT_STOP)
}

/// Remove literal marker characters from document input.
pub fn sanitize(input: &str) -> Cow<'_, str> {
    if input.contains(is_marker) {
        Cow::Owned(input.chars().filter(|ch| !is_marker(*ch)).collect())
    } else {
        Cow::Borrowed(input)
    }
}

/// Displayed width of annotated text.
///
/// ANSI escape sequences (`ESC ... m`) count as zero columns, a
/// [`NBSP`] counts as the single space it becomes, other markers count as
/// nothing.
pub fn display_width(text: &str) -> usize {
    let mut width = 0;
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        match ch {
            ESC => skip_escape(&mut chars),
            NBSP => width += 1,
            _ => width += ch.width().unwrap_or(0),
        }
    }
    width
}

/// Strip ANSI escape sequences, keeping everything else.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    if !text.contains(ESC) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == ESC {
            skip_escape(&mut chars);
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

/// True if `text` holds anything a reader would see.
pub fn has_visible_text(text: &str) -> bool {
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == ESC {
            skip_escape(&mut chars);
        } else if !ch.is_whitespace() && !is_marker(ch) {
            return true;
        }
    }
    false
}

// A lone ESC without a terminating `m` is dropped on its own.
fn skip_escape(chars: &mut std::str::Chars<'_>) {
    let lookahead = chars.clone();
    for (consumed, ch) in lookahead.enumerate() {
        if ch == 'm' {
            for _ in 0..=consumed {
                chars.next();
            }
            return;
        }
    }
}
