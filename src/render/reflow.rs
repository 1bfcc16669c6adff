//! Indent frames and word wrapping.
//!
//! The annotated stream nests frames of the form
//! `INDENT_START first INDENT_MARK1 rest INDENT_MARK2 body INDENT_STOP`.
//! Reflow walks the frames recursively, composing prefixes as it descends,
//! and wraps every run of text between frames to the target width.

use std::iter;

use super::sentinel::{
    HRULE, INDENT_MARK1, INDENT_MARK2, INDENT_START, INDENT_STOP, LINE_BREAK, display_width,
};

/// Resolve indent frames and wrap `text` to `width` columns.
///
/// The first line produced starts with `first_prefix`, every other line with
/// `rest_prefix`. Lines in the result end with [`LINE_BREAK`]; [`NBSP`] and
/// color escapes pass through untouched.
///
/// [`NBSP`]: super::sentinel::NBSP
pub fn reflow(text: &str, first_prefix: &str, rest_prefix: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    reflow_into(&mut out, text, first_prefix, rest_prefix, width);
    out
}

fn reflow_into<'p>(
    out: &mut String,
    text: &str,
    first_prefix: &'p str,
    rest_prefix: &'p str,
    width: usize,
) {
    let start = out.len();
    let mut first = first_prefix;
    let mut text = text;
    loop {
        let Some(open) = text.find(INDENT_START) else {
            wrap_text(out, text, width, first, rest_prefix);
            return;
        };
        wrap_text(out, &text[..open], width, first, rest_prefix);
        if out.len() > start {
            first = rest_prefix;
        }

        let inside = &text[open + INDENT_START.len_utf8()..];
        let (frame, remainder) = match matching_stop(inside) {
            Some(stop) => (&inside[..stop], &inside[stop + INDENT_STOP.len_utf8()..]),
            // An unterminated frame runs to the end of the input.
            None => (inside, ""),
        };
        let (frame_first, frame) = frame.split_once(INDENT_MARK1).unwrap_or(("", frame));
        let (frame_rest, body) = frame.split_once(INDENT_MARK2).unwrap_or(("", frame));

        let inner_first = format!("{first}{frame_first}");
        let inner_rest = format!("{rest_prefix}{frame_rest}");
        reflow_into(out, body, &inner_first, &inner_rest, width);
        if out.len() > start {
            first = rest_prefix;
        }

        if remainder.is_empty() {
            return;
        }
        text = remainder;
    }
}

/// Byte offset of the `INDENT_STOP` closing a frame whose start was just
/// consumed.
fn matching_stop(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            INDENT_START => depth += 1,
            INDENT_STOP => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Word-wrap a frame-free run of text.
///
/// Hard breaks are kept, plain spaces are wrap points and runs of them
/// collapse. A line holding just [`HRULE`] and one fill character becomes a
/// rule across the full width. Every line produced, empty ones included,
/// ends with [`LINE_BREAK`].
pub fn wrap_text(out: &mut String, text: &str, width: usize, first_prefix: &str, rest_prefix: &str) {
    if text.is_empty() {
        return;
    }
    let text = text.strip_suffix(LINE_BREAK).unwrap_or(text);
    let first_width = display_width(first_prefix);
    let rest_width = display_width(rest_prefix);

    for (line_idx, line) in text.split(LINE_BREAK).enumerate() {
        let (prefix, prefix_width) = if line_idx == 0 {
            (first_prefix, first_width)
        } else {
            (rest_prefix, rest_width)
        };

        let mut chars = line.chars();
        if let (Some(HRULE), Some(fill), None) = (chars.next(), chars.next(), chars.next()) {
            out.push_str(prefix);
            out.extend(iter::repeat_n(fill, width.saturating_sub(prefix_width)));
            out.push(LINE_BREAK);
            continue;
        }

        let mut line_width = 0;
        let mut at_start = true;
        for word in line.split(' ').filter(|word| !word.is_empty()) {
            let word_width = display_width(word);
            if at_start {
                out.push_str(prefix);
                line_width = prefix_width;
                at_start = false;
            } else if line_width + 1 + word_width >= width {
                out.push(LINE_BREAK);
                out.push_str(rest_prefix);
                line_width = rest_width;
            } else {
                out.push(' ');
                line_width += 1;
            }
            out.push_str(word);
            line_width += word_width;
        }
        out.push(LINE_BREAK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::sentinel::NBSP;
    use proptest::prelude::*;

    fn lines(text: &str) -> Vec<&str> {
        text.strip_suffix(LINE_BREAK)
            .unwrap_or(text)
            .split(LINE_BREAK)
            .collect()
    }

    fn frame(first: &str, rest: &str, body: &str) -> String {
        format!("{INDENT_START}{first}{INDENT_MARK1}{rest}{INDENT_MARK2}{body}{INDENT_STOP}")
    }

    #[test]
    fn test_wraps_at_width() {
        let out = reflow("aaa bbb ccc ddd", "", "", 10);
        assert_eq!(lines(&out), vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_collapses_runs_of_spaces() {
        let out = reflow("a    b", "", "", 40);
        assert_eq!(lines(&out), vec!["a b"]);
    }

    #[test]
    fn test_overlong_word_gets_its_own_line() {
        let out = reflow("ab abcdefghijklmno cd", "", "", 10);
        assert_eq!(lines(&out), vec!["ab", "abcdefghijklmno", "cd"]);
    }

    #[test]
    fn test_nbsp_is_not_a_wrap_point() {
        let text = format!("aaaa bbb{NBSP}ccc");
        let out = reflow(&text, "", "", 10);
        assert_eq!(lines(&out), vec!["aaaa".to_string(), format!("bbb{NBSP}ccc")]);
    }

    #[test]
    fn test_hard_breaks_and_blank_lines_survive() {
        let text = format!("one{LINE_BREAK}{LINE_BREAK}two{LINE_BREAK}");
        let out = reflow(&text, "", "", 20);
        assert_eq!(lines(&out), vec!["one", "", "two"]);
    }

    #[test]
    fn test_first_and_rest_prefixes() {
        let out = reflow("aaa bbb ccc", "1> ", ".. ", 10);
        assert_eq!(lines(&out), vec!["1> aaa", ".. bbb", ".. ccc"]);
    }

    #[test]
    fn test_horizontal_rule_fills_width() {
        let text = format!("{HRULE}-");
        let out = reflow(&text, "", "", 12);
        assert_eq!(lines(&out), vec!["-".repeat(12)]);

        let out = reflow(&frame("> ", "> ", &text), "", "", 12);
        assert_eq!(lines(&out), vec![format!("> {}", "-".repeat(10))]);
    }

    #[test]
    fn test_frame_prefixes_first_and_continuation_lines() {
        let text = frame("  * ", "    ", "alpha beta gamma");
        let out = reflow(&text, "", "", 15);
        assert_eq!(lines(&out), vec!["  * alpha beta", "    gamma"]);
    }

    #[test]
    fn test_nested_frames_compose_prefixes() {
        let item = frame("  * ", "    ", "item");
        let text = frame("> ", "> ", &item);
        let out = reflow(&text, "", "", 40);
        assert_eq!(lines(&out), vec![">   * item"]);
    }

    #[test]
    fn test_text_after_frame_uses_rest_prefix() {
        let text = format!("{}after", frame("- ", "  ", &format!("inside{LINE_BREAK}")));
        let out = reflow(&text, "[", "|", 40);
        assert_eq!(lines(&out), vec!["[- inside", "|after"]);
    }

    #[test]
    fn test_unterminated_frame_runs_to_end() {
        let text = format!("{INDENT_START}> {INDENT_MARK1}> {INDENT_MARK2}quoted");
        let out = reflow(&text, "", "", 40);
        assert_eq!(lines(&out), vec!["> quoted"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(reflow("", "> ", "> ", 40), "");
    }

    #[test]
    fn test_reflow_is_idempotent_on_its_output() {
        let text = frame("> ", "> ", "the quick brown fox jumps over the lazy dog");
        let once = reflow(&text, "", "", 20);
        let twice = reflow(&once, "", "", 20);
        assert_eq!(once, twice);
    }

    proptest! {
        #[test]
        fn prop_lines_fit_unless_single_word(
            words in prop::collection::vec("[a-z]{1,12}", 0..40),
            width in 10usize..80,
        ) {
            let text = words.join(" ");
            let out = reflow(&text, "", "", width);
            for line in lines(&out) {
                prop_assert!(
                    display_width(line) <= width || !line.contains(' '),
                    "line {line:?} exceeds {width}"
                );
            }
        }

        #[test]
        fn prop_words_survive_in_order(
            words in prop::collection::vec("[a-z]{1,12}", 0..40),
            width in 10usize..80,
        ) {
            let text = words.join(" ");
            let out = reflow(&text, "", "", width);
            let rewrapped: Vec<&str> = out
                .split(|ch| ch == ' ' || ch == LINE_BREAK)
                .filter(|word| !word.is_empty())
                .collect();
            prop_assert_eq!(rewrapped, words.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
