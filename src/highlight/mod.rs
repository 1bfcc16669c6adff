//! Syntax highlighting for code blocks.
//!
//! Uses syntect for highlighting with Sublime Text syntax definitions and
//! renders each line as 24-bit ANSI colored text. The terminal background is
//! guessed from `COLORFGBG` so bright themes stay readable on light terminals.

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::terminal;

/// Highlight `code` as `language`.
///
/// Returns one colored string per line of `code`, each ending with a reset,
/// or `None` when the language is unknown.
pub fn highlight_lines(language: &str, code: &str) -> Option<Vec<String>> {
    let syntax_set = syntax_set();
    let syntax = syntax_set
        .find_syntax_by_token(language)
        .or_else(|| syntax_set.find_syntax_by_name(language))?;
    let mode = background_mode();
    let reset = &terminal::palette().reset;

    let mut highlighter = HighlightLines::new(syntax, theme());
    let mut lines = Vec::new();
    for line in code.split('\n') {
        let mut out = String::new();
        match highlighter.highlight_line(line, syntax_set) {
            Ok(ranges) => {
                for (style, text) in ranges {
                    let fg = adjust_fg_for_background(
                        Rgb {
                            r: style.foreground.r,
                            g: style.foreground.g,
                            b: style.foreground.b,
                        },
                        mode,
                    );
                    out.push_str(&terminal::rgb(fg.r, fg.g, fg.b));
                    out.push_str(text);
                }
            }
            Err(err) => {
                tracing::debug!(%err, language, "highlighting failed, line left plain");
                out.push_str(line);
            }
        }
        out.push_str(reset);
        lines.push(out);
    }
    Some(lines)
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_nonewlines)
}

fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        let theme_set = ThemeSet::load_defaults();
        let preferred = match background_mode() {
            BackgroundMode::Dark => [
                "base16-ocean.dark",
                "base16-eighties.dark",
                "Solarized (dark)",
            ]
            .as_slice(),
            BackgroundMode::Light => [
                "InspiredGitHub",
                "Solarized (light)",
                "base16-ocean.light",
            ]
            .as_slice(),
        };

        for name in preferred {
            if let Some(theme) = theme_set.themes.get(*name) {
                return theme.clone();
            }
        }

        theme_set
            .themes
            .values()
            .next()
            .cloned()
            .unwrap_or_default()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackgroundMode {
    Dark,
    Light,
}

fn background_mode() -> BackgroundMode {
    background_mode_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn background_mode_from_colorfgbg(colorfgbg: Option<&str>) -> BackgroundMode {
    let Some(value) = colorfgbg else {
        return BackgroundMode::Dark;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    let Ok(bg) = bg_str.parse::<u8>() else {
        return BackgroundMode::Dark;
    };

    if bg >= 7 {
        BackgroundMode::Light
    } else {
        BackgroundMode::Dark
    }
}

fn adjust_fg_for_background(color: Rgb, mode: BackgroundMode) -> Rgb {
    match mode {
        BackgroundMode::Dark => color,
        BackgroundMode::Light => {
            let luma = (0.2126 * f32::from(color.r))
                + (0.7152 * f32::from(color.g))
                + (0.0722 * f32::from(color.b));
            if luma < 155.0 {
                return color;
            }

            let darken = |channel: u8| (f32::from(channel) * 0.42).round() as u8;
            Rgb {
                r: darken(color.r),
                g: darken(color.g),
                b: darken(color.b),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::sentinel::strip_ansi;

    #[test]
    fn test_highlight_rust_produces_colored_lines() {
        let code = "fn main() {\n    let x = 1;\n}";
        let lines = highlight_lines("rust", code).unwrap();

        assert_eq!(lines.len(), 3);
        assert!(lines.iter().any(|line| line.contains("38;2;")));
    }

    #[test]
    fn test_highlight_keeps_the_text() {
        let code = "let x = \"a b\";\n\nx + 1";
        let lines = highlight_lines("rs", code).unwrap();
        let plain: Vec<String> = lines.iter().map(|line| strip_ansi(line).into_owned()).collect();
        assert_eq!(plain, vec!["let x = \"a b\";", "", "x + 1"]);
    }

    #[test]
    fn test_highlight_lines_end_with_reset() {
        let lines = highlight_lines("python", "print(1)").unwrap();
        assert!(lines[0].ends_with(&terminal::palette().reset));
    }

    #[test]
    fn test_highlight_unknown_language() {
        assert!(highlight_lines("nope", "just text").is_none());
    }

    #[test]
    fn test_colorfgbg_dark_background() {
        let mode = background_mode_from_colorfgbg(Some("15;0"));
        assert_eq!(mode, BackgroundMode::Dark);
    }

    #[test]
    fn test_colorfgbg_light_background() {
        let mode = background_mode_from_colorfgbg(Some("0;15"));
        assert_eq!(mode, BackgroundMode::Light);
    }

    #[test]
    fn test_colorfgbg_missing_or_garbled() {
        assert_eq!(background_mode_from_colorfgbg(None), BackgroundMode::Dark);
        assert_eq!(
            background_mode_from_colorfgbg(Some("default")),
            BackgroundMode::Dark
        );
    }

    #[test]
    fn test_light_mode_darkens_bright_fg() {
        let bright = Rgb {
            r: 240,
            g: 230,
            b: 120,
        };
        let adjusted = adjust_fg_for_background(bright, BackgroundMode::Light);
        assert!(adjusted.r < bright.r);
        assert!(adjusted.g < bright.g);
        assert!(adjusted.b < bright.b);
    }

    #[test]
    fn test_light_mode_caps_luma_for_readability() {
        let bright = Rgb {
            r: 240,
            g: 230,
            b: 120,
        };
        let adjusted = adjust_fg_for_background(bright, BackgroundMode::Light);
        let luma = (0.2126 * f32::from(adjusted.r))
            + (0.7152 * f32::from(adjusted.g))
            + (0.0722 * f32::from(adjusted.b));
        assert!(luma < 120.0, "Adjusted color still too bright: {luma}");
    }

    #[test]
    fn test_dark_mode_keeps_colors() {
        let color = Rgb { r: 1, g: 2, b: 3 };
        assert_eq!(adjust_fg_for_background(color, BackgroundMode::Dark), color);
    }
}
