//! Render options and their resolution.

use crate::align::TableStyle;
use crate::terminal;

/// Narrowest width a render will wrap to.
pub const MIN_WIDTH: usize = 10;

const DEFAULT_HEADER_PREFIX: &str = "--[";
const DEFAULT_HEADER_SUFFIX: &str = "]--";

/// Caller-facing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Positive for an absolute width, 0 for the terminal width, negative for
    /// a width relative to the terminal width.
    pub width: i32,
    /// Allow ANSI color escape codes.
    pub color: bool,
    /// Prefix of the first output line.
    pub first_prefix: String,
    /// Prefix of every later output line.
    pub rest_prefix: String,
    /// Table border style; picked from `color` when unset.
    pub table_style: Option<TableStyle>,
    /// Text before every header, `--[` when unset.
    pub header_prefix: Option<String>,
    /// Text after every header, `]--` when unset.
    pub header_suffix: Option<String>,
    /// Syntax highlight fenced code with a known language (color only).
    pub highlight: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 0,
            color: false,
            first_prefix: String::new(),
            rest_prefix: String::new(),
            table_style: None,
            header_prefix: None,
            header_suffix: None,
            highlight: true,
        }
    }
}

/// Options with every default filled in, fixed for one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub width: usize,
    pub color: bool,
    pub first_prefix: String,
    pub rest_prefix: String,
    pub table_style: TableStyle,
    pub header_prefix: String,
    pub header_suffix: String,
    pub highlight: bool,
}

impl Options {
    /// Fill in defaults, probing the terminal only when the width needs it.
    pub fn resolve(&self) -> ResolvedOptions {
        self.resolve_with(terminal::width)
    }

    /// Fill in defaults using `terminal_width` as the automatic width source.
    pub fn resolve_with(&self, terminal_width: impl FnOnce() -> usize) -> ResolvedOptions {
        let mut width = i64::from(self.width);
        if width < 1 {
            let auto = i64::try_from(terminal_width()).unwrap_or(i64::MAX);
            width = auto.saturating_sub(1).saturating_add(width);
        }
        let width = usize::try_from(width).unwrap_or(0).max(MIN_WIDTH);

        let table_style = self.table_style.unwrap_or(if self.color {
            TableStyle::Unicode
        } else {
            TableStyle::Simple
        });

        ResolvedOptions {
            width,
            color: self.color,
            first_prefix: self.first_prefix.clone(),
            rest_prefix: self.rest_prefix.clone(),
            table_style,
            header_prefix: self
                .header_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_HEADER_PREFIX.to_string()),
            header_suffix: self
                .header_suffix
                .clone()
                .unwrap_or_else(|| DEFAULT_HEADER_SUFFIX.to_string()),
            highlight: self.highlight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_width(width: i32) -> Options {
        Options {
            width,
            ..Options::default()
        }
    }

    #[test]
    fn test_absolute_width_is_kept() {
        let resolved = with_width(60).resolve_with(|| unreachable!("terminal width not needed"));
        assert_eq!(resolved.width, 60);
    }

    #[test]
    fn test_auto_width_leaves_one_column() {
        assert_eq!(with_width(0).resolve_with(|| 100).width, 99);
    }

    #[test]
    fn test_negative_width_is_relative() {
        assert_eq!(with_width(-20).resolve_with(|| 100).width, 79);
    }

    #[test]
    fn test_width_has_a_floor() {
        assert_eq!(with_width(3).resolve_with(|| 100).width, MIN_WIDTH);
        assert_eq!(with_width(-500).resolve_with(|| 100).width, MIN_WIDTH);
        assert_eq!(with_width(0).resolve_with(|| 0).width, MIN_WIDTH);
    }

    #[test]
    fn test_table_style_follows_color() {
        let plain = with_width(40).resolve();
        assert_eq!(plain.table_style, TableStyle::Simple);

        let colored = Options {
            color: true,
            ..with_width(40)
        }
        .resolve();
        assert_eq!(colored.table_style, TableStyle::Unicode);
    }

    #[test]
    fn test_header_decoration_defaults_and_overrides() {
        let resolved = with_width(40).resolve();
        assert_eq!(resolved.header_prefix, "--[");
        assert_eq!(resolved.header_suffix, "]--");

        let bare = Options {
            header_prefix: Some(String::new()),
            header_suffix: Some(String::new()),
            ..with_width(40)
        }
        .resolve();
        assert!(bare.header_prefix.is_empty());
        assert!(bare.header_suffix.is_empty());
    }
}
