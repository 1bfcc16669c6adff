//! Grid alignment for tables.
//!
//! Lays out rows of cell text in fixed-width columns with one of a few
//! border styles. Cell text wider than its column wraps at spaces; a single
//! word wider than the column is left to overflow so callers can detect it.

use std::fmt;
use std::str::FromStr;

use crate::render::sentinel::display_width;

/// Horizontal placement of cell text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Border drawing style.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    /// Columns separated by gutters, dashes under the header.
    Simple,
    /// `|` and `+` borders.
    Ascii,
    /// Box drawing borders.
    Unicode,
}

/// Error for a table style name that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown table style `{0}` (expected simple, ascii or unicode)")]
pub struct ParseTableStyleError(String);

impl FromStr for TableStyle {
    type Err = ParseTableStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::Simple),
            "ascii" => Ok(Self::Ascii),
            "unicode" => Ok(Self::Unicode),
            other => Err(ParseTableStyleError(other.to_string())),
        }
    }
}

impl fmt::Display for TableStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Simple => "simple",
            Self::Ascii => "ascii",
            Self::Unicode => "unicode",
        })
    }
}

/// Characters for one horizontal rule: left end, fill, column joint, right end.
#[derive(Debug, Clone, Copy)]
struct Rule {
    left: &'static str,
    fill: char,
    joint: &'static str,
    right: &'static str,
}

/// Everything drawn around and between cells.
#[derive(Debug, Clone, Copy)]
pub struct Borders {
    /// Before the first column.
    pub first: &'static str,
    /// Between the first and second column.
    pub second: &'static str,
    /// Between every later pair of columns.
    pub between: &'static str,
    /// After the last column.
    pub last: &'static str,
    top: Option<Rule>,
    header: Rule,
    bottom: Option<Rule>,
}

impl TableStyle {
    pub const fn borders(self) -> Borders {
        match self {
            Self::Simple => Borders {
                first: "",
                second: "  ",
                between: "  ",
                last: "",
                top: None,
                header: Rule {
                    left: "",
                    fill: '-',
                    joint: "  ",
                    right: "",
                },
                bottom: None,
            },
            Self::Ascii => {
                let rule = Rule {
                    left: "+-",
                    fill: '-',
                    joint: "-+-",
                    right: "-+",
                };
                Borders {
                    first: "| ",
                    second: " | ",
                    between: " | ",
                    last: " |",
                    top: Some(rule),
                    header: rule,
                    bottom: Some(rule),
                }
            }
            Self::Unicode => Borders {
                first: "│ ",
                second: " │ ",
                between: " │ ",
                last: " │",
                top: Some(Rule {
                    left: "┌─",
                    fill: '─',
                    joint: "─┬─",
                    right: "─┐",
                }),
                header: Rule {
                    left: "├─",
                    fill: '─',
                    joint: "─┼─",
                    right: "─┤",
                },
                bottom: Some(Rule {
                    left: "└─",
                    fill: '─',
                    joint: "─┴─",
                    right: "─┘",
                }),
            },
        }
    }
}

impl Borders {
    /// Columns a row spends on borders for `columns` columns.
    pub fn overhead(&self, columns: usize) -> usize {
        let mut overhead = display_width(self.first) + display_width(self.last);
        if columns > 1 {
            overhead += display_width(self.second);
        }
        if columns > 2 {
            overhead += display_width(self.between) * (columns - 2);
        }
        overhead
    }

    fn separator(&self, column: usize) -> &'static str {
        if column == 1 { self.second } else { self.between }
    }
}

/// A table ready for alignment.
#[derive(Debug, Clone, Default)]
pub struct Grid<'a> {
    /// Rows drawn above the header rule.
    pub header: &'a [Vec<String>],
    pub body: &'a [Vec<String>],
    pub alignments: &'a [Alignment],
}

/// Render `grid` with the given column widths.
///
/// Lines are joined with `\n` and carry no trailing whitespace.
pub fn render_grid(grid: &Grid<'_>, widths: &[usize], style: TableStyle) -> String {
    let borders = style.borders();
    let mut lines = Vec::new();

    if let Some(rule) = borders.top {
        lines.push(render_rule(widths, rule));
    }
    for row in grid.header {
        render_row(row, widths, grid.alignments, &borders, &mut lines);
    }
    if !grid.header.is_empty() {
        lines.push(render_rule(widths, borders.header));
    }
    for row in grid.body {
        render_row(row, widths, grid.alignments, &borders, &mut lines);
    }
    if let Some(rule) = borders.bottom {
        lines.push(render_rule(widths, rule));
    }

    lines
        .iter()
        .map(|line| line.trim_end_matches(' '))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_rule(widths: &[usize], rule: Rule) -> String {
    let mut out = String::from(rule.left);
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            out.push_str(rule.joint);
        }
        out.extend(std::iter::repeat_n(rule.fill, *width));
    }
    out.push_str(rule.right);
    out
}

fn render_row(
    cells: &[String],
    widths: &[usize],
    alignments: &[Alignment],
    borders: &Borders,
    lines: &mut Vec<String>,
) {
    let wrapped: Vec<Vec<String>> = widths
        .iter()
        .enumerate()
        .map(|(idx, width)| wrap_cell(cells.get(idx).map_or("", String::as_str), *width))
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);

    for line_idx in 0..height {
        let mut out = String::from(borders.first);
        for (idx, width) in widths.iter().enumerate() {
            if idx > 0 {
                out.push_str(borders.separator(idx));
            }
            let content = wrapped[idx].get(line_idx).map_or("", String::as_str);
            let padding = width.saturating_sub(display_width(content));
            match alignments.get(idx).copied().unwrap_or_default() {
                Alignment::Right => {
                    out.push_str(&" ".repeat(padding));
                    out.push_str(content);
                }
                Alignment::Center => {
                    let left = padding / 2;
                    out.push_str(&" ".repeat(left));
                    out.push_str(content);
                    out.push_str(&" ".repeat(padding - left));
                }
                Alignment::Left => {
                    out.push_str(content);
                    out.push_str(&" ".repeat(padding));
                }
            }
        }
        out.push_str(borders.last);
        lines.push(out);
    }
}

/// Greedy word wrap of one cell; overlong words stay whole.
fn wrap_cell(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    for word in text.split(' ').filter(|word| !word.is_empty()) {
        let word_width = display_width(word);
        if !current.is_empty() && current_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_simple_grid() {
        let header = vec![cells(&["Name", "Qty"])];
        let body = vec![cells(&["apple", "3"]), cells(&["fig", "12"])];
        let grid = Grid {
            header: &header,
            body: &body,
            alignments: &[Alignment::Left, Alignment::Right],
        };
        let text = render_grid(&grid, &[5, 3], TableStyle::Simple);
        assert_eq!(text, "Name   Qty\n-----  ---\napple    3\nfig     12");
    }

    #[test]
    fn test_unicode_grid_is_rectangular() {
        let header = vec![cells(&["A", "B"])];
        let body = vec![cells(&["1", "2"])];
        let grid = Grid {
            header: &header,
            body: &body,
            alignments: &[],
        };
        let text = render_grid(&grid, &[3, 3], TableStyle::Unicode);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with('┌'));
        assert!(lines[2].starts_with('├'));
        assert!(lines[4].starts_with('└'));
        let expected = display_width(lines[0]);
        for line in &lines {
            assert_eq!(display_width(line), expected, "ragged line {line:?}");
        }
        assert_eq!(expected, 3 + 3 + TableStyle::Unicode.borders().overhead(2));
    }

    #[test]
    fn test_ascii_grid_borders() {
        let body = vec![cells(&["x"])];
        let grid = Grid {
            header: &[],
            body: &body,
            alignments: &[],
        };
        let text = render_grid(&grid, &[1], TableStyle::Ascii);
        assert_eq!(text, "+---+\n| x |\n+---+");
    }

    #[test]
    fn test_center_alignment() {
        let body = vec![cells(&["ab"])];
        let grid = Grid {
            header: &[],
            body: &body,
            alignments: &[Alignment::Center],
        };
        assert_eq!(render_grid(&grid, &[6], TableStyle::Ascii).lines().nth(1), Some("|   ab   |"));
    }

    #[test]
    fn test_cells_wrap_within_column() {
        let body = vec![cells(&["one two three", "x"])];
        let grid = Grid {
            header: &[],
            body: &body,
            alignments: &[],
        };
        let text = render_grid(&grid, &[7, 1], TableStyle::Simple);
        assert_eq!(text, "one two  x\nthree");
    }

    #[test]
    fn test_overlong_word_overflows() {
        assert_eq!(wrap_cell("abcdefgh", 3), vec!["abcdefgh".to_string()]);
        assert_eq!(wrap_cell("", 3), vec![String::new()]);
    }

    #[test]
    fn test_overhead_by_column_count() {
        let borders = TableStyle::Unicode.borders();
        assert_eq!(borders.overhead(1), 4);
        assert_eq!(borders.overhead(2), 7);
        assert_eq!(borders.overhead(4), 13);
        assert_eq!(TableStyle::Simple.borders().overhead(3), 4);
    }

    #[test]
    fn test_table_style_from_str() {
        assert_eq!("ascii".parse::<TableStyle>(), Ok(TableStyle::Ascii));
        assert!("fancy".parse::<TableStyle>().is_err());
        assert_eq!(TableStyle::Unicode.to_string(), "unicode");
    }
}
