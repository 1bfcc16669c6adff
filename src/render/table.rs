//! Table width negotiation.
//!
//! Columns start at their natural width and shrink together one column at a
//! time until the grid fits the space left by the current indentation. The
//! finished grid is emitted with non-breaking spaces so reflow never wraps it.

use super::sentinel::{LINE_BREAK, NBSP, display_width};
use crate::align::{Alignment, Grid, TableStyle, render_grid};

/// Lay out a table within `available` columns.
///
/// Returns annotated text: spaces are [`NBSP`] and lines are separated by
/// [`LINE_BREAK`], with no break after the last line. A grid that cannot
/// fit even at one column per cell is emitted at its narrowest.
pub fn layout_table(
    header: &[Vec<String>],
    body: &[Vec<String>],
    alignments: &[Alignment],
    style: TableStyle,
    available: usize,
) -> String {
    let columns = header
        .iter()
        .chain(body)
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(alignments.len());
    if columns == 0 {
        return String::new();
    }

    let mut widths = natural_widths(header, body, columns);
    let budget = available.saturating_sub(style.borders().overhead(columns));
    let passes = negotiate_widths(&mut widths, budget);

    let grid = Grid {
        header,
        body,
        alignments,
    };
    let mut text = render_grid(&grid, &widths, style);
    let mut retries = 0;
    // Wrapped cells can still leave single words wider than their column.
    while text.lines().any(|line| display_width(line) > available) && shrink(&mut widths) {
        text = render_grid(&grid, &widths, style);
        retries += 1;
    }
    tracing::debug!(columns, available, passes, retries, ?widths, "table laid out");

    text.chars()
        .map(|ch| match ch {
            ' ' => NBSP,
            '\n' => LINE_BREAK,
            ch => ch,
        })
        .collect()
}

/// Widest cell of every column, at least one.
fn natural_widths(header: &[Vec<String>], body: &[Vec<String>], columns: usize) -> Vec<usize> {
    let mut widths = vec![1; columns];
    for row in header.iter().chain(body) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }
    widths
}

/// Shrink `widths` until their sum fits `budget` or nothing can shrink.
///
/// Returns the number of shrink passes taken.
pub fn negotiate_widths(widths: &mut [usize], budget: usize) -> usize {
    let mut passes = 0;
    while widths.iter().sum::<usize>() > budget && shrink(widths) {
        passes += 1;
    }
    passes
}

/// One lockstep pass: every column wider than one loses a column.
fn shrink(widths: &mut [usize]) -> bool {
    let mut changed = false;
    for width in widths.iter_mut().filter(|width| **width > 1) {
        *width -= 1;
        changed = true;
    }
    changed
}
