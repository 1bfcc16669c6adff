//! Render operations for every markdown construct.
//!
//! Each operation appends to the annotated stream held in a
//! [`RenderContext`]. Container operations take their content as a callback
//! so they can wrap it in an indent frame, check whether anything visible was
//! produced, and roll the stream back when nothing was.

use std::mem;

use super::buffer::{Mark, OutputBuffer};
use super::sentinel::{
    HRULE, INDENT_MARK1, INDENT_MARK2, INDENT_START, INDENT_STOP, LINE_BREAK, NBSP, TABLE_CELL,
    TABLE_ROW, display_width, has_visible_text, is_marker,
};
use super::table::layout_table;
use crate::align::Alignment;
use crate::highlight;
use crate::options::ResolvedOptions;
use crate::terminal::{self, Palette};

const SECTION_INDENT: &str = "    ";
const QUOTE: &str = "> ";
const BULLET: &str = "  * ";
const TAB_STOP: usize = 4;

/// Header row of a table whose first cell reads this is dropped.
const OMIT_HEADER: &str = "omit";

/// Kind of list item, deciding its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListItemKind {
    Bullet,
    /// Ordered item carrying its number.
    Ordered(usize),
    /// Task item, checked or not.
    Task(bool),
    /// Description list term, collected until the list ends.
    Term,
    /// Description list details, collected until the list ends.
    Definition,
}

impl ListItemKind {
    fn marker(self) -> String {
        match self {
            Self::Bullet => BULLET.to_string(),
            Self::Ordered(number) => format!("{number:>2}. "),
            Self::Task(true) => "[x] ".to_string(),
            Self::Task(false) => "[ ] ".to_string(),
            Self::Term | Self::Definition => String::new(),
        }
    }
}

/// Mutable state of one render pass.
#[derive(Debug, Default)]
pub struct RenderContext {
    out: OutputBuffer,
    /// Open header section frames.
    depth: usize,
    /// Continuation prefix width of every open frame.
    frames: Vec<usize>,
    /// Alternating term and definition text of the innermost description list.
    definitions: Vec<String>,
    /// Footnote labels in order of first reference.
    footnotes: Vec<String>,
    /// Definition column of the innermost description list.
    term_column: usize,
    /// Start of the first grid or code block since the last definition began.
    block_at: Option<Mark>,
}

impl RenderContext {
    pub fn output(&self) -> &OutputBuffer {
        &self.out
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Columns taken by the prefixes of all open frames.
    pub fn current_indent(&self) -> usize {
        self.frames.iter().sum()
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            mark: self.out.mark(),
            depth: self.depth,
            frames: self.frames.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.out.rollback_to(checkpoint.mark);
        self.depth = checkpoint.depth;
        self.frames = checkpoint.frames;
    }
}

/// Buffer length and frame stack to return to when content turns out empty.
#[derive(Debug, Clone)]
struct Checkpoint {
    mark: Mark,
    depth: usize,
    frames: Vec<usize>,
}

/// Writes the annotated stream for one document.
#[derive(Debug)]
pub struct Renderer<'o> {
    options: &'o ResolvedOptions,
    palette: Option<&'static Palette>,
    ctx: RenderContext,
}

impl<'o> Renderer<'o> {
    pub fn new(options: &'o ResolvedOptions) -> Self {
        Self {
            options,
            palette: options.color.then(terminal::palette),
            ctx: RenderContext::default(),
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    /// Close every open frame and hand back the annotated stream.
    pub fn finish(mut self) -> String {
        self.close_sections();
        while !self.ctx.frames.is_empty() {
            self.close_frame();
        }
        self.ctx.out.into_string()
    }

    fn open_frame(&mut self, first: &str, rest: &str) {
        let out = &mut self.ctx.out;
        out.push(INDENT_START);
        out.push_str(first);
        out.push(INDENT_MARK1);
        out.push_str(rest);
        out.push(INDENT_MARK2);
        self.ctx.frames.push(display_width(rest));
    }

    fn close_frame(&mut self) {
        self.ctx.out.push(INDENT_STOP);
        self.ctx.frames.pop();
    }

    fn close_sections(&mut self) {
        while self.ctx.depth > 0 {
            self.close_frame();
            self.ctx.depth -= 1;
        }
    }

    /// Run container content with its own header nesting.
    ///
    /// Sections opened by headers inside the container are closed before the
    /// container's frame is.
    fn scoped(&mut self, content: impl FnOnce(&mut Self) -> bool) -> bool {
        let outer = mem::replace(&mut self.ctx.depth, 0);
        let emitted = content(self);
        self.ctx.out.trim_trailing_breaks();
        self.close_sections();
        self.ctx.depth = outer;
        emitted
    }

    /// Frame `content` with the given prefixes, dropping it if it is empty.
    fn framed(
        &mut self,
        first: &str,
        rest: &str,
        content: impl FnOnce(&mut Self) -> bool,
    ) -> bool {
        let checkpoint = self.ctx.checkpoint();
        self.open_frame(first, rest);
        let body = self.ctx.out.mark();
        if !self.scoped(content) {
            self.ctx.restore(checkpoint);
            return false;
        }
        self.ctx.out.trim_breaks_at(body);
        self.close_frame();
        true
    }

    /// Wrap inline content in a color, or in `plain` delimiters without color.
    fn decorated(
        &mut self,
        color: fn(&Palette) -> &str,
        plain: &str,
        content: impl FnOnce(&mut Self) -> bool,
    ) {
        let (open, close) = match self.palette {
            Some(palette) => (color(palette), palette.reset.as_str()),
            None => (plain, plain),
        };
        self.ctx.out.push_str(open);
        content(self);
        self.ctx.out.push_str(close);
    }

    fn open_color(&mut self, color: fn(&Palette) -> &str) {
        if let Some(palette) = self.palette {
            self.ctx.out.push_str(color(palette));
        }
    }

    fn reset_color(&mut self) {
        if let Some(palette) = self.palette {
            self.ctx.out.push_str(&palette.reset);
        }
    }

    /// Header at `level` (1-based); opens section frames so following content
    /// is indented one step per level.
    pub fn header(&mut self, level: u8, text: impl FnOnce(&mut Self) -> bool) {
        let options = self.options;
        let checkpoint = self.ctx.checkpoint();
        let target = usize::from(level.max(1)) - 1;

        self.ctx.out.ensure_blank_line();
        while self.ctx.depth > target {
            self.close_frame();
            self.ctx.depth -= 1;
        }

        let decorated = !options.header_prefix.is_empty();
        if decorated {
            let first = format!("{}{NBSP}", unbreakable(&options.header_prefix));
            let rest = " ".repeat(display_width(&options.header_prefix) + 1);
            self.open_frame(&first, &rest);
        }
        self.open_color(|palette| palette.bold.as_str());
        if !text(self) {
            self.ctx.restore(checkpoint);
            return;
        }
        self.reset_color();
        if !options.header_suffix.is_empty() {
            self.ctx.out.push(NBSP);
            self.ctx.out.push_str(&unbreakable(&options.header_suffix));
        }
        if decorated {
            self.close_frame();
        }

        while self.ctx.depth <= target {
            self.open_frame(SECTION_INDENT, SECTION_INDENT);
            self.ctx.depth += 1;
        }
        self.ctx.out.ensure_blank_line();
    }

    /// Paragraph; tight paragraphs (inside tight lists) skip the blank line.
    pub fn paragraph(&mut self, tight: bool, text: impl FnOnce(&mut Self) -> bool) {
        let mark = self.ctx.out.mark();
        if tight {
            self.ctx.out.ensure_new_line();
        } else {
            self.ctx.out.ensure_blank_line();
        }
        if !text(self) {
            self.ctx.out.rollback_to(mark);
        }
    }

    /// List container; flushes collected description list entries at the end.
    pub fn list(&mut self, items: impl FnOnce(&mut Self) -> bool) {
        let mark = self.ctx.out.mark();
        self.ctx.out.ensure_new_line();
        let outer = mem::take(&mut self.ctx.definitions);
        let emitted = items(self);
        let pending = mem::replace(&mut self.ctx.definitions, outer);
        if !emitted && pending.is_empty() {
            self.ctx.out.rollback_to(mark);
            return;
        }
        self.flush_definitions(&pending);
    }

    /// Description list: `terms` is a dry run over the terms alone that
    /// fixes the definition column before `items` renders the whole list.
    pub fn description_list(
        &mut self,
        terms: impl FnOnce(&mut Self) -> bool,
        items: impl FnOnce(&mut Self) -> bool,
    ) {
        let checkpoint = self.ctx.checkpoint();
        let footnotes = self.ctx.footnotes.len();
        let outer = mem::take(&mut self.ctx.definitions);
        terms(self);
        let measured = mem::replace(&mut self.ctx.definitions, outer);
        self.ctx.restore(checkpoint);
        self.ctx.footnotes.truncate(footnotes);

        let column = term_column(measured.iter());
        let outer = mem::replace(&mut self.ctx.term_column, column);
        self.list(items);
        self.ctx.term_column = outer;
    }

    fn flush_definitions(&mut self, pending: &[String]) {
        if pending.len() < 2 {
            return;
        }
        let column = term_column(pending.iter().step_by(2));
        let indent = " ".repeat(column);

        self.ctx.out.ensure_blank_line();
        for pair in pending.chunks_exact(2) {
            let (term, definition) = (&pair[0], &pair[1]);
            self.ctx.out.ensure_new_line();
            if let Some(block) = definition.strip_prefix(LINE_BREAK) {
                self.ctx.out.push_str(term);
                self.ctx.out.push(LINE_BREAK);
                self.open_frame(&indent, &indent);
                self.ctx.out.push_str(block);
            } else {
                let padding = " ".repeat(column - display_width(term));
                self.open_frame(&format!("{term}{padding}"), &indent);
                self.ctx.out.push_str(definition);
            }
            self.close_frame();
        }
    }

    pub fn list_item(&mut self, kind: ListItemKind, text: impl FnOnce(&mut Self) -> bool) {
        match kind {
            ListItemKind::Term => {
                let mark = self.ctx.out.mark();
                self.scoped(text);
                let captured = self.ctx.out.split_off(mark);
                self.ctx.definitions.push(clean_cell(&captured));
            }
            ListItemKind::Definition => {
                let mark = self.ctx.out.mark();
                let outer = self.ctx.block_at.take();
                // Width the definition frame will take once the terms are placed.
                self.ctx.frames.push(self.ctx.term_column);
                self.scoped(text);
                self.ctx.frames.pop();
                let first_block = mem::replace(&mut self.ctx.block_at, outer);
                let opens_with_block = first_block
                    .is_some_and(|at| !has_visible_text(self.ctx.out.between(mark, at)));
                let captured = self.ctx.out.split_off(mark);
                let captured = captured.trim_matches(LINE_BREAK);
                self.ctx.definitions.push(if opens_with_block {
                    format!("{LINE_BREAK}{captured}")
                } else {
                    captured.to_string()
                });
            }
            _ => {
                let checkpoint = self.ctx.checkpoint();
                self.ctx.out.ensure_new_line();
                let marker = kind.marker();
                let rest = " ".repeat(display_width(&marker));
                if !self.framed(&marker, &rest, text) {
                    self.ctx.restore(checkpoint);
                }
            }
        }
    }

    pub fn block_quote(&mut self, text: impl FnOnce(&mut Self) -> bool) {
        let checkpoint = self.ctx.checkpoint();
        self.ctx.out.ensure_blank_line();
        if !self.framed(QUOTE, QUOTE, text) {
            self.ctx.restore(checkpoint);
        }
    }

    /// Fenced or indented code; every source line stays one output line.
    pub fn code_block(&mut self, language: Option<&str>, text: &str) {
        let source = expand_tabs(text.strip_suffix('\n').unwrap_or(text));
        let highlighted = match (self.palette, language) {
            (Some(_), Some(language)) if self.options.highlight => {
                highlight::highlight_lines(language, &source)
            }
            _ => None,
        };

        self.ctx.out.ensure_blank_line();
        self.mark_block();
        for (idx, line) in source.split('\n').enumerate() {
            let line = line.trim_end_matches('\r');
            match highlighted.as_ref().and_then(|lines| lines.get(idx)) {
                Some(colored) => self.ctx.out.push_str(&unbreakable(colored)),
                None => {
                    self.open_color(|palette| palette.code.as_str());
                    self.ctx.out.push_str(&unbreakable(line));
                    self.reset_color();
                }
            }
            self.ctx.out.push(LINE_BREAK);
        }
        self.ctx.out.ensure_blank_line();
    }

    /// Raw HTML block, kept line for line.
    pub fn html_block(&mut self, text: &str) {
        self.ctx.out.ensure_blank_line();
        let text = text.trim_end_matches('\n');
        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                self.ctx.out.push(LINE_BREAK);
            }
            self.ctx.out.push_str(line.trim_end_matches('\r'));
        }
        self.ctx.out.ensure_blank_line();
    }

    pub fn horizontal_rule(&mut self) {
        self.ctx.out.ensure_blank_line();
        self.ctx.out.push(HRULE);
        self.ctx.out.push('-');
        self.ctx.out.ensure_blank_line();
    }

    /// Markdown table: header rows, then body rows, each produced through
    /// [`Renderer::table_row`].
    pub fn table(
        &mut self,
        alignments: &[Alignment],
        header: impl FnOnce(&mut Self) -> bool,
        body: impl FnOnce(&mut Self) -> bool,
    ) {
        let mark = self.ctx.out.mark();
        header(self);
        let header_text = self.ctx.out.split_off(mark);
        body(self);
        let body_text = self.ctx.out.split_off(mark);

        let mut header_rows = split_rows(&header_text);
        if header_rows
            .first()
            .and_then(|row| row.first())
            .is_some_and(|cell| cell == OMIT_HEADER)
        {
            header_rows.remove(0);
        }
        self.table_grid(&header_rows, &split_rows(&body_text), alignments);
    }

    pub fn table_row(&mut self, cells: impl FnOnce(&mut Self) -> bool) {
        cells(self);
        self.ctx.out.push(TABLE_ROW);
    }

    pub fn table_cell(&mut self, text: impl FnOnce(&mut Self) -> bool) {
        text(self);
        self.ctx.out.push(TABLE_CELL);
    }

    /// Lay out already split table cells at the current indentation.
    pub fn table_grid(
        &mut self,
        header: &[Vec<String>],
        body: &[Vec<String>],
        alignments: &[Alignment],
    ) {
        if header.is_empty() && body.is_empty() {
            return;
        }
        let indent = self.ctx.current_indent() + display_width(&self.options.rest_prefix);
        let available = self.options.width.saturating_sub(indent);
        let grid = layout_table(header, body, alignments, self.options.table_style, available);
        self.ctx.out.ensure_blank_line();
        self.mark_block();
        self.ctx.out.push_str(&grid);
    }

    /// Note where a block with fixed lines starts, so a definition opening
    /// with one can be moved below its term.
    fn mark_block(&mut self) {
        let mark = self.ctx.out.mark();
        self.ctx.block_at.get_or_insert(mark);
    }

    /// Footnote body, numbered in order of first reference.
    pub fn footnote_definition(&mut self, label: &str, text: impl FnOnce(&mut Self) -> bool) {
        let number = self.footnote_number(label);
        let marker = format!("[{number}] ");
        let rest = " ".repeat(display_width(&marker));
        let checkpoint = self.ctx.checkpoint();
        self.ctx.out.ensure_blank_line();
        if !self.framed(&marker, &rest, text) {
            self.ctx.restore(checkpoint);
        }
    }

    pub fn emphasis(&mut self, text: impl FnOnce(&mut Self) -> bool) {
        self.decorated(|palette| palette.emphasis.as_str(), "*", text);
    }

    pub fn strong(&mut self, text: impl FnOnce(&mut Self) -> bool) {
        self.decorated(|palette| palette.bold.as_str(), "**", text);
    }

    pub fn strong_emphasis(&mut self, text: impl FnOnce(&mut Self) -> bool) {
        self.decorated(|palette| palette.strong_emphasis.as_str(), "***", text);
    }

    pub fn strikethrough(&mut self, text: impl FnOnce(&mut Self) -> bool) {
        self.decorated(|palette| palette.strikethrough.as_str(), "~~", text);
    }

    /// Inline code; its spaces never wrap.
    pub fn code_span(&mut self, text: &str) {
        let text = unbreakable(text);
        self.decorated(|palette| palette.code.as_str(), "\"", |renderer| {
            renderer.ctx.out.push_str(&text);
            true
        });
    }

    pub fn autolink(&mut self, url: &str) {
        self.open_color(|palette| palette.link.as_str());
        self.ctx.out.push_str(url);
        self.reset_color();
    }

    /// Link shown as `[text] url`, or just the url when the text repeats it.
    pub fn link(&mut self, url: &str, title: &str, text: impl FnOnce(&mut Self) -> bool) {
        let mark = self.ctx.out.mark();
        text(self);
        let content = self.ctx.out.split_off(mark);
        if url.is_empty() {
            self.ctx.out.push_str(&content);
            return;
        }

        self.open_color(|palette| palette.link.as_str());
        if has_visible_text(&content) && super::sentinel::strip_ansi(&content) != url {
            self.ctx.out.push('[');
            self.ctx.out.push_str(&content);
            self.ctx.out.push_str("] ");
        } else if !title.is_empty() && title != url {
            self.ctx.out.push('[');
            self.ctx.out.push_str(title);
            self.ctx.out.push_str("] ");
        }
        self.ctx.out.push_str(url);
        self.reset_color();
    }

    pub fn image(&mut self, url: &str, title: &str, alt: &str) {
        self.open_color(|palette| palette.image.as_str());
        let label = if alt.trim().is_empty() { title } else { alt };
        if !label.trim().is_empty() {
            self.ctx.out.push('[');
            self.ctx.out.push_str(label.trim());
            self.ctx.out.push_str("] ");
        }
        self.ctx.out.push_str(url);
        self.reset_color();
    }

    /// Reference to a footnote, rendered as its number.
    pub fn footnote_ref(&mut self, label: &str) {
        let number = self.footnote_number(label);
        self.ctx.out.push_str(&format!("{NBSP}[{number}]"));
    }

    pub fn text(&mut self, text: &str) {
        self.ctx.out.push_str(text);
    }

    pub fn raw_html(&mut self, text: &str) {
        self.ctx.out.push_str(text);
    }

    pub fn soft_break(&mut self) {
        self.ctx.out.push(' ');
    }

    pub fn line_break(&mut self) {
        self.ctx.out.push(LINE_BREAK);
    }

    fn footnote_number(&mut self, label: &str) -> usize {
        let footnotes = &mut self.ctx.footnotes;
        if let Some(idx) = footnotes.iter().position(|known| known == label) {
            return idx + 1;
        }
        footnotes.push(label.to_string());
        footnotes.len()
    }
}

/// Turn every plain space into [`NBSP`].
fn unbreakable(text: &str) -> String {
    text.chars()
        .map(|ch| if ch == ' ' { NBSP } else { ch })
        .collect()
}

/// Expand tabs to the next multiple of [`TAB_STOP`] columns, per line.
fn expand_tabs(text: &str) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 8);
    let mut column = 0;
    for ch in text.chars() {
        match ch {
            '\t' => {
                let spaces = TAB_STOP - column % TAB_STOP;
                out.extend(std::iter::repeat_n(' ', spaces));
                column += spaces;
            }
            '\n' => {
                out.push(ch);
                column = 0;
            }
            _ => {
                out.push(ch);
                column += 1;
            }
        }
    }
    out
}

/// Split collected row text into cells, flattening each cell to one line.
fn split_rows(text: &str) -> Vec<Vec<String>> {
    text.split(TABLE_ROW)
        .filter(|row| !row.is_empty())
        .map(|row| {
            let row = row.strip_suffix(TABLE_CELL).unwrap_or(row);
            row.split(TABLE_CELL).map(clean_cell).collect()
        })
        .collect()
}

/// Definition column for `terms`: the widest term plus a two-space gap.
fn term_column<'t>(terms: impl Iterator<Item = &'t String>) -> usize {
    let widest = terms.map(|term| display_width(term)).max().unwrap_or(0);
    if widest > 0 { widest + 2 } else { 0 }
}

fn clean_cell(cell: &str) -> String {
    let flattened: String = cell
        .chars()
        .map(|ch| match ch {
            NBSP | LINE_BREAK => ' ',
            ch => ch,
        })
        .filter(|ch| !is_marker(*ch))
        .collect();
    flattened.split_whitespace().collect::<Vec<_>>().join(" ")
}
