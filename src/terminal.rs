//! Terminal collaborators: width probing and ANSI escape sequences.

use std::sync::OnceLock;

use crossterm::Command;
use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};

/// Width assumed when stdout is not a terminal.
pub const FALLBACK_WIDTH: usize = 80;

/// Current terminal width in columns.
pub fn width() -> usize {
    match crossterm::terminal::size() {
        Ok((cols, _)) if cols > 0 => usize::from(cols),
        _ => FALLBACK_WIDTH,
    }
}

/// Escape sequences used for colored output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub reset: String,
    pub bold: String,
    pub code: String,
    pub emphasis: String,
    pub strong_emphasis: String,
    pub strikethrough: String,
    pub link: String,
    pub image: String,
}

impl Palette {
    fn new() -> Self {
        Self {
            reset: ansi(SetAttribute(Attribute::Reset)),
            bold: ansi(SetAttribute(Attribute::Bold)),
            code: ansi(SetForegroundColor(Color::Green)),
            emphasis: ansi(SetForegroundColor(Color::Yellow)),
            strong_emphasis: format!(
                "{}{}",
                ansi(SetAttribute(Attribute::Bold)),
                ansi(SetForegroundColor(Color::Red))
            ),
            strikethrough: ansi(SetForegroundColor(Color::White)),
            link: ansi(SetForegroundColor(Color::Blue)),
            image: ansi(SetForegroundColor(Color::Magenta)),
        }
    }
}

/// The shared color palette.
pub fn palette() -> &'static Palette {
    static PALETTE: OnceLock<Palette> = OnceLock::new();
    PALETTE.get_or_init(Palette::new)
}

/// Escape sequence setting an RGB foreground color.
pub fn rgb(r: u8, g: u8, b: u8) -> String {
    ansi(SetForegroundColor(Color::Rgb { r, g, b }))
}

fn ansi(command: impl Command) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = command.write_ansi(&mut out);
    out
}
