//! mdtext - render markdown as reflowed plain text for the terminal.
//!
//! # Usage
//!
//! ```bash
//! mdtext README.md
//! mdtext --width 72 --no-color README.md
//! cat notes.md | mdtext --table-style ascii
//! ```

use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use mdtext::align::TableStyle;
use mdtext::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use mdtext::metadata::Metadata;
use mdtext::render::{markdown_to_text, markdown_to_text_no_metadata};

/// Render markdown as reflowed plain text
#[derive(Parser, Debug)]
#[command(name = "mdtext", version, about, long_about = None)]
struct Cli {
    /// Markdown file to render; standard input when omitted or `-`
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output width: positive is absolute, 0 is the terminal width, negative
    /// is relative to the terminal width
    #[arg(short, long, allow_negative_numbers = true)]
    width: Option<i32>,

    /// Always emit ANSI colors
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Never emit ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Prefix for the first output line
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    indent1: Option<String>,

    /// Prefix for every later output line
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    indent2: Option<String>,

    /// Table border style
    #[arg(long, value_enum)]
    table_style: Option<TableStyle>,

    /// Text placed before every header
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    header_prefix: Option<String>,

    /// Text placed after every header
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    header_suffix: Option<String>,

    /// Do not syntax highlight fenced code
    #[arg(long)]
    no_highlight: bool,

    /// Render a leading `Name: value` block as body text
    #[arg(long)]
    no_metadata: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        let color = if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        };
        ConfigFlags {
            width: self.width,
            color,
            indent1: self.indent1.clone(),
            indent2: self.indent2.clone(),
            table_style: self.table_style,
            header_prefix: self.header_prefix.clone(),
            header_suffix: self.header_suffix.clone(),
            no_highlight: self.no_highlight,
            no_metadata: self.no_metadata,
        }
    }
}

fn read_source(file: Option<&Path>) -> Result<String> {
    let bytes = match file {
        Some(path) if path != Path::new("-") => {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        _ => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("Failed to read standard input")?;
            bytes
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_metadata(out: &mut impl Write, metadata: &Metadata) -> io::Result<()> {
    if metadata.is_empty() {
        return Ok(());
    }
    for (name, value) in metadata.iter() {
        writeln!(out, "{name}:\n    {value}")?;
    }
    writeln!(out)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
        tracing::info!(path = %global_path.display(), "defaults saved");
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    let options = effective.to_options(io::stdout().is_terminal());
    tracing::debug!(?options, "effective options");

    let source = read_source(cli.file.as_deref())?;
    let mut out = io::stdout().lock();
    if effective.no_metadata {
        out.write_all(markdown_to_text_no_metadata(&source, &options).as_bytes())?;
    } else {
        let (metadata, body) = markdown_to_text(&source, &options);
        write_metadata(&mut out, &metadata)?;
        out.write_all(body.as_bytes())?;
    }
    out.flush().context("Failed to write output")
}
