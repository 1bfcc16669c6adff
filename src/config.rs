//! Saved default flags.
//!
//! Defaults live in plain text files holding the same `--flag` tokens the
//! command line accepts, one or more per line, with `#` comments. Values
//! holding whitespace are wrapped in double quotes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::align::{ParseTableStyleError, TableStyle};
use crate::options::Options;

const APP_NAME: &str = "mdtext";
const LOCAL_CONFIG: &str = ".mdtextrc";

/// A flag token that could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid value `{value}` for {flag}")]
    InvalidValue { flag: String, value: String },
    #[error(transparent)]
    TableStyle(#[from] ParseTableStyleError),
}

/// Flags that can come from a config file or the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub width: Option<i32>,
    pub color: Option<bool>,
    pub indent1: Option<String>,
    pub indent2: Option<String>,
    pub table_style: Option<TableStyle>,
    pub header_prefix: Option<String>,
    pub header_suffix: Option<String>,
    pub no_highlight: bool,
    pub no_metadata: bool,
}

impl ConfigFlags {
    /// Merge `other` over `self`: values in `other` win, switches add up.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            width: other.width.or(self.width),
            color: other.color.or(self.color),
            indent1: other.indent1.clone().or_else(|| self.indent1.clone()),
            indent2: other.indent2.clone().or_else(|| self.indent2.clone()),
            table_style: other.table_style.or(self.table_style),
            header_prefix: other
                .header_prefix
                .clone()
                .or_else(|| self.header_prefix.clone()),
            header_suffix: other
                .header_suffix
                .clone()
                .or_else(|| self.header_suffix.clone()),
            no_highlight: self.no_highlight || other.no_highlight,
            no_metadata: self.no_metadata || other.no_metadata,
        }
    }

    /// Render options for these flags; `color_default` applies when neither
    /// `--color` nor `--no-color` was given.
    pub fn to_options(&self, color_default: bool) -> Options {
        Options {
            width: self.width.unwrap_or(0),
            color: self.color.unwrap_or(color_default),
            first_prefix: self.indent1.clone().unwrap_or_default(),
            rest_prefix: self.indent2.clone().unwrap_or_default(),
            table_style: self.table_style,
            header_prefix: self.header_prefix.clone(),
            header_suffix: self.header_suffix.clone(),
            highlight: !self.no_highlight,
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_NAME).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_NAME)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_NAME).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_NAME).join("config");
        }
    }

    PathBuf::from(LOCAL_CONFIG)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_CONFIG)
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(split_tokens)
        .collect::<Vec<_>>();
    tracing::debug!(path = %path.display(), tokens = tokens.len(), "config loaded");
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push(format!("# {APP_NAME} defaults (saved with --save)"));
    if let Some(width) = flags.width {
        lines.push(format!("--width {width}"));
    }
    match flags.color {
        Some(true) => lines.push("--color".to_string()),
        Some(false) => lines.push("--no-color".to_string()),
        None => {}
    }
    for (name, value) in [
        ("--indent1", &flags.indent1),
        ("--indent2", &flags.indent2),
        ("--header-prefix", &flags.header_prefix),
        ("--header-suffix", &flags.header_suffix),
    ] {
        if let Some(value) = value {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            lines.push(format!("{name}=\"{escaped}\""));
        }
    }
    if let Some(style) = flags.table_style {
        lines.push(format!("--table-style {style}"));
    }
    if flags.no_highlight {
        lines.push("--no-highlight".to_string());
    }
    if flags.no_metadata {
        lines.push("--no-metadata".to_string());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Collect known flags from `tokens`; anything else is skipped and bad
/// values are logged and ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        if let Err(err) = apply_token(&mut flags, tokens, &mut i) {
            tracing::warn!(%err, "ignoring config flag");
        }
        i += 1;
    }
    flags
}

fn apply_token(flags: &mut ConfigFlags, tokens: &[String], i: &mut usize) -> Result<(), FlagError> {
    match tokens[*i].as_str() {
        "--color" => flags.color = Some(true),
        "--no-color" => flags.color = Some(false),
        "--no-highlight" => flags.no_highlight = true,
        "--no-metadata" => flags.no_metadata = true,
        _ => {
            if let Some(value) = flag_value(tokens, i, "--width") {
                let value = value?;
                let width = value.parse().map_err(|_| FlagError::InvalidValue {
                    flag: "--width".to_string(),
                    value: value.to_string(),
                })?;
                flags.width = Some(width);
            } else if let Some(value) = flag_value(tokens, i, "--table-style") {
                flags.table_style = Some(value?.parse()?);
            } else if let Some(value) = flag_value(tokens, i, "--indent1") {
                flags.indent1 = Some(value?.to_string());
            } else if let Some(value) = flag_value(tokens, i, "--indent2") {
                flags.indent2 = Some(value?.to_string());
            } else if let Some(value) = flag_value(tokens, i, "--header-prefix") {
                flags.header_prefix = Some(value?.to_string());
            } else if let Some(value) = flag_value(tokens, i, "--header-suffix") {
                flags.header_suffix = Some(value?.to_string());
            }
        }
    }
    Ok(())
}

/// Value of `name` given as `name=value` or as `name value`; advances `i`
/// past a separate value token.
fn flag_value<'t>(
    tokens: &'t [String],
    i: &mut usize,
    name: &str,
) -> Option<Result<&'t str, FlagError>> {
    let token = tokens[*i].as_str();
    if let Some(value) = token.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')) {
        return Some(Ok(value));
    }
    if token != name {
        return None;
    }
    match tokens.get(*i + 1) {
        Some(value) => {
            *i += 1;
            Some(Ok(value.as_str()))
        }
        None => Some(Err(FlagError::MissingValue(name.to_string()))),
    }
}

/// Split a config line at whitespace outside double quotes. Inside quotes a
/// backslash takes the next char literally.
fn split_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if quoted => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '"' => {
                quoted = !quoted;
                started = true;
            }
            ch if ch.is_whitespace() && !quoted => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            ch => {
                current.push(ch);
                started = true;
            }
        }
    }
    if started {
        tokens.push(current);
    }
    tokens
}
