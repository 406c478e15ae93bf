//! Rendering for the `--output` formats.
//!
//! Handlers hand over their data once; this module picks the
//! representation and writes it to stdout. Structured formats (json,
//! json-compact, yaml) always serialize the domain values themselves,
//! never the table rows, so scripted consumers see the full records.

use std::io::{self, IsTerminal, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

/// Whether ANSI color is appropriate for the given mode.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Print a collection.
///
/// `to_row` feeds the table renderer; `line` yields the one-value-per-line
/// form for `--output plain` (scripting).
pub fn emit_list<T, R>(
    format: &OutputFormat,
    quiet: bool,
    items: &[T],
    to_row: impl Fn(&T) -> R,
    line: impl Fn(&T) -> String,
) where
    T: Serialize,
    R: Tabled,
{
    let text = match format {
        OutputFormat::Table => {
            let rows: Vec<R> = items.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Plain => items.iter().map(line).collect::<Vec<_>>().join("\n"),
        structured => serialize(structured, items),
    };
    emit_text(&text, quiet);
}

/// Print a single record.
///
/// `detail` builds the multi-line table-mode view; `line` is the plain
/// form.
pub fn emit_single<T>(
    format: &OutputFormat,
    quiet: bool,
    item: &T,
    detail: impl Fn(&T) -> String,
    line: impl Fn(&T) -> String,
) where
    T: Serialize,
{
    let text = match format {
        OutputFormat::Table => detail(item),
        OutputFormat::Plain => line(item),
        structured => serialize(structured, item),
    };
    emit_text(&text, quiet);
}

/// Write pre-rendered text to stdout unless quiet or empty.
pub fn emit_text(text: &str, quiet: bool) {
    if quiet || text.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{text}");
}

fn serialize<T: Serialize + ?Sized>(format: &OutputFormat, data: &T) -> String {
    let result = match format {
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(|_| ()),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(|_| ()),
        _ => serde_json::to_string_pretty(data).map_err(|_| ()),
    };
    result.unwrap_or_default()
}
