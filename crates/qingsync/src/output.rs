//! Rendering of command results.
//!
//! A [`Printer`] is built once from the global flags and handed to each
//! command handler; it owns the `--output` format choice and `--quiet`
//! suppression so handlers only describe *what* to show.

use std::io::{self, IsTerminal, Write as _};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

/// Writes command results to stdout in the selected format.
pub struct Printer {
    format: OutputFormat,
    quiet: bool,
}

impl Printer {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Emit a collection of items.
    ///
    /// `row` shapes one item for the table format; `ident` names it for
    /// the plain format. JSON formats serialize the items themselves.
    pub fn rows<T, R>(&self, items: &[T], row: impl Fn(&T) -> R, ident: impl Fn(&T) -> String)
    where
        T: Serialize,
        R: Tabled,
    {
        let text = match self.format {
            OutputFormat::Table => {
                let rows: Vec<R> = items.iter().map(row).collect();
                Table::new(&rows).with(Style::rounded()).to_string()
            }
            OutputFormat::Json => json(items, true),
            OutputFormat::JsonCompact => json(items, false),
            OutputFormat::Plain => items.iter().map(ident).collect::<Vec<_>>().join("\n"),
        };
        self.line(&text);
    }

    /// Emit one item. Detail views are not tabular, so the table format
    /// takes a pre-rendered block from `detail`.
    pub fn one<T: Serialize>(
        &self,
        item: &T,
        detail: impl Fn(&T) -> String,
        ident: impl Fn(&T) -> String,
    ) {
        let text = match self.format {
            OutputFormat::Table => detail(item),
            OutputFormat::Json => json(item, true),
            OutputFormat::JsonCompact => json(item, false),
            OutputFormat::Plain => ident(item),
        };
        self.line(&text);
    }

    /// Write one line of free-form text, honoring `--quiet`.
    pub fn line(&self, text: &str) {
        if self.quiet || text.is_empty() {
            return;
        }
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}", text.trim_end_matches('\n'));
    }
}

fn json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

/// True when stdout is an interactive terminal and NO_COLOR is unset.
pub fn color_enabled() -> bool {
    io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err()
}
