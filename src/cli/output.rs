//! CLI output formatting.
//!
//! Text output uses colored status symbols; JSON mode emits one
//! `{"type": ..., "payload": ...}` object per line for scripting.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::OwoColorize;
use serde_json::{json, Value};

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

/// How a line reacts to `--quiet` and which stream it lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    /// Progress and report text, dropped under `--quiet`.
    Regular,
    /// Always shown on stdout.
    Notice,
    /// Always shown on stderr, JSON included.
    Failure,
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn current() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Route one logical line: a typed JSON object in JSON mode, otherwise
/// whatever `text` prints, unless quiet mode drops it.
fn emit(line: Line, kind: &str, payload: Value, text: impl FnOnce()) {
    let config = current();
    if config.json {
        let object = json!({ "type": kind, "payload": payload });
        if line == Line::Failure {
            eprintln!("{object}");
        } else {
            println!("{object}");
        }
        return;
    }
    if config.quiet && line == Line::Regular {
        return;
    }
    text();
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut slot) => *slot = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

#[must_use]
pub fn is_json() -> bool {
    current().json
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    emit(
        Line::Regular,
        "header",
        json!({ "app": "gdploa", "version": version }),
        || {
            println!("{} {}", "gdploa".bold(), version.dimmed());
            println!();
        },
    );
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        Line::Regular,
        "field",
        json!({ "label": label, "value": value }),
        || println!("  {:<24} {}", label.dimmed(), value),
    );
}

/// Print a success line.
pub fn success(message: &str) {
    emit(Line::Regular, "success", json!({ "message": message }), || {
        println!("  {} {}", "✓".green(), message);
    });
}

pub fn warning(message: &str) {
    emit(Line::Notice, "warning", json!({ "message": message }), || {
        println!("  {} {}", "⚠".yellow(), message);
    });
}

pub fn error(message: &str) {
    emit(Line::Failure, "error", json!({ "message": message }), || {
        eprintln!("  {} {}", "×".red(), message);
    });
}

/// Print a section header.
pub fn section(title: &str) {
    emit(Line::Regular, "section", json!({ "title": title }), || {
        println!();
        println!("{}", title.bold());
    });
}

/// Print a document verbatim, or as a JSON payload of the given kind.
/// Documents are the command's product, so `--quiet` keeps them.
pub fn document(kind: &str, text: &str, value: Value) {
    emit(Line::Notice, kind, value, || print!("{text}"));
}
