//! Handles all user-facing output for the CLI.
//!
//! Results are printed to stdout, colorized when stdout is a terminal.
//! Diagnostics never come through here; they go to stderr via
//! `engine::print_error`.

use std::io::Write;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::tac::{Operand, Program};

/// Prints `Result: <value>` in bold green.
pub fn print_result(value: i64) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "Result: {value}");
    let _ = stdout.reset();
}

/// Prints the operand holding a program's value, dimmed, after its listing.
pub fn print_operand(operand: Operand) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_dimmed(true));
    let _ = writeln!(stdout, "=> {operand}");
    let _ = stdout.reset();
}

/// JSON document printed by `tac --format json`.
#[derive(Debug, Serialize)]
pub struct TacReport<'a> {
    #[serde(flatten)]
    pub program: &'a Program,
    /// Present when the program was also run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

pub fn render_json(report: &TacReport<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
