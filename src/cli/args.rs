//! Defines the command-line arguments and subcommands for the Descent CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::engine::Mode;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "descent",
    version,
    about = "Evaluate arithmetic expressions or lower them to three-address code."
)]
pub struct DescentArgs {
    /// Log engine activity to stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate an expression and print its value.
    Eval {
        /// The expression, e.g. "3 + 4 * 5".
        #[arg(required = true)]
        expression: String,
    },
    /// Print the three-address code for an expression.
    ///
    /// Only spaces and tabs separate tokens here. Lowering stops at the
    /// first character that cannot continue the expression, and anything
    /// after it, a newline included, is ignored without a warning. `eval`
    /// skips every kind of whitespace and warns about leftovers.
    Tac {
        /// The expression, e.g. "3 + 4 * 5".
        #[arg(required = true)]
        expression: String,
        /// How to print the instructions.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Also run the instructions and print the value they compute.
        #[arg(long)]
        run: bool,
    },
    /// Read expressions interactively, one run per line.
    Repl {
        /// What each line produces.
        #[arg(long, value_enum, default_value_t = ReplMode::Eval)]
        mode: ReplMode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `tN = A op B` line per instruction.
    Text,
    /// The whole program as a JSON document.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReplMode {
    Eval,
    Tac,
}

impl From<ReplMode> for Mode {
    fn from(mode: ReplMode) -> Self {
        match mode {
            ReplMode::Eval => Mode::Evaluate,
            ReplMode::Tac => Mode::Emit,
        }
    }
}
