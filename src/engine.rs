//! Execution boundary shared by the CLI and the REPL.
//!
//! The grammar engine never prints and never exits. This module runs one
//! expression in the requested mode and hands back either an outcome or a
//! `DescentError`; callers decide what reaches the terminal and which exit
//! status follows.

use log::info;
use miette::Report;

use crate::errors::{DescentError, SourceContext, EXPRESSION_SOURCE_NAME};
use crate::eval::{self, Evaluation};
use crate::output::OutputSink;
use crate::tac::{self, Program};

/// Which materialization a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Evaluate,
    Emit,
}

/// A successful run.
#[derive(Debug)]
pub enum Outcome {
    Evaluated(Evaluation),
    Emitted(Program),
}

/// Type alias for execution results
pub type ExecutionResult = Result<Outcome, DescentError>;

/// Runs expressions under a fixed source name.
#[derive(Debug, Clone)]
pub struct ExecutionPipeline {
    pub source_name: String,
}

impl Default for ExecutionPipeline {
    fn default() -> Self {
        Self::new(EXPRESSION_SOURCE_NAME)
    }
}

impl ExecutionPipeline {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
        }
    }

    fn source(&self, input: &str) -> SourceContext {
        SourceContext::new(self.source_name.clone(), input)
    }

    pub fn evaluate(&self, input: &str) -> Result<Evaluation, DescentError> {
        eval::evaluate_source(self.source(input))
    }

    /// Lowers `input`, streaming instructions to `sink`.
    pub fn emit(&self, input: &str, sink: &mut dyn OutputSink) -> Result<Program, DescentError> {
        tac::emit_source(self.source(input), sink)
    }

    pub fn execute(&self, mode: Mode, input: &str, sink: &mut dyn OutputSink) -> ExecutionResult {
        info!("running {:?} on {}", mode, self.source_name);
        match mode {
            Mode::Evaluate => self.evaluate(input).map(Outcome::Evaluated),
            Mode::Emit => self.emit(input, sink).map(Outcome::Emitted),
        }
    }
}

/// Prints a DescentError with full miette diagnostics (errors and warnings alike).
pub fn print_error(error: DescentError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}
