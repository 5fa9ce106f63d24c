//! The Descent Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions. It is the only place that decides the process
//! exit status.

use std::process;

use clap::Parser;

use crate::cli::args::{Command, DescentArgs, OutputFormat};
use crate::engine::{print_error, ExecutionPipeline};
use crate::output::{NullSink, StdoutSink};
use crate::repl;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = DescentArgs::parse();
    init_logging(args.verbose);

    let pipeline = ExecutionPipeline::default();

    // Dispatch to the appropriate subcommand handler.
    let succeeded = match args.command {
        Command::Eval { expression } => handle_eval(&pipeline, &expression),
        Command::Tac {
            expression,
            format,
            run,
        } => handle_tac(&pipeline, &expression, format, run),
        Command::Repl { mode } => {
            repl::run_repl(mode.into());
            true
        }
    };

    if !succeeded {
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    // -v starts at info; nothing in the crate logs at warn.
    let verbosity = if verbose == 0 { 0 } else { usize::from(verbose) + 1 };
    if let Err(e) = stderrlog::new()
        .module("descent")
        .verbosity(verbosity)
        .init()
    {
        eprintln!("Error initializing logging: {e}");
    }
}

/// Handles the `eval` subcommand.
fn handle_eval(pipeline: &ExecutionPipeline, expression: &str) -> bool {
    match pipeline.evaluate(expression) {
        Ok(evaluation) => {
            output::print_result(evaluation.value);
            if let Some(trailing) = evaluation.trailing {
                print_error(trailing);
            }
            true
        }
        Err(e) => {
            print_error(e);
            false
        }
    }
}

/// Handles the `tac` subcommand.
fn handle_tac(pipeline: &ExecutionPipeline, expression: &str, format: OutputFormat, run: bool) -> bool {
    let emitted = match format {
        OutputFormat::Text => pipeline.emit(expression, &mut StdoutSink),
        OutputFormat::Json => pipeline.emit(expression, &mut NullSink),
    };
    let program = match emitted {
        Ok(program) => program,
        Err(e) => {
            print_error(e);
            return false;
        }
    };

    let value = if run {
        match program.execute() {
            Ok(value) => Some(value),
            Err(e) => {
                print_error(e);
                return false;
            }
        }
    } else {
        None
    };

    match format {
        OutputFormat::Text => {
            if let Some(value) = value {
                output::print_result(value);
            }
        }
        OutputFormat::Json => {
            let report = output::TacReport {
                program: &program,
                value,
            };
            match output::render_json(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error: could not serialize program: {e}");
                    return false;
                }
            }
        }
    }

    true
}
