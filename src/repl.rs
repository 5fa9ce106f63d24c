//! Descent REPL (Read-Eval-Print Loop)
//!
//! Every submitted expression is an independent run: a fresh cursor and, in
//! TAC mode, a temporary counter starting again at `t1`.

use std::io::{self, BufRead, Write};

use crate::cli::output::{print_operand, print_result};
use crate::engine::{print_error, ExecutionPipeline, ExecutionResult, Mode, Outcome};
use crate::output::StdoutSink;

/// REPL state that persists across lines
pub struct ReplState {
    pub mode: Mode,
    line_number: usize,
}

impl ReplState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            line_number: 1,
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Runs one expression; diagnostics name it `<repl:N>`.
    pub fn eval_line(&mut self, input: &str) -> ExecutionResult {
        let pipeline = ExecutionPipeline::new(format!("<repl:{}>", self.line_number));
        self.line_number += 1;
        pipeline.execute(self.mode, input, &mut StdoutSink)
    }
}

/// Main REPL entry point
pub fn run_repl(mode: Mode) {
    let stdin = io::stdin();
    run_session(mode, stdin.lock());
}

/// Drives a session over any line source until EOF or `:quit`.
pub fn run_session(mode: Mode, input: impl BufRead) {
    println!("Descent REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for help, :quit to exit");
    println!();

    let mut state = ReplState::new(mode);
    let mut input_buffer = String::new();
    let mut lines = input.lines();

    loop {
        if input_buffer.is_empty() {
            print!("{}> ", mode_name(state.mode));
        } else {
            print!("    -> ");
        }
        let _ = io::stdout().flush();

        let line = match lines.next() {
            None => {
                println!("\nGoodbye!");
                break;
            }
            Some(Err(e)) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
            Some(Ok(line)) => line,
        };
        let line = line.trim();

        if input_buffer.is_empty() && line.starts_with(':') {
            match handle_repl_command(line, &mut state) {
                ReplCommand::Continue => continue,
                ReplCommand::Quit => break,
            }
        }

        if input_buffer.is_empty() && line.is_empty() {
            continue;
        }

        if !input_buffer.is_empty() {
            input_buffer.push(' ');
        }
        input_buffer.push_str(line);

        // An empty line submits whatever has been typed, balanced or not.
        if has_open_parens(&input_buffer) && !line.is_empty() {
            continue;
        }

        let result = state.eval_line(&input_buffer);
        input_buffer.clear();
        report(result);
    }
}

fn report(result: ExecutionResult) {
    match result {
        Ok(Outcome::Evaluated(evaluation)) => {
            print_result(evaluation.value);
            if let Some(trailing) = evaluation.trailing {
                print_error(trailing);
            }
        }
        Ok(Outcome::Emitted(program)) => print_operand(program.result),
        Err(e) => print_error(e),
    }
}

/// REPL command results
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Continue,
    Quit,
}

/// Handle special REPL commands that start with ':'
fn handle_repl_command(command: &str, state: &mut ReplState) -> ReplCommand {
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default().to_ascii_lowercase();

    match name.as_str() {
        ":help" | ":h" => {
            println!("Descent REPL Commands:");
            println!("  :help, :h             Show this help");
            println!("  :quit, :q             Exit the REPL");
            println!("  :mode eval | tac      Switch between evaluating and emitting TAC");
            println!();
            println!("Enter arithmetic expressions over + - * / and parentheses.");
            println!("An expression with unclosed parentheses continues on the next line.");
            println!("In tac mode, input after a complete expression is ignored.");
            ReplCommand::Continue
        }
        ":quit" | ":q" => {
            println!("Goodbye!");
            ReplCommand::Quit
        }
        ":mode" | ":m" => {
            match words.next() {
                Some("eval") => state.mode = Mode::Evaluate,
                Some("tac") => state.mode = Mode::Emit,
                Some(other) => println!("Unknown mode: {other}. Use eval or tac."),
                None => {}
            }
            println!("Mode: {}", mode_name(state.mode));
            ReplCommand::Continue
        }
        _ => {
            println!(
                "Unknown command: {}. Type :help for available commands.",
                command
            );
            ReplCommand::Continue
        }
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Evaluate => "eval",
        Mode::Emit => "tac",
    }
}

/// More `(` than `)` so far means the user is still typing.
fn has_open_parens(input: &str) -> bool {
    let opened = input.chars().filter(|&c| c == '(').count();
    let closed = input.chars().filter(|&c| c == ')').count();
    opened > closed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_open_parens() {
        assert!(has_open_parens("(1 + 2"));
        assert!(has_open_parens("((1) + 2"));
        assert!(!has_open_parens("(1 + 2)"));
        assert!(!has_open_parens("1 + 2)"));
        assert!(!has_open_parens(""));
    }

    #[test]
    fn mode_command_switches_materialization() {
        let mut state = ReplState::new(Mode::Evaluate);
        assert_eq!(handle_repl_command(":mode tac", &mut state), ReplCommand::Continue);
        assert_eq!(state.mode, Mode::Emit);
        assert_eq!(handle_repl_command(":mode bogus", &mut state), ReplCommand::Continue);
        assert_eq!(state.mode, Mode::Emit);
        assert_eq!(handle_repl_command(":q", &mut state), ReplCommand::Quit);
    }

    #[test]
    fn each_line_is_an_independent_run() {
        let mut state = ReplState::new(Mode::Emit);
        let first = state.eval_line("1 + 2").unwrap();
        let second = state.eval_line("3 + 4").unwrap();
        match (first, second) {
            (Outcome::Emitted(a), Outcome::Emitted(b)) => {
                assert_eq!(a.instructions[0].dest, b.instructions[0].dest);
            }
            other => panic!("unexpected outcomes: {other:?}"),
        }
        assert_eq!(state.line_number(), 3);
    }

    #[test]
    fn errors_name_the_repl_line() {
        let mut state = ReplState::new(Mode::Evaluate);
        let _ = state.eval_line("1");
        let err = state.eval_line("5 / 0").unwrap_err();
        assert_eq!(err.source_info.source.name(), "<repl:2>");
    }
}
