//! Descent: one recursive-descent grammar, two materializations.
//!
//! - `syntax` holds the cursor and the `expr`/`term`/`factor` engine, generic
//!   over a `Combine` implementation.
//! - `eval` computes integers; `tac` emits three-address code.
//! - `errors` is the single diagnostic type; `engine` is the boundary the
//!   CLI and REPL run through.

pub use crate::errors::{DescentError, ErrorCategory, ErrorKind};
pub use crate::eval::{evaluate, Evaluation};
pub use crate::tac::{emit, Instruction, Operand, Program, Temp};

pub mod cli;
pub mod engine;
pub mod errors;
pub mod eval;
pub mod output;
pub mod repl;
pub mod syntax;
pub mod tac;
