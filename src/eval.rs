//! Direct evaluation: every grammar rule returns the integer value of its
//! subtree.

use log::info;

use crate::errors::{DescentError, ErrorKind, SourceContext};
use crate::syntax::{BinaryOp, Combine, Parser, Whitespace};

/// Combiner that computes each operation immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Combine for Evaluator {
    type Value = i64;

    const PHASE: &'static str = "eval";

    const WHITESPACE: Whitespace = Whitespace::Any;

    fn literal(&mut self, value: i64) -> i64 {
        value
    }

    fn combine(&mut self, lhs: i64, op: BinaryOp, rhs: i64) -> Result<i64, ErrorKind> {
        apply(lhs, op, rhs)
    }
}

/// Checked integer arithmetic shared by the evaluator and the TAC interpreter.
/// Division truncates toward zero.
pub fn apply(lhs: i64, op: BinaryOp, rhs: i64) -> Result<i64, ErrorKind> {
    if op == BinaryOp::Div && rhs == 0 {
        return Err(ErrorKind::DivisionByZero);
    }

    let result = match op {
        BinaryOp::Add => lhs.checked_add(rhs),
        BinaryOp::Sub => lhs.checked_sub(rhs),
        BinaryOp::Mul => lhs.checked_mul(rhs),
        BinaryOp::Div => lhs.checked_div(rhs),
    };

    result.ok_or(ErrorKind::ArithmeticOverflow { lhs, op, rhs })
}

/// A computed value, plus the trailing-input warning when the expression was
/// followed by stray characters.
#[derive(Debug)]
pub struct Evaluation {
    pub value: i64,
    pub trailing: Option<DescentError>,
}

impl Evaluation {
    pub fn is_clean(&self) -> bool {
        self.trailing.is_none()
    }
}

/// Evaluates one expression.
pub fn evaluate(input: &str) -> Result<Evaluation, DescentError> {
    evaluate_source(SourceContext::from_expression(input))
}

/// Evaluates the content of `source`, reporting errors under its name.
pub fn evaluate_source(source: SourceContext) -> Result<Evaluation, DescentError> {
    let input = source.content.clone();
    let mut evaluator = Evaluator;
    let parsed = Parser::with_source(source, &input, &mut evaluator).parse()?;
    info!("evaluated {:?} to {}", input, parsed.value);

    Ok(Evaluation {
        value: parsed.value,
        trailing: parsed.trailing,
    })
}
