//! Three-address code emission.
//!
//! Every grammar rule returns an [`Operand`]: a literal consumed directly from
//! the input, or the temporary holding the result of an earlier instruction.
//! Each binary operation allocates a fresh temporary and emits exactly one
//! [`Instruction`], so instructions come out in post-order and every
//! temporary is defined once, before any use.
//!
//! Only a literal divided by the literal `0` is rejected while emitting. A
//! divisor held in a temporary is a runtime value and is not inspected;
//! [`Program::execute`] is where such a division finally fails.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info};
use miette::SourceSpan;
use serde::{Serialize, Serializer};

use crate::errors::{DescentError, ErrorKind, ErrorReporting, PhaseContext, SourceContext};
use crate::eval::apply;
use crate::output::OutputSink;
use crate::syntax::{BinaryOp, Combine, Parser, Whitespace};

/// A write-once temporary, displayed as `tN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Temp(pub u64);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl Serialize for Temp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Hands out `t1, t2, t3, ...` for a single run.
#[derive(Debug, Clone)]
pub struct TempAllocator {
    next: u64,
}

impl TempAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> Temp {
        let temp = Temp(self.next);
        self.next += 1;
        temp
    }

    /// Number of temporaries handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next - 1
    }
}

impl Default for TempAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a value lives: inline in the instruction, or in a temporary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    Literal(i64),
    Temp(Temp),
}

impl Operand {
    pub fn as_temp(&self) -> Option<Temp> {
        match self {
            Operand::Temp(temp) => Some(*temp),
            Operand::Literal(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{value}"),
            Operand::Temp(temp) => write!(f, "{temp}"),
        }
    }
}

/// `dest = lhs op rhs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub dest: Temp,
    pub lhs: Operand,
    pub op: BinaryOp,
    pub rhs: Operand,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} {} {}", self.dest, self.lhs, self.op, self.rhs)
    }
}

/// The instructions of one run, in emission order, and the operand holding
/// the value of the whole expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub result: Operand,
}

impl Program {
    /// The instructions as text, one per line.
    pub fn listing(&self) -> String {
        self.instructions
            .iter()
            .map(Instruction::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Runs the instructions in order and returns the value of `result`.
    ///
    /// Errors point into the listing: an arithmetic failure at the offending
    /// instruction, a temporary read before it is written (or written twice)
    /// as an internal error.
    pub fn execute(&self) -> Result<i64, DescentError> {
        let listing = self.listing();
        let context = PhaseContext::new(SourceContext::new("<tac>", listing.clone()), "run");
        let mut temps: BTreeMap<Temp, i64> = BTreeMap::new();
        let mut offset = 0;

        for instruction in &self.instructions {
            let width = instruction.to_string().len();
            let span: SourceSpan = (offset..offset + width).into();
            offset += width + 1;

            let read = |operand: Operand| match operand {
                Operand::Literal(value) => Ok(value),
                Operand::Temp(temp) => temps.get(&temp).copied().ok_or_else(|| {
                    context.internal_error(&format!("{temp} is used before it is defined"), span)
                }),
            };
            let lhs = read(instruction.lhs)?;
            let rhs = read(instruction.rhs)?;

            let value = apply(lhs, instruction.op, rhs).map_err(|kind| context.report(kind, span))?;
            if temps.insert(instruction.dest, value).is_some() {
                return Err(context.internal_error(
                    &format!("{} is defined more than once", instruction.dest),
                    span,
                ));
            }
        }

        match self.result {
            Operand::Literal(value) => Ok(value),
            Operand::Temp(temp) => temps.get(&temp).copied().ok_or_else(|| {
                context.internal_error(
                    &format!("result {temp} is never defined"),
                    (listing.len()..listing.len()).into(),
                )
            }),
        }
    }
}

/// Combiner that emits one instruction per binary operation.
pub struct Emitter<'s> {
    temps: TempAllocator,
    instructions: Vec<Instruction>,
    sink: &'s mut dyn OutputSink,
}

impl<'s> Emitter<'s> {
    pub fn new(sink: &'s mut dyn OutputSink) -> Self {
        Self {
            temps: TempAllocator::new(),
            instructions: Vec::new(),
            sink,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn finish(self, result: Operand) -> Program {
        Program {
            instructions: self.instructions,
            result,
        }
    }
}

impl Combine for Emitter<'_> {
    type Value = Operand;

    const PHASE: &'static str = "tac";

    const WHITESPACE: Whitespace = Whitespace::Blanks;

    fn literal(&mut self, value: i64) -> Operand {
        Operand::Literal(value)
    }

    fn combine(&mut self, lhs: Operand, op: BinaryOp, rhs: Operand) -> Result<Operand, ErrorKind> {
        if op == BinaryOp::Div
            && matches!(lhs, Operand::Literal(_))
            && rhs == Operand::Literal(0)
        {
            return Err(ErrorKind::DivisionByZero);
        }

        let instruction = Instruction {
            dest: self.temps.allocate(),
            lhs,
            op,
            rhs,
        };
        let line = instruction.to_string();
        debug!("emit {line}");
        self.sink.emit(&line);
        self.instructions.push(instruction);

        Ok(Operand::Temp(instruction.dest))
    }
}

/// Lowers one expression to three-address code, writing each instruction to
/// `sink` as it is produced.
///
/// Instructions already written stay written if a later part of the input
/// fails. Anything after a complete expression is ignored.
pub fn emit(input: &str, sink: &mut dyn OutputSink) -> Result<Program, DescentError> {
    emit_source(SourceContext::from_expression(input), sink)
}

/// Lowers the content of `source`, reporting errors under its name.
pub fn emit_source(
    source: SourceContext,
    sink: &mut dyn OutputSink,
) -> Result<Program, DescentError> {
    let input = source.content.clone();
    let mut emitter = Emitter::new(sink);
    let parsed = Parser::with_source(source, &input, &mut emitter).parse()?;

    if let Some(trailing) = parsed.trailing {
        debug!("ignoring trailing input: {trailing}");
    }

    let program = emitter.finish(parsed.value);
    info!(
        "lowered {:?} to {} instruction(s)",
        input,
        program.instructions.len()
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{NullSink, OutputBuffer};

    fn instr(dest: u64, lhs: Operand, op: BinaryOp, rhs: Operand) -> Instruction {
        Instruction {
            dest: Temp(dest),
            lhs,
            op,
            rhs,
        }
    }

    #[test]
    fn allocator_counts_from_one() {
        let mut temps = TempAllocator::new();
        assert_eq!(temps.allocated(), 0);
        assert_eq!(temps.allocate(), Temp(1));
        assert_eq!(temps.allocate(), Temp(2));
        assert_eq!(temps.allocated(), 2);
    }

    #[test]
    fn instruction_display() {
        let i = instr(3, Operand::Temp(Temp(1)), BinaryOp::Sub, Operand::Literal(12));
        assert_eq!(i.to_string(), "t3 = t1 - 12");
    }

    #[test]
    fn emitter_writes_to_sink_as_it_goes() {
        let mut out = OutputBuffer::new();
        let program = emit("3 + 4 * 5", &mut out).unwrap();
        assert_eq!(out.lines(), vec!["t1 = 4 * 5", "t2 = 3 + t1"]);
        assert_eq!(program.result, Operand::Temp(Temp(2)));
        assert_eq!(program.listing(), out.as_str());
    }

    #[test]
    fn literal_by_literal_zero_is_rejected() {
        let err = emit("5 / 0", &mut NullSink).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        assert_eq!(err.code(), "descent::tac::division_by_zero");
    }

    #[test]
    fn temp_operands_are_not_checked_statically() {
        let program = emit("(1 + 1) / 0", &mut NullSink).unwrap();
        assert_eq!(program.instructions.len(), 2);

        let err = program.execute().unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        assert_eq!(err.code(), "descent::run::division_by_zero");
        assert_eq!(err.span(), SourceSpan::from(11..22));
    }

    #[test]
    fn json_shape() {
        let program = emit("3 + 4 * 5", &mut NullSink).unwrap();
        let json = serde_json::to_value(&program).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "instructions": [
                    { "dest": "t1", "lhs": 4, "op": "*", "rhs": 5 },
                    { "dest": "t2", "lhs": 3, "op": "+", "rhs": "t1" }
                ],
                "result": "t2"
            })
        );
    }

    #[test]
    fn execute_rejects_use_before_definition() {
        let program = Program {
            instructions: vec![instr(1, Operand::Temp(Temp(2)), BinaryOp::Add, Operand::Literal(1))],
            result: Operand::Temp(Temp(1)),
        };
        let err = program.execute().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidProgram { .. }));
    }

    #[test]
    fn execute_rejects_redefinition() {
        let program = Program {
            instructions: vec![
                instr(1, Operand::Literal(1), BinaryOp::Add, Operand::Literal(1)),
                instr(1, Operand::Literal(2), BinaryOp::Add, Operand::Literal(2)),
            ],
            result: Operand::Temp(Temp(1)),
        };
        assert!(matches!(
            program.execute().unwrap_err().kind,
            ErrorKind::InvalidProgram { .. }
        ));
    }

    #[test]
    fn bare_literal_program_executes_to_itself() {
        let program = emit("42", &mut NullSink).unwrap();
        assert!(program.instructions.is_empty());
        assert_eq!(program.execute().unwrap(), 42);
    }
}
