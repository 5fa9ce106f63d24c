//! Recursive-descent grammar engine.
//!
//! `expr`, `term` and `factor` walk the input through a [`Cursor`] and hand
//! every literal and every binary operation to a [`Combine`] implementation.
//! The grammar never knows whether it is computing numbers or emitting
//! instructions; that choice is the combiner's.
//!
//! Precedence is structural: `term` only consumes `*` and `/`, `expr` only
//! consumes `+` and `-`, and only `factor` descends into parentheses.
//! Associativity is left-to-right because each loop folds the next operand
//! into the running value.

use std::fmt;

use log::debug;

use crate::errors::{
    to_source_span, DescentError, ErrorKind, ErrorReporting, PhaseContext, SourceContext,
};
use crate::syntax::{BinaryOp, Cursor, OperatorClass, Span, Whitespace};

/// Parenthesis depth accepted before the parser gives up. Each level costs
/// three stack frames, and this must fit a 2 MiB thread stack in debug builds.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// What a grammar rule hands back. The error is boxed to keep the recursive
/// frames small.
pub type RuleResult<V> = Result<V, Box<DescentError>>;

/// The materialization a grammar walk produces.
pub trait Combine {
    /// What each rule returns for its subtree.
    type Value: Clone + fmt::Debug;

    /// Phase name used in diagnostic codes.
    const PHASE: &'static str;

    /// Whitespace the cursor skips for this materialization.
    const WHITESPACE: Whitespace;

    /// A numeral consumed by `factor`.
    fn literal(&mut self, value: i64) -> Self::Value;

    /// Folds `rhs` into the running `lhs`.
    fn combine(
        &mut self,
        lhs: Self::Value,
        op: BinaryOp,
        rhs: Self::Value,
    ) -> Result<Self::Value, ErrorKind>;
}

/// Result of a successful top-level parse.
#[derive(Debug)]
pub struct Parsed<V> {
    pub value: V,
    /// Set when characters remain after the top-level `expr`.
    pub trailing: Option<DescentError>,
}

/// One parse run: a cursor over one input and the combiner it feeds.
pub struct Parser<'a, 'c, C: Combine> {
    cursor: Cursor<'a>,
    combiner: &'c mut C,
    context: PhaseContext,
    depth: usize,
    max_depth: usize,
}

impl<'a, 'c, C: Combine> Parser<'a, 'c, C> {
    pub fn new(input: &'a str, combiner: &'c mut C) -> Self {
        Self::with_source(SourceContext::from_expression(input), input, combiner)
    }

    /// Parses `input`, reporting errors against `source` (which normally holds
    /// the same text under a more descriptive name).
    pub fn with_source(source: SourceContext, input: &'a str, combiner: &'c mut C) -> Self {
        Self {
            cursor: Cursor::new(input, C::WHITESPACE),
            combiner,
            context: PhaseContext::new(source, C::PHASE),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses one top-level expression. Leftover input is not an error here:
    /// it comes back in `Parsed::trailing` for the caller to weigh.
    pub fn parse(mut self) -> Result<Parsed<C::Value>, DescentError> {
        let value = self.expr().map_err(|e| *e)?;

        let trailing = if self.cursor.is_at_end() {
            None
        } else {
            let found = self.cursor.peek();
            debug!("trailing input {} at byte {}", found, self.cursor.position());
            Some(self.context.trailing_input(found, self.here()))
        };

        Ok(Parsed { value, trailing })
    }

    /// expr = term , { ("+" | "-") , term } ;
    pub fn expr(&mut self) -> RuleResult<C::Value> {
        debug!("expr at byte {}", self.cursor.position());
        let start = self.cursor.position();
        let mut value = self.term()?;

        while let Some(op) = self.cursor.peek().operator(OperatorClass::Additive) {
            self.expect(op.symbol())?;
            let rhs = self.term()?;
            value = self.apply(value, op, rhs, start)?;
        }

        Ok(value)
    }

    /// term = factor , { ("*" | "/") , factor } ;
    pub fn term(&mut self) -> RuleResult<C::Value> {
        debug!("term at byte {}", self.cursor.position());
        let start = self.cursor.position();
        let mut value = self.factor()?;

        while let Some(op) = self.cursor.peek().operator(OperatorClass::Multiplicative) {
            self.expect(op.symbol())?;
            let rhs = self.factor()?;
            value = self.apply(value, op, rhs, start)?;
        }

        Ok(value)
    }

    /// factor = digit , { digit } | "(" , expr , ")" ;
    pub fn factor(&mut self) -> RuleResult<C::Value> {
        debug!("factor at byte {}", self.cursor.position());
        let lookahead = self.cursor.peek();

        if lookahead.digit().is_some() {
            let value = self.number()?;
            Ok(self.combiner.literal(value))
        } else if lookahead.is('(') {
            self.enter_group()?;
            self.expect('(')?;
            let value = self.expr();
            self.depth -= 1;
            let value = value?;
            self.expect(')')?;
            Ok(value)
        } else {
            Err(Box::new(self.context.unexpected_character(lookahead, self.here())))
        }
    }

    /// Consumes the maximal run of digits under the cursor.
    fn number(&mut self) -> RuleResult<i64> {
        let start = self.cursor.position();
        let mut value: i64 = 0;

        while let Some(digit) = self.cursor.peek().digit() {
            let next = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(digit)));
            match next {
                Some(next) => value = next,
                None => return Err(self.literal_overflow(start)),
            }
            self.cursor.advance();
        }

        Ok(value)
    }

    /// Reports the literal from `start` through the lookahead digit, with
    /// the whitespace the cursor skipped inside it left out.
    fn literal_overflow(&self, start: usize) -> Box<DescentError> {
        let span = Span::new(start, self.cursor.span().end);
        let digits = self
            .cursor
            .slice(span)
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        Box::new(self.context.report(
            ErrorKind::LiteralOverflow { digits },
            to_source_span(span),
        ))
    }

    fn enter_group(&mut self) -> RuleResult<()> {
        if self.depth >= self.max_depth {
            return Err(Box::new(self.context.report(
                ErrorKind::NestingTooDeep {
                    limit: self.max_depth,
                },
                self.here(),
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn expect(&mut self, expected: char) -> RuleResult<()> {
        let span = self.here();
        self.cursor
            .expect(expected)
            .map_err(|kind| Box::new(self.context.report(kind, span)))
    }

    /// Combines and, on failure, points the diagnostic at the whole operation
    /// from the start of the running operand to the end of `rhs`.
    fn apply(
        &mut self,
        lhs: C::Value,
        op: BinaryOp,
        rhs: C::Value,
        start: usize,
    ) -> RuleResult<C::Value> {
        debug!("combine {:?} {} {:?}", lhs, op, rhs);
        let span = Span::new(start, self.cursor.consumed_end());
        self.combiner
            .combine(lhs, op, rhs)
            .map_err(|kind| Box::new(self.context.report(kind, to_source_span(span))))
    }

    fn here(&self) -> miette::SourceSpan {
        to_source_span(self.cursor.span())
    }
}
