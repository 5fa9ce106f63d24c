//! Syntax module for Descent expressions
//!
//! Shared vocabulary of the grammar engine: byte spans, the four binary
//! operators and the lookahead the cursor exposes.
//!
//! ```text
//! expr   = term , { ("+" | "-") , term } ;
//! term   = factor , { ("*" | "/") , factor } ;
//! factor = digit , { digit } | "(" , expr , ")" ;
//! ```

use std::fmt;

use serde::Serialize;

pub mod cursor;
pub mod grammar;

pub use cursor::{Cursor, Whitespace};
pub use grammar::{Combine, Parsed, Parser};

/// Represents a span in the source code, in bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Which grammar rule is allowed to consume an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    /// `+` and `-`, consumed by `expr`
    Additive,
    /// `*` and `/`, consumed by `term`
    Multiplicative,
}

/// The binary operators of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl BinaryOp {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            _ => None,
        }
    }

    pub const fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    pub const fn class(&self) -> OperatorClass {
        match self {
            Self::Add | Self::Sub => OperatorClass::Additive,
            Self::Mul | Self::Div => OperatorClass::Multiplicative,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The single character the parser is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead {
    Char(char),
    /// Sentinel past the last character of the input.
    End,
}

impl Lookahead {
    pub fn is(&self, expected: char) -> bool {
        *self == Lookahead::Char(expected)
    }

    pub fn digit(&self) -> Option<u32> {
        match self {
            Lookahead::Char(c) => c.to_digit(10),
            Lookahead::End => None,
        }
    }

    /// The operator under the lookahead, if it belongs to `class`.
    pub fn operator(&self, class: OperatorClass) -> Option<BinaryOp> {
        match self {
            Lookahead::Char(c) => BinaryOp::from_char(*c).filter(|op| op.class() == class),
            Lookahead::End => None,
        }
    }

    /// Width of the lookahead in bytes; the end sentinel is zero-width.
    pub fn len_utf8(&self) -> usize {
        match self {
            Lookahead::Char(c) => c.len_utf8(),
            Lookahead::End => 0,
        }
    }
}

impl fmt::Display for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookahead::Char(c) => write!(f, "'{}'", c.escape_debug()),
            Lookahead::End => write!(f, "end of input"),
        }
    }
}
