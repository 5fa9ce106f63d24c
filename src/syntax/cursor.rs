//! Single-character lookahead cursor over an expression string.

use log::trace;

use crate::errors::ErrorKind;
use crate::syntax::{Lookahead, Span};

/// Which characters the cursor treats as insignificant between tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whitespace {
    /// Space and horizontal tab only.
    Blanks,
    /// Every Unicode whitespace character, newlines included.
    Any,
}

impl Whitespace {
    pub fn skips(&self, c: char) -> bool {
        match self {
            Whitespace::Blanks => c == ' ' || c == '\t',
            Whitespace::Any => c.is_whitespace(),
        }
    }
}

/// Byte cursor whose lookahead always rests on a significant character or
/// on `Lookahead::End`.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    whitespace: Whitespace,
    /// Byte offset of the lookahead; `input.len()` once exhausted.
    offset: usize,
    /// Byte offset just past the last consumed character.
    consumed: usize,
    lookahead: Lookahead,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor with the first significant character already loaded.
    pub fn new(input: &'a str, whitespace: Whitespace) -> Self {
        let mut cursor = Self {
            input,
            whitespace,
            offset: 0,
            consumed: 0,
            lookahead: Lookahead::End,
        };
        cursor.settle(0);
        cursor
    }

    pub fn peek(&self) -> Lookahead {
        self.lookahead
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    /// Span covering the lookahead (zero-width at the end of input).
    pub fn span(&self) -> Span {
        Span::new(self.offset, self.offset + self.lookahead.len_utf8())
    }

    pub fn consumed_end(&self) -> usize {
        self.consumed
    }

    pub fn is_at_end(&self) -> bool {
        self.lookahead == Lookahead::End
    }

    /// Unconsumed input, starting at the lookahead.
    pub fn remaining(&self) -> &'a str {
        &self.input[self.offset..]
    }

    /// The input text under `span`, skipped whitespace included.
    pub fn slice(&self, span: Span) -> &'a str {
        &self.input[span.start..span.end]
    }

    /// Consumes the lookahead and moves to the next significant character.
    /// Advancing past the end is a no-op.
    pub fn advance(&mut self) {
        if let Lookahead::Char(c) = self.lookahead {
            trace!("consumed {:?} at byte {}", c, self.offset);
            self.consumed = self.offset + c.len_utf8();
            self.settle(self.consumed);
        }
    }

    /// Consumes `expected` or reports what was found instead.
    pub fn expect(&mut self, expected: char) -> Result<(), ErrorKind> {
        if self.lookahead.is(expected) {
            self.advance();
            Ok(())
        } else {
            Err(ErrorKind::ExpectedCharacter {
                expected,
                found: self.lookahead,
            })
        }
    }

    fn settle(&mut self, from: usize) {
        let whitespace = self.whitespace;
        let next = self.input[from..]
            .char_indices()
            .find(|&(_, c)| !whitespace.skips(c));

        match next {
            Some((index, c)) => {
                self.offset = from + index;
                self.lookahead = Lookahead::Char(c);
            }
            None => {
                self.offset = self.input.len();
                self.lookahead = Lookahead::End;
            }
        }
    }
}
