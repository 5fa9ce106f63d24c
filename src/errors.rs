//! Descent Error Handling - Unified Encapsulated API
//!
//! Every failure the engine can produce is a single `DescentError`: what went
//! wrong (`ErrorKind`), where it happened (`SourceInfo`) and how to present it
//! (`DiagnosticInfo`). Errors are only ever built through an `ErrorReporting`
//! context, which knows the source text and the phase that raised them.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, Severity, SourceSpan};
use thiserror::Error;

use crate::syntax::{BinaryOp, Lookahead, Span};

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Name given to expressions that did not come from a named source.
pub const EXPRESSION_SOURCE_NAME: &str = "<expr>";

/// The text an error points into, plus the name it is reported under.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Source context for a bare expression string (command line, tests).
    pub fn from_expression(content: impl Into<String>) -> Self {
        Self::new(EXPRESSION_SOURCE_NAME, content)
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// The single error type - no wrapper, no variants, just essential data
#[derive(Debug)]
pub struct DescentError {
    /// What went wrong (type-specific data)
    pub kind: ErrorKind,
    /// Where it happened (context-specific source information)
    pub source_info: SourceInfo,
    /// How to help (auto-populated based on the kind)
    pub diagnostic_info: DiagnosticInfo,
}

/// All error conditions as a clean enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // Syntax errors - the input does not follow the grammar
    #[error("unexpected {found}, expected a number or '('")]
    UnexpectedCharacter { found: Lookahead },
    #[error("expected '{expected}', found {found}")]
    ExpectedCharacter { expected: char, found: Lookahead },
    #[error("integer literal starting with {digits} does not fit in 64 bits")]
    LiteralOverflow { digits: String },
    #[error("parentheses nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    // Arithmetic errors - the input is well formed but cannot be computed
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow in {lhs} {op} {rhs}")]
    ArithmeticOverflow { lhs: i64, op: BinaryOp, rhs: i64 },

    // Trailing input - a complete expression followed by leftovers
    #[error("unexpected symbols at end of expression: {found}")]
    TrailingInput { found: Lookahead },

    // Engine invariants
    #[error("invalid program: {reason}")]
    InvalidProgram { reason: String },
}

/// Context-specific source information
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Arithmetic,
    Trailing,
    Internal,
}

impl ErrorCategory {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Syntax => "Syntax error",
            Self::Arithmetic => "Arithmetic error",
            Self::Trailing => "Trailing input",
            Self::Internal => "Internal error",
        }
    }
}

impl ErrorKind {
    /// Get the error category for test assertions and exit status decisions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnexpectedCharacter { .. }
            | Self::ExpectedCharacter { .. }
            | Self::LiteralOverflow { .. }
            | Self::NestingTooDeep { .. } => ErrorCategory::Syntax,

            Self::DivisionByZero | Self::ArithmeticOverflow { .. } => ErrorCategory::Arithmetic,

            Self::TrailingInput { .. } => ErrorCategory::Trailing,

            Self::InvalidProgram { .. } => ErrorCategory::Internal,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::UnexpectedCharacter { .. } => "unexpected_character",
            Self::ExpectedCharacter { .. } => "expected_character",
            Self::LiteralOverflow { .. } => "literal_overflow",
            Self::NestingTooDeep { .. } => "nesting_too_deep",
            Self::DivisionByZero => "division_by_zero",
            Self::ArithmeticOverflow { .. } => "arithmetic_overflow",
            Self::TrailingInput { .. } => "trailing_input",
            Self::InvalidProgram { .. } => "invalid_program",
        }
    }

    fn default_help(&self) -> Option<String> {
        match self {
            Self::UnexpectedCharacter { .. } => Some(
                "expressions are made of unsigned integers, + - * / and parentheses".into(),
            ),
            Self::ExpectedCharacter { expected: ')', .. } => {
                Some("every '(' needs a matching ')'".into())
            }
            Self::ExpectedCharacter { .. } => None,
            Self::LiteralOverflow { .. } => {
                Some(format!("literals must not exceed {}", i64::MAX))
            }
            Self::NestingTooDeep { .. } => {
                Some("split the expression or raise the nesting limit".into())
            }
            Self::DivisionByZero => Some("the divisor evaluates to zero".into()),
            Self::ArithmeticOverflow { .. } => {
                Some("every intermediate result must fit in a signed 64-bit integer".into())
            }
            Self::TrailingInput { .. } => {
                Some("the result was computed from the input before this point".into())
            }
            Self::InvalidProgram { .. } => {
                Some("This is an internal engine error. Please report this as a bug.".into())
            }
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::UnexpectedCharacter { .. } => "unexpected here",
            Self::ExpectedCharacter { .. } => "expected here",
            Self::LiteralOverflow { .. } => "literal too large",
            Self::NestingTooDeep { .. } => "nested too deep",
            Self::DivisionByZero => "division by zero",
            Self::ArithmeticOverflow { .. } => "overflows here",
            Self::TrailingInput { .. } => "not part of the expression",
            Self::InvalidProgram { .. } => "invalid instruction",
        }
    }
}

// ============================================================================
// ERROR CONSTRUCTION
// ============================================================================

/// Context-aware error creation - each context knows how to create appropriate errors
pub trait ErrorReporting {
    /// Create an error with context-appropriate enhancements
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> DescentError;

    fn unexpected_character(&self, found: Lookahead, span: SourceSpan) -> DescentError {
        self.report(ErrorKind::UnexpectedCharacter { found }, span)
    }

    fn expected_character(&self, expected: char, found: Lookahead, span: SourceSpan) -> DescentError {
        self.report(ErrorKind::ExpectedCharacter { expected, found }, span)
    }

    fn trailing_input(&self, found: Lookahead, span: SourceSpan) -> DescentError {
        self.report(ErrorKind::TrailingInput { found }, span)
    }

    /// Creates an internal error - these indicate engine bugs, not user errors.
    fn internal_error(&self, reason: &str, span: SourceSpan) -> DescentError {
        self.report(
            ErrorKind::InvalidProgram {
                reason: reason.into(),
            },
            span,
        )
    }
}

/// General-purpose error creation context: a source plus the phase name that
/// ends up in the diagnostic code (`descent::<phase>::<suffix>`).
#[derive(Debug, Clone)]
pub struct PhaseContext {
    pub source: SourceContext,
    pub phase: String,
}

impl PhaseContext {
    pub fn new(source: SourceContext, phase: impl Into<String>) -> Self {
        Self {
            source,
            phase: phase.into(),
        }
    }
}

impl ErrorReporting for PhaseContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> DescentError {
        let error_code = format!("descent::{}::{}", self.phase, kind.code_suffix());
        let help = kind.default_help();

        DescentError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                phase: self.phase.clone(),
            },
            diagnostic_info: DiagnosticInfo { help, error_code },
        }
    }
}

// ============================================================================
// PRESENTATION
// ============================================================================

impl DescentError {
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Trailing input is reported next to a valid result rather than instead of one.
    pub fn is_warning(&self) -> bool {
        self.category() == ErrorCategory::Trailing
    }

    pub fn span(&self) -> SourceSpan {
        self.source_info.primary_span
    }

    pub fn code(&self) -> &str {
        &self.diagnostic_info.error_code
    }
}

impl std::error::Error for DescentError {}

impl fmt::Display for DescentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category().label(), self.kind)
    }
}

impl Diagnostic for DescentError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn severity(&self) -> Option<Severity> {
        if self.is_warning() {
            Some(Severity::Warning)
        } else {
            Some(Severity::Error)
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

/// Converts a byte span into a miette SourceSpan.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

#[cfg(test)]
mod tests {
    use miette::Report;

    use super::*;

    fn context(src: &str) -> PhaseContext {
        PhaseContext::new(SourceContext::from_expression(src), "eval")
    }

    #[test]
    fn codes_combine_phase_and_kind() {
        let err = context("5 / 0").report(ErrorKind::DivisionByZero, (2..3).into());
        assert_eq!(err.code(), "descent::eval::division_by_zero");
        assert_eq!(err.category(), ErrorCategory::Arithmetic);
        assert_eq!(err.to_string(), "Arithmetic error: division by zero");
    }

    #[test]
    fn trailing_input_is_a_warning() {
        let err = context("3 + 4 x").trailing_input(Lookahead::Char('x'), (6..7).into());
        assert!(err.is_warning());
        assert_eq!(err.severity(), Some(Severity::Warning));
        assert_eq!(
            err.kind.to_string(),
            "unexpected symbols at end of expression: 'x'"
        );
    }

    #[test]
    fn report_renders_label_and_help() {
        let err = context("(3 + 4").expected_character(')', Lookahead::End, (6..6).into());
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("expected ')', found end of input"));
        assert!(output.contains("every '(' needs a matching ')'"));
        assert!(output.contains("descent::eval::expected_character"));
    }

    #[test]
    fn internal_errors_ask_for_a_bug_report() {
        let err = context("t1").internal_error("temp t1 used before definition", (0..2).into());
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err
            .diagnostic_info
            .help
            .as_deref()
            .is_some_and(|h| h.contains("report this as a bug")));
    }
}
