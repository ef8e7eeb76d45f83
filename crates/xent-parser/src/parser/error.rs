//! Parse error types.

use std::fmt;
use xent_ast::Span;
use xent_lexer::{LexError, Token};

/// Parse error with source location and context.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Kind of parse error
    pub kind: ParseErrorKind,
    /// Source location where error occurred
    pub span: Span,
    /// Human-readable error message
    pub message: String,
}

/// Category of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Input the lexer does not recognize (e.g., `@`, unterminated string).
    Lex,

    /// Unexpected token encountered where a specific token was expected.
    ///
    /// Example: Expected `)` to close a call, found `,,` instead.
    UnexpectedToken,

    /// Unexpected end of line while parsing was incomplete.
    UnexpectedEof,

    /// Tokens are present but violate the line grammar.
    ///
    /// Example: `x + 1` (a line must be a single call), or calling a
    /// computed value.
    InvalidSyntax,

    /// The line is a call, but the callee is not an instruction.
    ///
    /// Example: `print(x)`.
    UnknownInstruction,
}

impl ParseError {
    /// Create an "expected token" error.
    pub fn expected_token(expected: Token, found: Option<Token>, span: Span) -> Self {
        let message = match &found {
            Some(token) => format!("expected '{}', found '{}'", expected, token),
            None => format!("expected '{}', found end of line", expected),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            message,
        }
    }

    /// Create an "unexpected token" error.
    pub fn unexpected_token(found: Option<&Token>, context: &str, span: Span) -> Self {
        let message = match found {
            Some(token) => format!("unexpected '{}' {}", token, context),
            None => format!("unexpected end of line {}", context),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            message,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::InvalidSyntax,
            span,
            message: message.into(),
        }
    }

    /// Create an "unknown instruction" error.
    pub fn unknown_instruction(name: &str, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::UnknownInstruction,
            span,
            message: format!("unknown instruction '{}'", name),
        }
    }

    /// Wrap a lexer failure on the given line.
    pub fn lex(error: &LexError, line: u16) -> Self {
        Self {
            kind: ParseErrorKind::Lex,
            span: Span::new(line, error.span.start as u32, error.span.end as u32),
            message: format!("unrecognized input '{}'", error.text),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

impl std::error::Error for ParseError {}
