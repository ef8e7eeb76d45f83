//! Hand-written recursive descent parser for program lines.
//!
//! ## Architecture
//!
//! - `stream`: TokenStream wrapper with lookahead
//! - `error`: ParseError and its kinds
//! - `expr`: Expression parser using Pratt parsing
//! - `line`: Instruction call parsing for one source line
//!
//! ## Public API
//!
//! ```rust,ignore
//! pub fn parse_line(source: &str, line: u16) -> Result<ParsedLine, ParseError>
//! pub fn parse_program(source: &str) -> Result<Vec<ParsedLine>, ParseError>
//! pub fn parse_expr(source: &str) -> Result<Expr, ParseError>
//! ```

mod error;
mod stream;

pub use error::{ParseError, ParseErrorKind};
use stream::TokenStream;

mod expr;
mod line;

use xent_ast::{Expr, ParsedLine, Span};
use xent_lexer::lex_line;

/// Parse one program line.
///
/// # Parameters
/// - `source`: Text of the line (without the newline)
/// - `line`: 0-based line number, recorded in every span
///
/// # Returns
/// - `Ok(ParsedLine::Blank)` for blank and comment-only lines
/// - `Ok(ParsedLine::Call(..))` for a single instruction call
/// - `Err(ParseError)` for anything else
pub fn parse_line(source: &str, line: u16) -> Result<ParsedLine, ParseError> {
    let tokens = lex_line(source).map_err(|e| ParseError::lex(&e, line))?;
    if tokens.is_empty() {
        return Ok(ParsedLine::Blank);
    }
    let mut stream = TokenStream::new(&tokens, line);
    line::parse_instruction(&mut stream).map(ParsedLine::Call)
}

/// Parse a whole program, one entry per source line.
///
/// Stops at the first line that fails to parse.
pub fn parse_program(source: &str) -> Result<Vec<ParsedLine>, ParseError> {
    source
        .lines()
        .enumerate()
        .map(|(idx, text)| {
            let line = u16::try_from(idx).map_err(|_| {
                ParseError::invalid_syntax("program has too many lines", Span::new(u16::MAX, 0, 0))
            })?;
            parse_line(text, line)
        })
        .collect()
}

/// Parse a standalone expression (used by tests and tooling).
pub fn parse_expr(source: &str) -> Result<Expr, ParseError> {
    let tokens = lex_line(source).map_err(|e| ParseError::lex(&e, 0))?;
    if tokens.is_empty() {
        return Err(ParseError::unexpected_token(
            None,
            "in expression",
            Span::new(0, 0, 0),
        ));
    }
    let mut stream = TokenStream::new(&tokens, 0);
    let expr = expr::parse_expr(&mut stream)?;
    if !stream.at_end() {
        return Err(ParseError::unexpected_token(
            stream.peek(),
            "after expression",
            stream.current_span(),
        ));
    }
    Ok(expr)
}
