//! Hand-written recursive descent parser for XENT game programs
//!
//! Programs are parsed one line at a time. Each non-blank line must be a
//! single instruction call; argument expressions are parsed with a Pratt
//! parser into the `xent-ast` expression tree.

pub mod parser;

pub use parser::{parse_expr, parse_line, parse_program, ParseError, ParseErrorKind};

// Re-export lexer
pub use xent_lexer::Token;
