// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for XENT game programs.
//!
//! A game program is interpreted line by line, so the lexer works on one
//! source line at a time.
//!
//! # Design
//!
//! - `Token`: all token types (keywords, operators, literals, identifiers)
//! - `#` comments are stripped during lexing (not tokens), which removes both
//!   full-line and trailing comments
//! - Token strings defined once in `TOKEN_STRINGS` table (single source of truth for Display)
//!
//! # Examples
//!
//! ```
//! # use xent_lexer::*;
//! # use logos::Logos;
//! let source = "assign(s='hello') # greet";
//! let tokens: Vec<Result<Token, ()>> = Token::lexer(source).collect();
//! assert_eq!(tokens.len(), 6);
//! ```

use logos::Logos;
use std::ops::Range;
use std::rc::Rc;

/// Program token.
///
/// Instruction and builtin names are plain identifiers; the parser decides
/// what they mean. Only the boolean literals and the logical connectives are
/// reserved words.
///
/// # Layout
///
/// Uses `#[repr(u16)]` to guarantee discriminant values are stable and
/// can be safely used to index into `TOKEN_STRINGS`.
#[derive(Logos, Debug, Clone, PartialEq)]
#[repr(u16)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
#[logos(skip r"#[^\n]*")] // Skip # comments
pub enum Token {
    // === Keywords ===
    /// Boolean literal `true`
    #[token("true")]
    True,
    /// Boolean literal `false`
    #[token("false")]
    False,
    /// Keyword `and` (logical and)
    #[token("and")]
    And,
    /// Keyword `or` (logical or)
    #[token("or")]
    Or,
    /// Keyword `not` (logical not)
    #[token("not")]
    Not,

    // === Operators ===

    // Arithmetic and string algebra
    /// Operator `+`
    #[token("+")]
    Plus,
    /// Operator `-`
    #[token("-")]
    Minus,
    /// Operator `*`
    #[token("*")]
    Star,
    /// Operator `//` (cut before delimiter)
    #[token("//")]
    SlashSlash,
    /// Operator `%` (cut after delimiter)
    #[token("%")]
    Percent,
    /// Operator `|` (decorate with context)
    #[token("|")]
    Pipe,

    // Comparison
    /// Operator `==`
    #[token("==")]
    EqEq,
    /// Operator `!=`
    #[token("!=")]
    BangEq,
    /// Operator `<`
    #[token("<")]
    Lt,
    /// Operator `<=`
    #[token("<=")]
    LtEq,
    /// Operator `>`
    #[token(">")]
    Gt,
    /// Operator `>=`
    #[token(">=")]
    GtEq,

    // Other
    /// Operator `=` (keyword argument)
    #[token("=")]
    Eq,
    /// Operator `,`
    #[token(",")]
    Comma,

    // === Delimiters ===
    /// Delimiter `(`
    #[token("(")]
    LParen,
    /// Delimiter `)`
    #[token(")")]
    RParen,
    /// Delimiter `[`
    #[token("[")]
    LBracket,
    /// Delimiter `]`
    #[token("]")]
    RBracket,

    // === Literals ===
    /// Integer literal (e.g., 42, 0, 1000)
    ///
    /// Overflowing literals fail to lex and surface as a lexer error.
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    /// Float literal (e.g., 3.14, 1.0, 5.67e-8)
    ///
    /// Literals beyond the `f64` range (e.g., `1e400`) fail to lex.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", parse_float)]
    Float(f64),

    /// String literal, single or double quoted (e.g., 'hello', "world")
    ///
    /// Uses `Rc<str>` for cheap cloning throughout the parser pipeline.
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len()-1]).map(|s| Rc::from(s.as_str()))
    })]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len()-1]).map(|s| Rc::from(s.as_str()))
    })]
    String(Rc<str>),

    /// Identifier (e.g., assign, xent, s1, flag_2)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| Rc::from(lex.slice()))]
    Ident(Rc<str>),
}

fn parse_float(lex: &mut logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Unescape a string literal content.
fn unescape_string(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some('#') => result.push('#'),
                // Unsupported escape sequence or trailing backslash
                _ => return None,
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}

/// Token string lookup table.
///
/// Indexed by the enum discriminant order.
///
/// NOTE: The `#[token("...")]` attributes above must match these strings.
const TOKEN_STRINGS: &[&str] = &[
    "true", "false", "and", "or", "not", // keywords
    "+", "-", "*", "//", "%", "|", // arithmetic
    "==", "!=", "<", "<=", ">", ">=", // comparison
    "=", ",", // other
    "(", ")", "[", "]", // delimiters
];

impl Token {
    /// Index into `TOKEN_STRINGS` for simple tokens.
    fn token_string_index(&self) -> usize {
        // Safe: Token has #[repr(u16)] so the discriminant is the leading u16
        let discriminant = unsafe { *(self as *const Token as *const u16) };
        discriminant as usize
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Integer(n) => write!(f, "{}", n),
            Token::Float(x) => write!(f, "{}", x),
            Token::String(s) => write!(f, "'{}'", s),
            Token::Ident(id) => write!(f, "{}", id),
            _ => {
                let idx = self.token_string_index();
                let s = TOKEN_STRINGS
                    .get(idx)
                    .expect("BUG: token discriminant out of bounds for TOKEN_STRINGS");
                write!(f, "{}", s)
            }
        }
    }
}

/// Lexer failure: the byte range that no token rule accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Byte range of the offending input
    pub span: Range<usize>,
    /// Offending source text
    pub text: String,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unrecognized input '{}' at {}..{}",
            self.text, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for LexError {}

/// Tokenize one program line with byte spans.
///
/// Stops at the first unrecognized input. A blank or comment-only line
/// yields an empty vector.
pub fn lex_line(source: &str) -> Result<Vec<(Token, Range<usize>)>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(LexError {
                    text: source[span.clone()].to_string(),
                    span,
                })
            }
        }
    }
    Ok(tokens)
}
