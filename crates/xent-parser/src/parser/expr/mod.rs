//! Expression parser using Pratt parsing (precedence climbing).
//!
//! ## Precedence Levels (lowest to highest)
//!
//! 1. `or` - left associative
//! 2. `and` - left associative
//! 3. `not` - prefix
//! 4. `==`, `!=`, `<`, `<=`, `>`, `>=` (Comparison) - left associative
//! 5. `|` (Decorate) - left associative
//! 6. `+`, `-` - left associative
//! 7. `*`, `//`, `%` - left associative
//! 8. Unary `-` - prefix
//! 9. Postfix: `(args)` on identifiers
//!
//! ## Module Organization
//!
//! - `pratt` - Pratt parser core (precedence climbing, binary/unary ops, calls)
//! - `atoms` - Atomic expressions (literals, identifiers, lists, parenthesized)

mod atoms;
mod pratt;

use super::{ParseError, TokenStream};
use xent_ast::Expr;

/// Parse an expression.
pub fn parse_expr(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    pratt::parse_pratt(stream, 0)
}

