//! Atomic expressions - literals, identifiers, lists, parenthesized expressions.

use super::super::{ParseError, TokenStream};
use xent_ast::{Expr, ExprKind};
use xent_lexer::Token;

/// Parse atomic expressions.
pub(super) fn parse_atom(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();

    match stream.peek() {
        Some(Token::True) => {
            stream.advance();
            Ok(Expr::new(ExprKind::Bool(true), stream.span_from(start)))
        }
        Some(Token::False) => {
            stream.advance();
            Ok(Expr::new(ExprKind::Bool(false), stream.span_from(start)))
        }
        Some(Token::Integer(n)) => {
            stream.advance();
            Ok(Expr::new(ExprKind::Integer(*n), stream.span_from(start)))
        }
        Some(Token::Float(x)) => {
            stream.advance();
            Ok(Expr::new(ExprKind::Float(*x), stream.span_from(start)))
        }
        Some(Token::String(s)) => {
            stream.advance();
            Ok(Expr::new(
                ExprKind::String(s.to_string()),
                stream.span_from(start),
            ))
        }
        Some(Token::Ident(name)) => {
            stream.advance();
            Ok(Expr::new(
                ExprKind::Ident(name.to_string()),
                stream.span_from(start),
            ))
        }
        Some(Token::LBracket) => parse_list_literal(stream),
        Some(Token::LParen) => parse_parenthesized(stream),
        other => Err(ParseError::unexpected_token(
            other,
            "in expression",
            stream.current_span(),
        )),
    }
}

/// Parse list literal: [expr, expr, ...]
fn parse_list_literal(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::LBracket)?;

    let mut elements = Vec::new();
    while !matches!(stream.peek(), Some(Token::RBracket)) {
        elements.push(super::parse_expr(stream)?);

        if !matches!(stream.peek(), Some(Token::RBracket)) {
            stream.expect(Token::Comma)?;
        }
    }

    stream.expect(Token::RBracket)?;

    Ok(Expr::new(ExprKind::List(elements), stream.span_from(start)))
}

/// Parse parenthesized expression.
fn parse_parenthesized(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    stream.expect(Token::LParen)?;
    let expr = super::parse_expr(stream)?;
    stream.expect(Token::RParen)?;
    Ok(expr)
}
