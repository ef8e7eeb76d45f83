//! Pratt parser core - precedence climbing for binary and unary operators.

use super::super::{ParseError, TokenStream};
use super::atoms;
use xent_ast::{Arg, BinaryOp, Expr, ExprKind, UnaryOp};
use xent_lexer::Token;

/// Binding power of the `not` operand: comparisons bind tighter than `not`.
const NOT_OPERAND_PREC: u8 = 30;

/// Get binary operator metadata (precedence and operator enum).
///
/// Higher precedence = tighter binding. All binary operators are left
/// associative.
fn binary_op_info(token: &Token) -> Option<(u8, BinaryOp)> {
    match token {
        Token::Or => Some((10, BinaryOp::Or)),
        Token::And => Some((20, BinaryOp::And)),
        Token::EqEq => Some((30, BinaryOp::Eq)),
        Token::BangEq => Some((30, BinaryOp::Ne)),
        Token::Lt => Some((30, BinaryOp::Lt)),
        Token::LtEq => Some((30, BinaryOp::Le)),
        Token::Gt => Some((30, BinaryOp::Gt)),
        Token::GtEq => Some((30, BinaryOp::Ge)),
        Token::Pipe => Some((35, BinaryOp::Decorate)),
        Token::Plus => Some((40, BinaryOp::Add)),
        Token::Minus => Some((40, BinaryOp::Sub)),
        Token::Star => Some((50, BinaryOp::Mul)),
        Token::SlashSlash => Some((50, BinaryOp::CutBefore)),
        Token::Percent => Some((50, BinaryOp::CutAfter)),
        _ => None,
    }
}

/// Pratt parser - handles binary operators with precedence climbing.
pub(super) fn parse_pratt(stream: &mut TokenStream, min_prec: u8) -> Result<Expr, ParseError> {
    let mut left = parse_prefix(stream)?;

    while let Some(token) = stream.peek() {
        let Some((prec, op)) = binary_op_info(token) else {
            break;
        };
        if prec < min_prec {
            break;
        }

        stream.advance();
        let right = parse_pratt(stream, prec + 1)?;

        let span = left.span.merge(right.span);
        left = Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        );
    }

    Ok(left)
}

/// Parse prefix expressions (unary operators, atoms).
fn parse_prefix(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    match stream.peek() {
        Some(Token::Minus) => {
            let start = stream.current_pos();
            stream.advance();
            let operand = parse_prefix(stream)?;
            Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                stream.span_from(start),
            ))
        }
        Some(Token::Not) => {
            let start = stream.current_pos();
            stream.advance();
            let operand = parse_pratt(stream, NOT_OPERAND_PREC)?;
            Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                stream.span_from(start),
            ))
        }
        _ => parse_postfix(stream),
    }
}

/// Parse postfix expressions (function calls).
fn parse_postfix(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let expr = atoms::parse_atom(stream)?;

    if !matches!(stream.peek(), Some(Token::LParen)) {
        return Ok(expr);
    }

    let Some(func) = expr.as_ident().map(str::to_string) else {
        return Err(ParseError::invalid_syntax(
            "only named functions can be called",
            expr.span,
        ));
    };
    let args = parse_call_args(stream)?;
    let call = Expr::new(ExprKind::Call { func, args }, stream.span_from(start));

    if matches!(stream.peek(), Some(Token::LParen)) {
        return Err(ParseError::invalid_syntax(
            "only named functions can be called",
            call.span,
        ));
    }
    Ok(call)
}

/// Parse function call arguments.
fn parse_call_args(stream: &mut TokenStream) -> Result<Vec<Arg>, ParseError> {
    stream.expect(Token::LParen)?;

    let mut args = Vec::new();
    while !matches!(stream.peek(), Some(Token::RParen)) {
        let is_keyword = matches!(
            (stream.peek(), stream.peek_nth(1)),
            (Some(Token::Ident(_)), Some(Token::Eq))
        );

        if is_keyword {
            let name = match stream.advance() {
                Some(Token::Ident(name)) => name.to_string(),
                other => {
                    return Err(ParseError::unexpected_token(
                        other,
                        "as keyword argument name",
                        stream.current_span(),
                    ))
                }
            };
            stream.expect(Token::Eq)?;
            args.push(Arg::keyword(name, super::parse_expr(stream)?));
        } else {
            args.push(Arg::positional(super::parse_expr(stream)?));
        }

        if !matches!(stream.peek(), Some(Token::RParen)) {
            stream.expect(Token::Comma)?;
        }
    }

    stream.expect(Token::RParen)?;
    Ok(args)
}
