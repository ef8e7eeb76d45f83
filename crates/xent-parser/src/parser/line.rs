//! Instruction line parser.
//!
//! A non-blank line is exactly one call expression whose callee names an
//! instruction. Argument shape (positional vs keyword) is checked by the
//! runtime, which knows each instruction's contract.

use super::expr;
use super::{ParseError, TokenStream};
use xent_ast::{ExprKind, InstructionCall, InstructionKind};

/// Parse a single instruction call covering the whole line.
pub(super) fn parse_instruction(stream: &mut TokenStream) -> Result<InstructionCall, ParseError> {
    let start = stream.current_pos();
    let head = expr::parse_expr(stream)?;

    if !stream.at_end() {
        return Err(ParseError::unexpected_token(
            stream.peek(),
            "after instruction",
            stream.current_span(),
        ));
    }

    let ExprKind::Call { func, args } = head.kind else {
        return Err(ParseError::invalid_syntax(
            "line is not a single instruction call",
            head.span,
        ));
    };

    let kind = InstructionKind::from_name(&func)
        .ok_or_else(|| ParseError::unknown_instruction(&func, head.span))?;

    Ok(InstructionCall {
        kind,
        args,
        span: stream.span_from(start),
    })
}
