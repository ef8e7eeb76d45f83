//! Expression tree walking utilities.
//!
//! Shared pre-order traversal used by load-time validation passes.

use crate::expr::{Expr, ExprKind};

/// Recursively walk an expression tree in pre-order, calling visitor for each node.
pub fn walk_expr<V>(expr: &Expr, visitor: &mut V)
where
    V: FnMut(&Expr),
{
    visitor(expr);

    match &expr.kind {
        ExprKind::Integer(_)
        | ExprKind::Float(_)
        | ExprKind::String(_)
        | ExprKind::Bool(_)
        | ExprKind::Ident(_) => {}
        ExprKind::List(items) => {
            for item in items {
                walk_expr(item, visitor);
            }
        }
        ExprKind::Unary { operand, .. } => walk_expr(operand, visitor),
        ExprKind::Binary { left, right, .. } => {
            walk_expr(left, visitor);
            walk_expr(right, visitor);
        }
        ExprKind::Call { args, .. } => {
            for arg in args {
                walk_expr(&arg.value, visitor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Arg, BinaryOp};
    use crate::span::Span;

    fn ident(name: &str) -> Expr {
        Expr::new(ExprKind::Ident(name.to_string()), Span::default())
    }

    #[test]
    fn test_walk_visits_call_arguments() {
        let expr = Expr::new(
            ExprKind::Call {
                func: "xent".into(),
                args: vec![Arg::positional(Expr::new(
                    ExprKind::Binary {
                        op: BinaryOp::Decorate,
                        left: Box::new(ident("x")),
                        right: Box::new(ident("s")),
                    },
                    Span::default(),
                ))],
            },
            Span::default(),
        );

        let mut idents = Vec::new();
        walk_expr(&expr, &mut |node| {
            if let Some(name) = node.as_ident() {
                idents.push(name.to_string());
            }
        });
        assert_eq!(idents, vec!["x", "s"]);
    }
}
