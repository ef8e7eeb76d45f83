// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! AST types for XENT game programs
//!
//! A program is a list of lines; each non-blank line is a single
//! instruction call whose arguments are expression trees.

pub mod expr;
pub mod line;
pub mod span;
pub mod walk;

pub use expr::{Arg, BinaryOp, Expr, ExprKind, UnaryOp};
pub use line::{InstructionCall, InstructionKind, ParsedLine};
pub use span::Span;
pub use walk::walk_expr;
