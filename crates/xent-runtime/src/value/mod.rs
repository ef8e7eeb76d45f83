//! Runtime values
//!
//! Four kinds live in registers or flow into scoring: decorated strings,
//! string lists, per-token cross-entropy vectors and validated booleans.
//! Plain numbers and booleans only exist while an expression is evaluated.
//!
//! Operations are named methods (`concat`, `cut_before`, `add_aligned`, ...)
//! so that the domain checks stay visible where they are called.

mod token_xent;
mod validated;
mod xlist;
mod xstring;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use token_xent::TokenXentList;
pub use validated::ValidatedBool;
pub use xlist::XList;
pub use xstring::XString;

/// Failure of a value operation, before line information is attached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("token sequences differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("token sequences differ at position {position} ({left:?} vs {right:?})")]
    TokenMismatch {
        position: usize,
        left: String,
        right: String,
    },
}

/// A value produced by evaluating an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Str(XString),
    List(XList),
    Xent(TokenXentList),
    Validated(ValidatedBool),
    Number(f64),
    Bool(bool),
}

impl Value {
    /// Short kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Xent(_) => "xent vector",
            Value::Validated(_) => "validated bool",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
        }
    }

    /// False for numbers and vectors that left the `f64` range.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Number(n) => n.is_finite(),
            Value::Xent(v) => v.is_finite(),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&XString> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Truth value of a condition; only booleans qualify.
    pub fn as_condition(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Validated(v) => Some(v.value),
            _ => None,
        }
    }

    /// Non-negative integral number, as used for budgets and counts.
    pub fn as_count(&self) -> Option<usize> {
        match self {
            Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64 => {
                Some(*n as usize)
            }
            _ => None,
        }
    }
}

impl From<XString> for Value {
    fn from(s: XString) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(XString::new(s))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::List(l) => write!(f, "{}", l),
            Value::Xent(v) => write!(f, "{}", v),
            Value::Validated(v) => write!(f, "{}", v),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_count() {
        assert_eq!(Value::Number(10.0).as_count(), Some(10));
        assert_eq!(Value::Number(0.0).as_count(), Some(0));
        assert_eq!(Value::Number(-1.0).as_count(), None);
        assert_eq!(Value::Number(2.5).as_count(), None);
        assert_eq!(Value::from("10").as_count(), None);
    }

    #[test]
    fn test_conditions() {
        assert_eq!(Value::Bool(true).as_condition(), Some(true));
        assert_eq!(
            Value::Validated(ValidatedBool::new(false, "x < y")).as_condition(),
            Some(false)
        );
        assert_eq!(Value::Number(1.0).as_condition(), None);
    }

    #[test]
    fn test_serde_keeps_kinds_apart() {
        let values = vec![
            Value::Str(XString::decorated("hi", "say ")),
            Value::List(XList::from(vec![XString::new("a")])),
            Value::Xent(TokenXentList::new(vec![("hi".into(), 1.5)])),
            Value::Validated(ValidatedBool::new(true, "trace")),
            Value::Number(3.0),
            Value::Bool(false),
        ];
        let json = serde_json::to_string(&values).unwrap();
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
        assert!(json.contains(r#""kind":"xent""#));
    }
}
