//! Builtin functions
//!
//! The closed set of functions callable from program expressions. Arity is
//! checked when the program loads; argument kinds when the call runs.

use std::fmt;

use crate::error::{Error, Result};
use crate::judge::Judge;
use crate::scoring;
use crate::value::{Value, XString};

/// A builtin function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Xent,
    Nex,
    Xed,
    Dex,
    Len,
    IsTrue,
    IsFalse,
    FirstNTokens,
}

impl Builtin {
    pub const ALL: [Builtin; 8] = [
        Builtin::Xent,
        Builtin::Nex,
        Builtin::Xed,
        Builtin::Dex,
        Builtin::Len,
        Builtin::IsTrue,
        Builtin::IsFalse,
        Builtin::FirstNTokens,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Xent => "xent",
            Builtin::Nex => "nex",
            Builtin::Xed => "xed",
            Builtin::Dex => "dex",
            Builtin::Len => "len",
            Builtin::IsTrue => "is_true",
            Builtin::IsFalse => "is_false",
            Builtin::FirstNTokens => "first_n_tokens",
        }
    }

    /// Accepted number of arguments, inclusive.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Builtin::Xent | Builtin::Nex | Builtin::Xed | Builtin::Dex => (1, 2),
            Builtin::Len | Builtin::IsTrue | Builtin::IsFalse => (1, 1),
            Builtin::FirstNTokens => (2, 2),
        }
    }

    /// Resolution error if `count` arguments are not accepted.
    pub fn check_arity(&self, count: usize, line: usize) -> Result<()> {
        let (min, max) = self.arity();
        if (min..=max).contains(&count) {
            return Ok(());
        }
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        Err(Error::resolution(
            line,
            format!(
                "{}() takes {} argument(s), got {}",
                self.name(),
                expected,
                count
            ),
        ))
    }

    /// Apply the builtin to evaluated arguments.
    pub fn call(&self, args: &[Value], judge: &dyn Judge, line: usize) -> Result<Value> {
        self.check_arity(args.len(), line)?;
        let judged = |e| Error::Judge { line, source: e };

        match self {
            Builtin::Xent | Builtin::Nex | Builtin::Xed | Builtin::Dex => {
                let text = self.string_arg(args, 0, line)?;
                let context = match args.get(1) {
                    Some(_) => self.string_arg(args, 1, line)?.primary.as_str(),
                    None => "",
                };
                let measure = match self {
                    Builtin::Xent => scoring::xent,
                    Builtin::Nex => scoring::nex,
                    Builtin::Xed => scoring::xed,
                    _ => scoring::dex,
                };
                measure(judge, text, context).map(Value::Xent).map_err(judged)
            }
            Builtin::Len => match &args[0] {
                Value::Str(s) => Ok(Value::Number(s.len() as f64)),
                Value::List(l) => Ok(Value::Number(l.len() as f64)),
                Value::Xent(v) => Ok(Value::Number(v.len() as f64)),
                other => Err(self.kind_error(0, "a string, list or xent vector", other, line)),
            },
            Builtin::IsTrue => {
                let statement = self.string_arg(args, 0, line)?;
                scoring::is_true(judge, statement)
                    .map(Value::Validated)
                    .map_err(judged)
            }
            Builtin::IsFalse => {
                let statement = self.string_arg(args, 0, line)?;
                scoring::is_false(judge, statement)
                    .map(Value::Validated)
                    .map_err(judged)
            }
            Builtin::FirstNTokens => {
                let text = self.string_arg(args, 0, line)?;
                let n = args[1]
                    .as_count()
                    .ok_or_else(|| self.kind_error(1, "a non-negative integer", &args[1], line))?;
                Ok(Value::Str(scoring::first_n_tokens(judge, text, n)))
            }
        }
    }

    fn string_arg<'a>(&self, args: &'a [Value], idx: usize, line: usize) -> Result<&'a XString> {
        args[idx]
            .as_str()
            .ok_or_else(|| self.kind_error(idx, "a string", &args[idx], line))
    }

    fn kind_error(&self, idx: usize, expected: &str, found: &Value, line: usize) -> Error {
        Error::resolution(
            line,
            format!(
                "argument {} of {}() must be {}, got {}",
                idx + 1,
                self.name(),
                expected,
                found.kind_name()
            ),
        )
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
