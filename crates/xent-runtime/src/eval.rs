//! Expression evaluation
//!
//! Tree-walking evaluator over the parsed expression tree. The only things
//! an expression can reach are the register store and the builtin set.

use tracing::trace;
use xent_ast::{BinaryOp, Expr, ExprKind, UnaryOp};

use crate::builtins::Builtin;
use crate::error::{Error, Result};
use crate::judge::Judge;
use crate::registers::{RegisterId, RegisterStore};
use crate::value::{ValidatedBool, Value, XList};

/// Evaluates expressions for one program line.
pub struct Evaluator<'a> {
    registers: &'a RegisterStore,
    judge: &'a dyn Judge,
    line: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(registers: &'a RegisterStore, judge: &'a dyn Judge, line: usize) -> Self {
        Self {
            registers,
            judge,
            line,
        }
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Integer(n) => Ok(Value::Number(*n as f64)),
            ExprKind::Float(x) => self.finite(Value::Number(*x)),
            ExprKind::String(s) => Ok(Value::from(s.as_str())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Ident(name) => self.lookup(name),
            ExprKind::List(items) => {
                let mut list = XList::new();
                for item in items {
                    match self.eval(item)? {
                        Value::Str(s) => list.push(s),
                        other => {
                            return Err(self.type_error(format!(
                                "list items must be strings, got {}",
                                other.kind_name()
                            )))
                        }
                    }
                }
                Ok(Value::List(list))
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand)?;
                self.unary(*op, value).and_then(|v| self.finite(v))
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                self.binary(*op, left, right).and_then(|v| self.finite(v))
            }
            ExprKind::Call { func, args } => {
                let builtin = Builtin::from_name(func).ok_or_else(|| {
                    Error::resolution(self.line, format!("unknown function '{}'", func))
                })?;
                if let Some(arg) = args.iter().find(|a| a.is_keyword()) {
                    return Err(Error::resolution(
                        self.line,
                        format!(
                            "{}() does not take keyword argument '{}'",
                            builtin,
                            arg.name.as_deref().unwrap_or_default()
                        ),
                    ));
                }
                let values = args
                    .iter()
                    .map(|arg| self.eval(&arg.value))
                    .collect::<Result<Vec<_>>>()?;
                let result = builtin.call(&values, self.judge, self.line)?;
                trace!(line = self.line, builtin = %builtin, result = %result, "builtin call");
                self.finite(result)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        if let Some(id) = RegisterId::parse(name) {
            return self.registers.get(id).cloned().ok_or_else(|| {
                Error::internal(self.line, format!("register '{}' missing from store", id))
            });
        }
        if Builtin::from_name(name).is_some() {
            return Err(Error::resolution(
                self.line,
                format!("builtin '{}' cannot be used as a value", name),
            ));
        }
        Err(Error::resolution(
            self.line,
            format!("unknown identifier '{}'", name),
        ))
    }

    fn unary(&self, op: UnaryOp, value: Value) -> Result<Value> {
        match (op, value) {
            (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
            (UnaryOp::Neg, Value::Xent(v)) => Ok(Value::Xent(v.neg())),
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (UnaryOp::Not, Value::Validated(v)) => Ok(Value::Validated(v.not())),
            (op, value) => {
                let symbol = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "not",
                };
                Err(self.type_error(format!(
                    "cannot apply '{}' to {}",
                    symbol,
                    value.kind_name()
                )))
            }
        }
    }

    fn binary(&self, op: BinaryOp, left: Value, right: Value) -> Result<Value> {
        if op.is_comparison() {
            return self.compare(op, &left, &right);
        }
        let result = match (op, &left, &right) {
            (BinaryOp::Add, Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (BinaryOp::Add, Value::Str(a), Value::Str(b)) => Value::Str(a.concat(b)),
            (BinaryOp::Add, Value::List(a), Value::List(b)) => Value::List(a.concat(b)),
            (BinaryOp::Add, Value::Xent(a), Value::Xent(b)) => {
                Value::Xent(a.add_aligned(b).map_err(|e| self.type_error(e.to_string()))?)
            }

            (BinaryOp::Sub, Value::Number(a), Value::Number(b)) => Value::Number(a - b),
            (BinaryOp::Sub, Value::Xent(a), Value::Xent(b)) => {
                Value::Xent(a.sub_aligned(b).map_err(|e| self.type_error(e.to_string()))?)
            }

            (BinaryOp::Mul, Value::Number(a), Value::Number(b)) => Value::Number(a * b),
            (BinaryOp::Mul, Value::Xent(v), Value::Number(k))
            | (BinaryOp::Mul, Value::Number(k), Value::Xent(v)) => Value::Xent(v.scale(*k)),

            (BinaryOp::CutBefore, Value::Str(s), Value::Str(d)) => Value::Str(s.cut_before(&d.primary)),
            (BinaryOp::CutAfter, Value::Str(s), Value::Str(d)) => Value::Str(s.cut_after(&d.primary)),
            (BinaryOp::Decorate, Value::Str(s), Value::Str(c)) => Value::Str(s.decorate(c)),

            (BinaryOp::And | BinaryOp::Or, Value::Bool(a), Value::Bool(b)) => {
                Value::Bool(if op == BinaryOp::And { *a && *b } else { *a || *b })
            }
            (BinaryOp::And | BinaryOp::Or, _, _) => {
                let a = self.validated(&left, op)?;
                let b = self.validated(&right, op)?;
                Value::Validated(if op == BinaryOp::And { a.and(&b) } else { a.or(&b) })
            }

            _ => return Err(self.operand_error(op, &left, &right)),
        };
        Ok(result)
    }

    /// Comparisons touching a score produce a traced result; plain ones a bool.
    fn compare(&self, op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
        let scored = |v: &Value| matches!(v, Value::Xent(_) | Value::Validated(_));
        if scored(left) || scored(right) {
            let a = self.numeric(left, op, left, right)?;
            let b = self.numeric(right, op, left, right)?;
            let value = ordering_holds(op, a, b);
            let trace = format!("{:.3} {} {:.3}", a, op.symbol(), b);
            return Ok(Value::Validated(ValidatedBool::new(value, trace)));
        }

        let equal = match (left, right) {
            (Value::Number(a), Value::Number(b)) => return Ok(Value::Bool(ordering_holds(op, *a, *b))),
            (Value::Str(a), Value::Str(b)) => a.primary == b.primary,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => return Err(self.operand_error(op, left, right)),
        };
        match op {
            BinaryOp::Eq => Ok(Value::Bool(equal)),
            BinaryOp::Ne => Ok(Value::Bool(!equal)),
            _ => Err(self.operand_error(op, left, right)),
        }
    }

    fn numeric(&self, value: &Value, op: BinaryOp, left: &Value, right: &Value) -> Result<f64> {
        match value {
            Value::Number(n) => Ok(*n),
            Value::Xent(v) => Ok(v.total()),
            Value::Validated(v) => Ok(v.as_number()),
            _ => Err(self.operand_error(op, left, right)),
        }
    }

    fn validated(&self, value: &Value, op: BinaryOp) -> Result<ValidatedBool> {
        match value {
            Value::Bool(b) => Ok(ValidatedBool::from(*b)),
            Value::Validated(v) => Ok(v.clone()),
            other => Err(self.type_error(format!(
                "'{}' needs boolean operands, got {}",
                op.symbol(),
                other.kind_name()
            ))),
        }
    }

    fn operand_error(&self, op: BinaryOp, left: &Value, right: &Value) -> Error {
        self.type_error(format!(
            "cannot apply '{}' to {} and {}",
            op.symbol(),
            left.kind_name(),
            right.kind_name()
        ))
    }

    /// Scores must stay representable in a checkpoint.
    fn finite(&self, value: Value) -> Result<Value> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.type_error(format!("{} left the representable range", value.kind_name())))
        }
    }

    fn type_error(&self, message: String) -> Error {
        Error::type_error(self.line, message)
    }
}

fn ordering_holds(op: BinaryOp, a: f64, b: f64) -> bool {
    match op {
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::Ge => a >= b,
        _ => false,
    }
}
