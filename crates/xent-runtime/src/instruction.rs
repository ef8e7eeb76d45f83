//! The instruction set
//!
//! Parsed calls are checked for argument shape and turned into a closed
//! `Instruction` enum. Expressions stay unevaluated until the line runs.

use xent_ast::{Arg, Expr, InstructionCall, InstructionKind};

use crate::error::{Error, Result};
use crate::registers::{RegisterId, RegisterKind};

/// One executable instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `assign(name=expr, ...)`
    Assign { targets: Vec<(RegisterId, Expr)> },
    /// `reveal(expr, ...)`
    Reveal { exprs: Vec<Expr> },
    /// `elicit(name, ..., max_len)`
    Elicit {
        targets: Vec<RegisterId>,
        max_len: Expr,
    },
    /// `ensure(cond, ...)`
    Ensure { conditions: Vec<Expr> },
    /// `reward(expr)`
    Reward { expr: Expr },
    /// `beacon(name)`
    Beacon { name: String },
    /// `replay(name, count)`
    Replay { name: String, count: Expr },
}

impl Instruction {
    /// Check the argument shape of a parsed call.
    pub fn from_call(call: &InstructionCall, line: usize) -> Result<Instruction> {
        let name = call.kind.name();
        if call.kind != InstructionKind::Assign {
            if let Some(arg) = call.keywords().next() {
                return Err(Error::syntax(
                    line,
                    format!(
                        "{}() takes no keyword arguments, got '{}'",
                        name,
                        arg.name.as_deref().unwrap_or_default()
                    ),
                ));
            }
        }
        let positional: Vec<&Expr> = call.positional().map(|arg| &arg.value).collect();

        let instruction = match call.kind {
            InstructionKind::Assign => {
                if call.positional().next().is_some() {
                    return Err(Error::syntax(line, "assign() takes keyword arguments only"));
                }
                if call.args.is_empty() {
                    return Err(Error::syntax(line, "assign() needs at least one target"));
                }
                let targets = call
                    .keywords()
                    .map(|arg| Ok((assign_target(arg, line)?, arg.value.clone())))
                    .collect::<Result<Vec<_>>>()?;
                Instruction::Assign { targets }
            }
            InstructionKind::Reveal => Instruction::Reveal {
                exprs: positional.into_iter().cloned().collect(),
            },
            InstructionKind::Elicit => {
                let Some((max_len, names)) = positional.split_last() else {
                    return Err(Error::syntax(line, "elicit() needs targets and a length budget"));
                };
                if names.is_empty() {
                    return Err(Error::syntax(line, "elicit() needs at least one target"));
                }
                let targets = names
                    .iter()
                    .map(|expr| elicit_target(expr, line))
                    .collect::<Result<Vec<_>>>()?;
                Instruction::Elicit {
                    targets,
                    max_len: (*max_len).clone(),
                }
            }
            InstructionKind::Ensure => {
                if positional.is_empty() {
                    return Err(Error::syntax(line, "ensure() needs at least one condition"));
                }
                Instruction::Ensure {
                    conditions: positional.into_iter().cloned().collect(),
                }
            }
            InstructionKind::Reward => match positional.as_slice() {
                [expr] => Instruction::Reward {
                    expr: (*expr).clone(),
                },
                _ => return Err(arity_error(name, "exactly one argument", line)),
            },
            InstructionKind::Beacon => match positional.as_slice() {
                [expr] => Instruction::Beacon {
                    name: beacon_name(expr, name, line)?,
                },
                _ => return Err(arity_error(name, "exactly one argument", line)),
            },
            InstructionKind::Replay => match positional.as_slice() {
                [target, count] => Instruction::Replay {
                    name: beacon_name(target, name, line)?,
                    count: (*count).clone(),
                },
                _ => return Err(arity_error(name, "a beacon name and a count", line)),
            },
        };
        Ok(instruction)
    }

    pub fn kind(&self) -> InstructionKind {
        match self {
            Instruction::Assign { .. } => InstructionKind::Assign,
            Instruction::Reveal { .. } => InstructionKind::Reveal,
            Instruction::Elicit { .. } => InstructionKind::Elicit,
            Instruction::Ensure { .. } => InstructionKind::Ensure,
            Instruction::Reward { .. } => InstructionKind::Reward,
            Instruction::Beacon { .. } => InstructionKind::Beacon,
            Instruction::Replay { .. } => InstructionKind::Replay,
        }
    }

    /// Every expression evaluated by this instruction.
    pub fn expressions(&self) -> Vec<&Expr> {
        match self {
            Instruction::Assign { targets } => targets.iter().map(|(_, expr)| expr).collect(),
            Instruction::Reveal { exprs } => exprs.iter().collect(),
            Instruction::Elicit { max_len, .. } => vec![max_len],
            Instruction::Ensure { conditions } => conditions.iter().collect(),
            Instruction::Reward { expr } => vec![expr],
            Instruction::Beacon { .. } => Vec::new(),
            Instruction::Replay { count, .. } => vec![count],
        }
    }
}

fn arity_error(instruction: &str, expected: &str, line: usize) -> Error {
    Error::syntax(line, format!("{}() takes {}", instruction, expected))
}

/// Resolve a register name, telling undeclared registers from other names.
pub(crate) fn resolve_register(name: &str, line: usize) -> Result<RegisterId> {
    if let Some(id) = RegisterId::parse(name) {
        return Ok(id);
    }
    if RegisterId::looks_like_register(name) {
        Err(Error::syntax(line, format!("undeclared register '{}'", name)))
    } else {
        Err(Error::resolution(line, format!("'{}' is not a register", name)))
    }
}

fn assign_target(arg: &Arg, line: usize) -> Result<RegisterId> {
    let name = arg.name.as_deref().unwrap_or_default();
    let id = resolve_register(name, line)?;
    if id.is_static() {
        return Err(Error::type_error(
            line,
            format!("cannot assign to static register '{}'", id),
        ));
    }
    Ok(id)
}

fn elicit_target(expr: &Expr, line: usize) -> Result<RegisterId> {
    let name = expr.as_ident().ok_or_else(|| {
        Error::syntax(line, format!("elicit target must be a register name, got {}", expr))
    })?;
    let id = resolve_register(name, line)?;
    if id.is_static() {
        return Err(Error::type_error(
            line,
            format!("cannot elicit into static register '{}'", id),
        ));
    }
    if id.kind() == RegisterKind::List {
        return Err(Error::type_error(
            line,
            format!("cannot elicit into list register '{}'", id),
        ));
    }
    Ok(id)
}

fn beacon_name(expr: &Expr, instruction: &str, line: usize) -> Result<String> {
    expr.as_ident().map(str::to_string).ok_or_else(|| {
        Error::syntax(
            line,
            format!("{}() needs a beacon name, got {}", instruction, expr),
        )
    })
}
