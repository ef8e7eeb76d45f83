//! Program loading
//!
//! A program is parsed and checked in full before anything runs, so
//! syntax and name errors surface up front with their line number.

use tracing::debug;
use xent_ast::{walk_expr, ExprKind, ParsedLine};
use xent_parser::parse_line;

use crate::builtins::Builtin;
use crate::error::{Error, Result};
use crate::game::GameConfig;
use crate::instruction::{resolve_register, Instruction};

/// A loaded program: one optional instruction per source line.
#[derive(Debug, Clone)]
pub struct Program {
    source: String,
    lines: Vec<Option<Instruction>>,
}

impl Program {
    /// Parse and check `source` against the limits in `config`.
    pub fn load(source: impl Into<String>, config: &GameConfig) -> Result<Program> {
        let source = source.into();
        let line_count = source.lines().count();
        if line_count > config.max_lines {
            return Err(Error::Configuration(format!(
                "program has {} lines, limit is {}",
                line_count, config.max_lines
            )));
        }

        let mut lines = Vec::with_capacity(line_count);
        for (idx, text) in source.lines().enumerate() {
            let parsed = u16::try_from(idx)
                .map_err(|_| Error::Configuration("program too long".into()))
                .and_then(|n| parse_line(text, n).map_err(|e| Error::syntax(idx, e.to_string())))?;
            let instruction = match parsed {
                ParsedLine::Blank => None,
                ParsedLine::Call(call) => {
                    let instruction = Instruction::from_call(&call, idx)?;
                    check_names(&instruction, idx)?;
                    Some(instruction)
                }
            };
            lines.push(instruction);
        }

        debug!(
            lines = lines.len(),
            instructions = lines.iter().flatten().count(),
            "program loaded"
        );
        Ok(Program { source, lines })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of source lines, blank ones included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Instruction on `line`; `None` past the end, `Some(None)` for blanks.
    pub fn line(&self, line: usize) -> Option<Option<&Instruction>> {
        self.lines.get(line).map(Option::as_ref)
    }
}

/// Every identifier must be a register; every call a builtin with valid arity.
fn check_names(instruction: &Instruction, line: usize) -> Result<()> {
    for expr in instruction.expressions() {
        let mut first_error = None;
        walk_expr(expr, &mut |node| {
            if first_error.is_some() {
                return;
            }
            let checked = match &node.kind {
                ExprKind::Ident(name) => check_ident(name, line),
                ExprKind::Call { func, args } => match Builtin::from_name(func) {
                    Some(builtin) => builtin.check_arity(args.len(), line),
                    None => Err(Error::resolution(
                        line,
                        format!("unknown function '{}'", func),
                    )),
                },
                _ => Ok(()),
            };
            first_error = checked.err();
        });
        if let Some(err) = first_error {
            return Err(err);
        }
    }
    Ok(())
}

fn check_ident(name: &str, line: usize) -> Result<()> {
    if Builtin::from_name(name).is_some() {
        return Err(Error::resolution(
            line,
            format!("builtin '{}' cannot be used as a value", name),
        ));
    }
    resolve_register(name, line).map(|_| ())
}
