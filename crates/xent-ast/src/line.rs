//! Parsed program lines.

use std::fmt;

use crate::expr::Arg;
use crate::span::Span;

/// The closed instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    Assign,
    Reveal,
    Elicit,
    Ensure,
    Reward,
    Beacon,
    Replay,
}

impl InstructionKind {
    /// All instructions, in documentation order.
    pub const ALL: [InstructionKind; 7] = [
        InstructionKind::Assign,
        InstructionKind::Reveal,
        InstructionKind::Elicit,
        InstructionKind::Ensure,
        InstructionKind::Reward,
        InstructionKind::Beacon,
        InstructionKind::Replay,
    ];

    /// Look up an instruction by its source name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            InstructionKind::Assign => "assign",
            InstructionKind::Reveal => "reveal",
            InstructionKind::Elicit => "elicit",
            InstructionKind::Ensure => "ensure",
            InstructionKind::Reward => "reward",
            InstructionKind::Beacon => "beacon",
            InstructionKind::Replay => "replay",
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An instruction call as written on a line.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionCall {
    pub kind: InstructionKind,
    pub args: Vec<Arg>,
    pub span: Span,
}

impl InstructionCall {
    /// Positional arguments in order.
    pub fn positional(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter().filter(|arg| !arg.is_keyword())
    }

    /// Keyword arguments in order.
    pub fn keywords(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter().filter(|arg| arg.is_keyword())
    }
}

/// One parsed source line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// Blank or comment-only line
    Blank,
    Call(InstructionCall),
}
