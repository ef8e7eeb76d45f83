//! XENT Runtime
//!
//! Executes game programs line by line, scoring player text with
//! cross-entropy measured by a judge language model.

pub mod builtins;
pub mod checkpoint;
pub mod error;
pub mod eval;
pub mod events;
pub mod game;
pub mod instruction;
pub mod judge;
pub mod player;
pub mod program;
pub mod registers;
pub mod scoring;
pub mod state;
pub mod value;
mod vm;

pub use builtins::Builtin;
pub use checkpoint::{Checkpoint, SuspendedGame};
pub use error::{Error, Result};
pub use events::Event;
pub use game::{Game, GameConfig, GameSummary, RoundResult, RunOutcome};
pub use instruction::Instruction;
pub use judge::{BuiltinJudges, CacheJudge, Judge, JudgeConfig, JudgeError, JudgeFactory};
pub use player::{
    ConstantPlayer, MailboxPlayer, Move, Player, PlayerError, ScriptedPlayer, Usage, WhenExhausted,
};
pub use program::Program;
pub use registers::{RegisterId, RegisterKind, RegisterStore};
pub use state::VmState;
pub use value::{TokenXentList, ValidatedBool, Value, XList, XString};
