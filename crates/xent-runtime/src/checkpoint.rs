//! Checkpoints
//!
//! A checkpoint is either the finished results of a game or the state of a
//! suspended one. Both serialize to JSON and round-trip without loss.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game::{GameConfig, GameSummary, RoundResult};
use crate::judge::JudgeConfig;
use crate::state::VmState;

/// A suspended game: the program, its limits, the VM state and the judge binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspendedGame {
    /// Program source text
    pub program: String,
    pub config: GameConfig,
    pub vm: VmState,
    pub judge: JudgeConfig,
}

/// Persisted form of a game, finished or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    Results(Vec<RoundResult>),
    State(Box<SuspendedGame>),
}

impl Checkpoint {
    pub fn is_complete(&self) -> bool {
        matches!(self, Checkpoint::Results(_))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Checkpoint> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<GameSummary> for Checkpoint {
    fn from(summary: GameSummary) -> Self {
        Checkpoint::Results(summary.rounds)
    }
}

impl From<SuspendedGame> for Checkpoint {
    fn from(suspended: SuspendedGame) -> Self {
        Checkpoint::State(Box::new(suspended))
    }
}
