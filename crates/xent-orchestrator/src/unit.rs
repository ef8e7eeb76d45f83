//! Work units and player construction.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use xent_runtime::{GameConfig, Player, ScriptedPlayer, WhenExhausted};

use crate::error::Result;

/// A named game program with its limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSpec {
    pub name: String,
    /// Program source text
    pub program: String,
    #[serde(default)]
    pub config: GameConfig,
}

/// A scripted player as described in a run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub id: String,
    #[serde(default)]
    pub responses: Vec<String>,
    /// Halt instead of repeating the last response once the script runs out
    #[serde(default)]
    pub halt_when_exhausted: bool,
}

/// One (game, player, seed) combination.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub game: Arc<GameSpec>,
    pub player: Arc<PlayerSpec>,
    pub seed: u64,
}

impl WorkUnit {
    pub fn new(game: Arc<GameSpec>, player: Arc<PlayerSpec>, seed: u64) -> Self {
        Self { game, player, seed }
    }

    /// Result store key, safe to use as a file name.
    ///
    /// Names are escaped reversibly, so distinct units never share a key.
    pub fn key(&self) -> String {
        format!(
            "{}__{}__{}",
            escape(&self.game.name),
            escape(&self.player.id),
            self.seed
        )
    }

    /// Every combination of games, players and seeds, in that nesting order.
    pub fn cartesian(games: &[Arc<GameSpec>], players: &[Arc<PlayerSpec>], seeds: &[u64]) -> Vec<WorkUnit> {
        games
            .iter()
            .flat_map(|game| {
                players.iter().flat_map(move |player| {
                    seeds
                        .iter()
                        .map(move |seed| WorkUnit::new(Arc::clone(game), Arc::clone(player), *seed))
                })
            })
            .collect()
    }
}

/// Percent-encodes every byte outside `[A-Za-z0-9.-]`.
///
/// `_` is escaped too, so the `__` separator cannot occur inside a part.
fn escape(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for byte in part.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
            escaped.push(char::from(byte));
        } else {
            escaped.push_str(&format!("%{:02X}", byte));
        }
    }
    escaped
}

/// Creates a fresh player for each work unit.
pub trait PlayerFactory: Send + Sync {
    fn create(&self, spec: &PlayerSpec, seed: u64) -> Result<Box<dyn Player>>;
}

/// Builds [`ScriptedPlayer`]s straight from their specs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedPlayers;

impl PlayerFactory for ScriptedPlayers {
    fn create(&self, spec: &PlayerSpec, _seed: u64) -> Result<Box<dyn Player>> {
        let behaviour = if spec.halt_when_exhausted {
            WhenExhausted::Halt
        } else {
            WhenExhausted::RepeatLast
        };
        Ok(Box::new(
            ScriptedPlayer::new(spec.id.clone(), spec.responses.iter().cloned())
                .when_exhausted(behaviour),
        ))
    }
}
