//! Run configuration
//!
//! A JSON document describing which games to play with which players and
//! seeds. Program text is either inline or loaded from a path relative to
//! the configuration file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use xent_runtime::{GameConfig, JudgeConfig};

use crate::error::{Error, Result};
use crate::unit::{GameSpec, PlayerSpec, WorkUnit};

/// A game as listed in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    pub name: String,
    /// Path to the program file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Inline program text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Overrides the run-wide game configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<GameConfig>,
}

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub games: Vec<GameEntry>,
    pub players: Vec<PlayerSpec>,
    #[serde(default = "default_seeds")]
    pub seeds: Vec<u64>,
    /// Judge model; the seed is taken from each work unit
    #[serde(default)]
    pub judge: JudgeConfig,
    /// Defaults for every game
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default = "default_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_seeds() -> Vec<u64> {
    vec![0]
}

fn default_concurrency() -> usize {
    4
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

impl RunConfig {
    /// Read a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config: RunConfig = serde_json::from_str(&json)?;
        if let Some(base) = path.parent() {
            for game in &mut config.games {
                if let Some(program_path) = &game.path {
                    if program_path.is_relative() {
                        game.path = Some(base.join(program_path));
                    }
                }
            }
        }
        Ok(config)
    }

    /// Load program texts and expand into work units.
    pub fn work_units(&self) -> Result<Vec<WorkUnit>> {
        if self.games.is_empty() || self.players.is_empty() || self.seeds.is_empty() {
            return Err(Error::Config(
                "games, players and seeds must all be non-empty".into(),
            ));
        }
        let games = self
            .games
            .iter()
            .map(|entry| self.game_spec(entry).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        let players: Vec<_> = self.players.iter().cloned().map(Arc::new).collect();
        Ok(WorkUnit::cartesian(&games, &players, &self.seeds))
    }

    fn game_spec(&self, entry: &GameEntry) -> Result<GameSpec> {
        let program = match (&entry.program, &entry.path) {
            (Some(text), None) => text.clone(),
            (None, Some(path)) => fs::read_to_string(path).map_err(|e| Error::io(path, e))?,
            _ => {
                return Err(Error::Config(format!(
                    "game '{}' needs exactly one of 'program' or 'path'",
                    entry.name
                )))
            }
        };
        Ok(GameSpec {
            name: entry.name.clone(),
            program,
            config: entry.config.clone().unwrap_or_else(|| self.game.clone()),
        })
    }
}
