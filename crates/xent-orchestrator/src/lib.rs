//! XENT Orchestrator
//!
//! Runs many (game, player, seed) work units concurrently. Each unit checks
//! the result store first, so re-running a batch only does the missing work.

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod store;
pub mod unit;

pub use config::{GameEntry, RunConfig};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use orchestrator::{Orchestrator, UnitReport, UnitStatus};
pub use store::{FileStore, MemoryStore, ResultStore, UnitRecord};
pub use unit::{GameSpec, PlayerFactory, PlayerSpec, ScriptedPlayers, WorkUnit};
