//! Integration test harness for XENT.
//!
//! Loads a program with the deterministic cache judge and runs it against
//! a player: Parse → Check → Execute → Verify.

use xent_runtime::{
    CacheJudge, ConstantPlayer, Event, Game, GameConfig, GameSummary, Player, RegisterId,
    RunOutcome, SuspendedGame, Value,
};

/// Test harness for running game programs from source.
pub struct TestHarness {
    game: Game,
}

impl TestHarness {
    /// Create a harness with the default game configuration.
    ///
    /// # Panics
    ///
    /// Panics if the program fails to load.
    pub fn from_source(source: &str) -> Self {
        Self::with_config(source, GameConfig::default())
    }

    /// Create a harness with an explicit game configuration.
    ///
    /// # Panics
    ///
    /// Panics if the program fails to load.
    pub fn with_config(source: &str, config: GameConfig) -> Self {
        let game = Game::new(source, config, Box::new(CacheJudge::default()))
            .unwrap_or_else(|e| panic!("Program failed to load: {}", e));
        Self { game }
    }

    /// Wrap an already built (e.g. resumed) game.
    pub fn from_game(game: Game) -> Self {
        Self { game }
    }

    /// Run until finished or halted.
    pub fn try_run(&mut self, player: &mut dyn Player) -> xent_runtime::Result<RunOutcome> {
        self.game.run(player)
    }

    /// Run to completion.
    ///
    /// # Panics
    ///
    /// Panics if the game fails or the player halts.
    pub fn run(&mut self, player: &mut dyn Player) -> GameSummary {
        match self.try_run(player) {
            Ok(RunOutcome::Finished(summary)) => summary,
            Ok(RunOutcome::Suspended(_)) => panic!("Game suspended unexpectedly"),
            Err(e) => panic!("Game failed: {}", e),
        }
    }

    /// Run to completion with a player that always gives `response`.
    pub fn run_constant(&mut self, response: &str) -> GameSummary {
        self.run(&mut ConstantPlayer::new("constant", response))
    }

    /// Run until the player halts and return the suspended state.
    ///
    /// # Panics
    ///
    /// Panics if the game fails or finishes.
    pub fn run_until_halt(&mut self, player: &mut dyn Player) -> SuspendedGame {
        match self.try_run(player) {
            Ok(RunOutcome::Suspended(suspended)) => *suspended,
            Ok(RunOutcome::Finished(_)) => panic!("Game finished without halting"),
            Err(e) => panic!("Game failed: {}", e),
        }
    }

    /// Current value of a register.
    pub fn register(&self, name: &str) -> Option<&Value> {
        RegisterId::parse(name).and_then(|id| self.game.state().registers.get(id))
    }

    /// Events of the round in progress.
    pub fn current_history(&self) -> &[Event] {
        &self.game.state().history
    }

    pub fn game(&self) -> &Game {
        &self.game
    }
}

/// Event tags, in order.
pub fn event_names(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(Event::name).collect()
}

/// Every event across all rounds of a summary.
pub fn all_events(summary: &GameSummary) -> Vec<Event> {
    summary
        .rounds
        .iter()
        .flat_map(|round| round.history.iter().cloned())
        .collect()
}
