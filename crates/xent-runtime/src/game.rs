//! Round driver
//!
//! A [`Game`] owns one program instance: the loaded program, its VM state
//! and its judge. [`Game::run`] executes rounds until they are all done or
//! the player halts, in which case the game can be suspended and resumed.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::checkpoint::SuspendedGame;
use crate::error::{Error, Result};
use crate::events::Event;
use crate::judge::{Judge, JudgeFactory};
use crate::player::{Player, Usage};
use crate::program::Program;
use crate::state::VmState;
use crate::vm::{Step, Vm};

/// Limits and presets for one program instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of rounds to play
    pub rounds: usize,
    /// Consecutive `ensure` failures on one line that end the game
    pub max_ensure_failures: u32,
    /// Executed instructions allowed per round
    pub max_steps: u64,
    /// Longest accepted program, in lines
    pub max_lines: usize,
    /// Initial contents of static registers, by register name
    pub presets: IndexMap<String, String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: 1,
            max_ensure_failures: 10,
            max_steps: 10_000,
            max_lines: 64,
            presets: IndexMap::new(),
        }
    }
}

/// Outcome of one finished round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: usize,
    pub score: f64,
    pub usage: Usage,
    pub history: Vec<Event>,
}

/// Outcome of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub rounds: Vec<RoundResult>,
    pub total_score: f64,
    pub usage: Usage,
}

#[derive(Debug)]
pub enum RunOutcome {
    Finished(GameSummary),
    /// The player halted; the boxed state continues the game
    Suspended(Box<SuspendedGame>),
}

/// One program instance.
pub struct Game {
    program: Arc<Program>,
    config: GameConfig,
    state: VmState,
    judge: Box<dyn Judge>,
}

impl Game {
    /// Load `source` and prepare a fresh instance.
    pub fn new(source: &str, config: GameConfig, judge: Box<dyn Judge>) -> Result<Game> {
        let program = Program::load(source, &config)?;
        Ok(Game::with_program(Arc::new(program), config, judge))
    }

    /// Fresh instance of an already loaded program.
    pub fn with_program(program: Arc<Program>, config: GameConfig, judge: Box<dyn Judge>) -> Game {
        let state = VmState::new(&config);
        Game {
            program,
            config,
            state,
            judge,
        }
    }

    /// Rebuild a suspended game, with a judge made from its saved configuration.
    pub fn resume(suspended: SuspendedGame, judges: &dyn JudgeFactory) -> Result<Game> {
        let SuspendedGame {
            program,
            config,
            vm,
            judge,
        } = suspended;
        let program = Program::load(program, &config)?;
        if vm.line > program.len() {
            return Err(Error::Checkpoint(format!(
                "saved line {} is outside the {}-line program",
                vm.line,
                program.len()
            )));
        }
        let judge = judges.build(&judge).map_err(|source| Error::Judge {
            line: vm.line,
            source,
        })?;
        info!(round = vm.round, line = vm.line, "resuming game");
        Ok(Game {
            program: Arc::new(program),
            config,
            state: vm,
            judge,
        })
    }

    /// Snapshot everything needed to continue later.
    pub fn suspend(&self) -> SuspendedGame {
        SuspendedGame {
            program: self.program.source().to_string(),
            config: self.config.clone(),
            vm: self.state.clone(),
            judge: self.judge.config(),
        }
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn is_finished(&self) -> bool {
        self.state.round >= self.config.rounds
    }

    /// Run until every round is finished or the player halts.
    #[instrument(skip_all, fields(player = player.id(), round = self.state.round))]
    pub fn run(&mut self, player: &mut dyn Player) -> Result<RunOutcome> {
        while !self.is_finished() {
            let mut vm = Vm {
                program: &self.program,
                config: &self.config,
                state: &mut self.state,
                judge: self.judge.as_ref(),
                player: &mut *player,
            };

            if !vm.state.round_started {
                vm.state.begin_round();
                info!(round = vm.state.round, "round started");
                let round = vm.state.round;
                vm.emit(Event::RoundStarted { round });
            }

            while vm.state.line < vm.program.len() {
                if vm.step()? == Step::Halted {
                    info!(
                        round = vm.state.round,
                        line = vm.state.line,
                        "player halted, suspending"
                    );
                    return Ok(RunOutcome::Suspended(Box::new(self.suspend())));
                }
            }

            let round = vm.state.round;
            let score = vm.state.round_score;
            vm.emit(Event::RoundFinished { round, score });
            info!(round, score, steps = vm.state.steps, "round finished");
            self.finish_round();
        }
        Ok(RunOutcome::Finished(self.summary()))
    }

    fn finish_round(&mut self) {
        let state = &mut self.state;
        state.completed_rounds.push(RoundResult {
            round: state.round,
            score: state.round_score,
            usage: state.round_usage,
            history: std::mem::take(&mut state.history),
        });
        state.round += 1;
        state.round_started = false;
        state.line = 0;
        state.steps = 0;
    }

    /// Results so far.
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            rounds: self.state.completed_rounds.clone(),
            total_score: self.state.total_score,
            usage: self.state.usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{BuiltinJudges, CacheJudge};
    use crate::player::{ConstantPlayer, MailboxPlayer, ScriptedPlayer};
    use crate::registers::RegisterId;
    use crate::value::Value;

    fn game(source: &str) -> Game {
        game_with(source, GameConfig::default())
    }

    fn game_with(source: &str, config: GameConfig) -> Game {
        Game::new(source, config, Box::new(CacheJudge::default())).unwrap()
    }

    fn finished(outcome: RunOutcome) -> GameSummary {
        match outcome {
            RunOutcome::Finished(summary) => summary,
            RunOutcome::Suspended(_) => panic!("game suspended"),
        }
    }

    fn names(events: &[Event]) -> Vec<&'static str> {
        events.iter().map(Event::name).collect()
    }

    #[test]
    fn test_rounds_and_scores() {
        let config = GameConfig {
            rounds: 3,
            ..GameConfig::default()
        };
        let mut game = game_with("reward(1.5)", config);
        let summary = finished(game.run(&mut ConstantPlayer::new("c", "")).unwrap());
        assert_eq!(summary.rounds.len(), 3);
        assert_eq!(summary.total_score, 4.5);
        assert_eq!(
            names(&summary.rounds[1].history),
            vec!["round_started", "reward", "round_finished"]
        );
    }

    #[test]
    fn test_assign_evaluates_before_writing() {
        let mut game = game("assign(s='a', t='b')\nassign(s=t, t=s)\nreveal(s, t)");
        let summary = finished(game.run(&mut ConstantPlayer::new("c", "")).unwrap());
        let reveal = summary.rounds[0]
            .history
            .iter()
            .find_map(|event| match event {
                Event::Reveal { values, .. } => Some(values.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(reveal, vec![Value::from("b"), Value::from("a")]);
    }

    #[test]
    fn test_elicit_truncates_to_budget() {
        let mut game = game("elicit(x, 2)");
        let mut player = ConstantPlayer::new("c", "one two three four");
        finished(game.run(&mut player).unwrap());
        let x = RegisterId::parse("x").unwrap();
        assert_eq!(game.state().registers.get(x), Some(&Value::from("one two")));
    }

    #[test]
    fn test_list_registers_reset_between_rounds() {
        let config = GameConfig {
            rounds: 2,
            ..GameConfig::default()
        };
        let mut game = game_with("reveal(l)\nassign(l=l + ['a'], s=s + 'a')", config);
        let summary = finished(game.run(&mut ConstantPlayer::new("c", "")).unwrap());
        let first_reveal = |round: &RoundResult| match &round.history[1] {
            Event::Reveal { values, .. } => values[0].clone(),
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(first_reveal(&summary.rounds[1]), first_reveal(&summary.rounds[0]));
        let s = RegisterId::parse("s").unwrap();
        assert_eq!(game.state().registers.get(s), Some(&Value::from("aa")));
    }

    #[test]
    fn test_ensure_without_elicit_is_game_error() {
        let mut game = game("ensure(false)");
        let err = game.run(&mut ConstantPlayer::new("c", "")).unwrap_err();
        assert!(matches!(err, Error::Game { line: 0, .. }));
    }

    #[test]
    fn test_ensure_rejects_non_boolean() {
        let mut game = game("ensure('yes')");
        let err = game.run(&mut ConstantPlayer::new("c", "")).unwrap_err();
        assert!(matches!(err, Error::Type { .. }));
    }

    #[test]
    fn test_reserved_beacon_is_game_error() {
        let mut game = game("beacon(start)");
        let err = game.run(&mut ConstantPlayer::new("c", "")).unwrap_err();
        assert!(matches!(err, Error::Game { .. }));
    }

    #[test]
    fn test_scores_stay_finite() {
        let mut game = game("reward(1e308)\nreward(1e308)");
        let err = game.run(&mut ConstantPlayer::new("c", "")).unwrap_err();
        assert!(matches!(err, Error::Type { line: 1, .. }));
        assert_eq!(game.state().total_score, 1e308);

        let mut game = self::game("reward(1e308 * 10)");
        let err = game.run(&mut ConstantPlayer::new("c", "")).unwrap_err();
        assert!(matches!(err, Error::Type { line: 0, .. }));

        let err = Game::new("reward(1e400)", GameConfig::default(), Box::new(CacheJudge::default()))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Syntax { line: 0, .. }));
    }

    #[test]
    fn test_step_ceiling() {
        let config = GameConfig {
            max_steps: 50,
            ..GameConfig::default()
        };
        let mut game = game_with("beacon(flag_1)\nreveal(s)\nreplay(flag_1, 1000)", config);
        let err = game.run(&mut ConstantPlayer::new("c", "")).unwrap_err();
        assert!(matches!(err, Error::Game { .. }));
    }

    #[test]
    fn test_replay_to_start_reruns_first_line() {
        let mut game = game("reward(1)\nreplay(start, 2)");
        let summary = finished(game.run(&mut ConstantPlayer::new("c", "")).unwrap());
        assert_eq!(summary.total_score, 3.0);
    }

    #[test]
    fn test_halt_and_resume_multi_target_elicit() {
        let mut game = game("elicit(a, b, 5)\nreveal(a, b)");
        let mut player = MailboxPlayer::new("m");
        player.post("first");

        let suspended = match game.run(&mut player).unwrap() {
            RunOutcome::Suspended(suspended) => suspended,
            RunOutcome::Finished(_) => panic!("expected suspension"),
        };
        let requests = suspended
            .vm
            .history
            .iter()
            .filter(|e| matches!(e, Event::ElicitRequest { .. }))
            .count();
        assert_eq!(requests, 2);

        let mut resumed = Game::resume(*suspended, &BuiltinJudges).unwrap();
        let mut player = ScriptedPlayer::new("s", ["second"]);
        let summary = finished(resumed.run(&mut player).unwrap());
        assert_eq!(player.requests(), 1);

        let history = &summary.rounds[0].history;
        assert_eq!(
            names(history),
            vec![
                "round_started",
                "elicit_request",
                "elicit_response",
                "elicit_request",
                "elicit_response",
                "reveal",
                "round_finished"
            ]
        );
        match &history[5] {
            Event::Reveal { values, .. } => {
                assert_eq!(values, &vec![Value::from("first"), Value::from("second")])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_player_failure_is_reported() {
        struct Broken;
        impl Player for Broken {
            fn id(&self) -> &str {
                "broken"
            }
            fn request_move(
                &mut self,
                _register: &str,
                _max_len: usize,
                _snapshot: &IndexMap<String, Value>,
            ) -> std::result::Result<crate::player::Move, crate::player::PlayerError> {
                Err(crate::player::PlayerError::Failed("socket closed".into()))
            }
        }
        let mut game = game("elicit(x, 3)");
        let err = game.run(&mut Broken).unwrap_err();
        assert!(matches!(err, Error::Player { line: 0, .. }));
    }
}
