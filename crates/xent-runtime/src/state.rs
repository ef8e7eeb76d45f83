//! VM state
//!
//! Everything a program instance needs to continue, in one serializable
//! value. Suspending a game is saving this; resuming is loading it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::game::{GameConfig, RoundResult};
use crate::player::Usage;
use crate::registers::RegisterStore;

/// Beacon every round starts with, at line 0.
pub const START_BEACON: &str = "start";

/// Beacon set by every `elicit` at its own line.
pub const PREVIOUS_ELICIT_BEACON: &str = "previous_elicit";

/// Beacons a program may declare with `beacon`.
pub const USER_BEACONS: [&str; 4] = ["flag_1", "flag_2", "flag_3", "flag_4"];

/// Progress inside a multi-target `elicit` that was interrupted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElicitProgress {
    pub line: usize,
    /// Index of the next target to ask for
    pub next: usize,
    /// Whether the request event for `next` was already emitted
    pub requested: bool,
}

/// Complete state of one program instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmState {
    pub registers: RegisterStore,
    /// Beacon name to declared line
    pub beacons: IndexMap<String, usize>,
    /// Replay line to jumps taken so far
    pub replay_counters: IndexMap<usize, u64>,
    /// Ensure line to consecutive failures
    pub ensure_failures: IndexMap<usize, u32>,
    /// Next line to execute
    pub line: usize,
    /// Index of the current round
    pub round: usize,
    /// Whether the current round has been opened
    pub round_started: bool,
    pub round_score: f64,
    pub total_score: f64,
    pub usage: Usage,
    pub round_usage: Usage,
    /// Instructions executed in the current round
    pub steps: u64,
    pub pending_elicit: Option<ElicitProgress>,
    /// Events of the current round
    pub history: Vec<Event>,
    pub completed_rounds: Vec<RoundResult>,
}

impl VmState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            registers: RegisterStore::new(&config.presets),
            beacons: IndexMap::new(),
            replay_counters: IndexMap::new(),
            ensure_failures: IndexMap::new(),
            line: 0,
            round: 0,
            round_started: false,
            round_score: 0.0,
            total_score: 0.0,
            usage: Usage::default(),
            round_usage: Usage::default(),
            steps: 0,
            pending_elicit: None,
            history: Vec::new(),
            completed_rounds: Vec::new(),
        }
    }

    /// Clear per-round state. Scalar registers and totals persist.
    pub fn begin_round(&mut self) {
        self.registers.reset_round();
        self.beacons.clear();
        self.beacons.insert(START_BEACON.to_string(), 0);
        self.replay_counters.clear();
        self.ensure_failures.clear();
        self.round_score = 0.0;
        self.round_usage = Usage::default();
        self.steps = 0;
        self.line = 0;
        self.pending_elicit = None;
        self.history.clear();
        self.round_started = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::RegisterId;
    use crate::value::{Value, XList, XString};

    #[test]
    fn test_begin_round_resets_round_state() {
        let mut state = VmState::new(&GameConfig::default());
        let s = RegisterId::parse("s").unwrap();
        let l = RegisterId::parse("l").unwrap();
        state.registers.set(s, Value::from("kept")).unwrap();
        state
            .registers
            .set(l, Value::List(XList::from(vec![XString::new("x")])))
            .unwrap();
        state.beacons.insert("flag_1".into(), 4);
        state.replay_counters.insert(5, 2);
        state.ensure_failures.insert(3, 1);
        state.round_score = 4.0;
        state.total_score = 4.0;

        state.begin_round();

        assert_eq!(state.registers.get(s), Some(&Value::from("kept")));
        assert_eq!(state.registers.get(l), Some(&Value::List(XList::new())));
        assert_eq!(state.beacons.len(), 1);
        assert_eq!(state.beacons.get(START_BEACON), Some(&0));
        assert!(state.replay_counters.is_empty());
        assert!(state.ensure_failures.is_empty());
        assert_eq!(state.round_score, 0.0);
        assert_eq!(state.total_score, 4.0);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut state = VmState::new(&GameConfig::default());
        state.begin_round();
        state.replay_counters.insert(7, 1);
        state.history.push(Event::RoundStarted { round: 0 });
        let json = serde_json::to_string(&state).unwrap();
        let back: VmState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
