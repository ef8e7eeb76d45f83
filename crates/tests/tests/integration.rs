//! Integration tests for end-to-end XENT execution.
//!
//! These tests verify the full pipeline:
//! Load program → Execute rounds → Suspend/Resume → Verify events and scores

use std::sync::Arc;

use indexmap::IndexMap;
use xent_orchestrator::{
    FileStore, Orchestrator, RunConfig, ScriptedPlayers, UnitReport, UnitStatus,
};
use xent_runtime::{
    scoring, BuiltinJudges, CacheJudge, Checkpoint, Error, Event, Game, GameConfig, Judge,
    MailboxPlayer, Move, Player, PlayerError, ScriptedPlayer, Value, XString,
};
use xent_tests::{all_events, event_names, TestHarness};

const EPS: f64 = 1e-9;

fn load_error(source: &str) -> Error {
    match Game::new(source, GameConfig::default(), Box::new(CacheJudge::default())) {
        Ok(_) => panic!("program loaded: {}", source),
        Err(e) => e,
    }
}

fn run_error(source: &str, response: &str) -> Error {
    let mut harness = TestHarness::from_source(source);
    harness
        .try_run(&mut xent_runtime::ConstantPlayer::new("c", response))
        .err()
        .unwrap_or_else(|| panic!("program ran: {}", source))
}

fn total(value: &Value) -> f64 {
    match value {
        Value::Xent(v) => v.total(),
        other => panic!("expected xent vector, got {:?}", other),
    }
}

/// Test the reference assign/reveal/elicit/ensure/reward program.
///
/// Verifies: event order and the reward vector length
#[test]
fn test_concrete_scenario() {
    let source = "assign(s='hello')\n\
                  reveal(s)\n\
                  elicit(x, 10)\n\
                  ensure(len(x) > 0)\n\
                  reward(xent(x))";

    let mut harness = TestHarness::from_source(source);
    let summary = harness.run_constant("hi");
    let history = &summary.rounds[0].history;

    assert_eq!(history[0], Event::RoundStarted { round: 0 });
    assert_eq!(
        event_names(&history[1..]),
        vec![
            "reveal",
            "elicit_request",
            "elicit_response",
            "reward",
            "round_finished"
        ]
    );

    let expected_len = CacheJudge::default().tokenize("hi").len();
    match &history[4] {
        Event::Reward {
            value: Value::Xent(vector),
            score,
            ..
        } => {
            assert_eq!(vector.len(), expected_len);
            assert!((vector.total() - score).abs() < EPS);
        }
        other => panic!("expected reward event, got {:?}", other),
    }
    assert!((summary.total_score - summary.rounds[0].score).abs() < EPS);
}

/// Test that consecutive ensure failures end the game at the ceiling.
#[test]
fn test_backtrack_ceiling() {
    let mut harness = TestHarness::from_source("elicit(x, 5)\nensure(len(x) > 3)");
    let err = harness
        .try_run(&mut xent_runtime::ConstantPlayer::new("c", "no"))
        .unwrap_err();
    assert!(matches!(err, Error::Game { line: 1, .. }));

    let history = harness.current_history();
    let failures: Vec<u32> = history
        .iter()
        .filter_map(|e| match e {
            Event::FailedEnsure {
                attempt,
                retry_line,
                ..
            } => {
                assert_eq!(*retry_line, 0);
                Some(*attempt)
            }
            _ => None,
        })
        .collect();
    assert_eq!(failures, (1..=10).collect::<Vec<_>>());
    let requests = history
        .iter()
        .filter(|e| matches!(e, Event::ElicitRequest { .. }))
        .count();
    assert_eq!(requests, 10);
}

/// Test that the ensure ceiling is configurable and counted per line.
#[test]
fn test_ensure_failures_are_per_line() {
    let source = "elicit(x, 5)\n\
                  ensure(len(x) > 3)\n\
                  elicit(y, 5)\n\
                  ensure(len(y) > 3)";
    let config = GameConfig {
        max_ensure_failures: 3,
        ..GameConfig::default()
    };

    let mut harness = TestHarness::with_config(source, config.clone());
    let mut player = ScriptedPlayer::new("p", ["no", "no", "okay!", "no", "no", "yes please"]);
    let summary = harness.run(&mut player);
    let failures = summary.rounds[0]
        .history
        .iter()
        .filter(|e| matches!(e, Event::FailedEnsure { .. }))
        .count();
    assert_eq!(failures, 4);
    assert_eq!(harness.register("y"), Some(&Value::from("yes please")));

    let mut harness = TestHarness::with_config(source, config);
    let mut player = ScriptedPlayer::new("p", ["no"]);
    assert!(matches!(
        harness.try_run(&mut player),
        Err(Error::Game { line: 1, .. })
    ));
}

/// Test that replay counters are independent per call site and reset on fall-through.
#[test]
fn test_replay_independence() {
    let sequential = "beacon(flag_1)\n\
                      reward(1)\n\
                      replay(flag_1, 2)\n\
                      beacon(flag_2)\n\
                      reward(10)\n\
                      replay(flag_2, 1)";
    let summary = TestHarness::from_source(sequential).run_constant("");
    assert_eq!(summary.total_score, 23.0);

    // The inner loop runs in full on every pass of the outer one
    let nested = "beacon(flag_1)\n\
                  reward(1)\n\
                  beacon(flag_2)\n\
                  reward(10)\n\
                  replay(flag_2, 2)\n\
                  replay(flag_1, 1)";
    let summary = TestHarness::from_source(nested).run_constant("");
    assert_eq!(summary.total_score, 62.0);
}

/// Test replay edge cases: undeclared beacons and zero counts.
#[test]
fn test_replay_edge_cases() {
    let err = run_error("replay(flag_3, 1)", "");
    assert!(matches!(err, Error::Internal { line: 0, .. }));

    let summary = TestHarness::from_source("replay(flag_3, 0)\nreward(2)").run_constant("");
    assert_eq!(summary.total_score, 2.0);

    let err = run_error("beacon(flag_9)", "");
    assert!(matches!(err, Error::Game { .. }));
}

/// Test that suspending, serializing and resuming reproduces an uninterrupted run.
///
/// Verifies: the five events after the suspension point are identical
#[test]
fn test_checkpoint_equivalence() {
    let source = "assign(s='The story so far:')\n\
                  elicit(x, 8)\n\
                  reveal(x | s)\n\
                  reward(xent(x | s))\n\
                  elicit(y, 8)\n\
                  ensure(len(y) > 2)\n\
                  reward(xed(y | x))";
    let config = GameConfig {
        rounds: 2,
        ..GameConfig::default()
    };
    let responses = ["a cat", "no", "the cat sat", "dog", "a dog ran"];

    let mut straight = TestHarness::with_config(source, config.clone());
    let mut player = MailboxPlayer::new("m");
    for response in responses {
        player.post(response);
    }
    let expected = straight.run(&mut player);

    let mut interrupted = TestHarness::with_config(source, config);
    let mut first = MailboxPlayer::new("m");
    for response in &responses[..2] {
        first.post(*response);
    }
    let suspended = interrupted.run_until_halt(&mut first);
    let suspension_point = suspended.vm.history.len();
    assert_eq!(
        suspended.vm.history.last().map(Event::name),
        Some("elicit_request")
    );

    let json = Checkpoint::from(suspended).to_json().unwrap();
    let restored = match Checkpoint::from_json(&json).unwrap() {
        Checkpoint::State(state) => *state,
        Checkpoint::Results(_) => panic!("expected suspended state"),
    };
    let mut resumed = TestHarness::from_game(Game::resume(restored, &BuiltinJudges).unwrap());
    let mut second = MailboxPlayer::new("m");
    for response in &responses[2..] {
        second.post(*response);
    }
    let actual = resumed.run(&mut second);

    let expected_events = all_events(&expected);
    let actual_events = all_events(&actual);
    assert_eq!(
        actual_events[suspension_point..suspension_point + 5],
        expected_events[suspension_point..suspension_point + 5]
    );
    assert_eq!(actual, expected);
}

/// Test register kinds, mutability and visibility.
#[test]
fn test_register_typing() {
    assert!(matches!(load_error("assign(p='x')"), Error::Type { .. }));
    assert!(matches!(load_error("elicit(l, 5)"), Error::Type { .. }));
    assert!(matches!(load_error("reveal(q1)"), Error::Syntax { .. }));
    assert!(matches!(load_error("reveal(s4)"), Error::Syntax { .. }));
    assert!(matches!(run_error("assign(l='text')", ""), Error::Type { line: 0, .. }));
    assert!(matches!(run_error("assign(s=['a'])", ""), Error::Type { line: 0, .. }));

    let mut presets = IndexMap::new();
    presets.insert("p".to_string(), "secret prompt".to_string());
    let config = GameConfig {
        presets,
        ..GameConfig::default()
    };
    let mut harness = TestHarness::with_config("assign(x='hidden')\nelicit(s, 3)", config);
    let mut spy = SnapshotSpy::default();
    harness.run(&mut spy);

    assert_eq!(harness.register("p"), Some(&Value::from("secret prompt")));
    assert_eq!(spy.seen.get("p"), Some(&Value::from("secret prompt")));
    assert!(!spy.seen.contains_key("x"));
    assert!(!spy.seen.contains_key("y2"));
    assert!(spy.seen.contains_key("l3"));
}

/// Records the last snapshot it was shown.
#[derive(Default)]
struct SnapshotSpy {
    seen: IndexMap<String, Value>,
}

impl Player for SnapshotSpy {
    fn id(&self) -> &str {
        "spy"
    }

    fn request_move(
        &mut self,
        _register: &str,
        _max_len: usize,
        snapshot: &IndexMap<String, Value>,
    ) -> Result<Move, PlayerError> {
        self.seen = snapshot.clone();
        Ok(Move::new("ok"))
    }
}

/// Test vector arithmetic through programs.
#[test]
fn test_vector_algebra() {
    let summary = TestHarness::from_source("assign(s='a b c')\nreward(xent(s) * 2 - xent(s))")
        .run_constant("");
    let single = scoring::xent(&CacheJudge::default(), &XString::new("a b c"), "").unwrap();
    assert!((summary.total_score - single.total()).abs() < EPS);

    let summary = TestHarness::from_source("assign(s='a b c')\nreward(-xent(s))").run_constant("");
    assert!((summary.total_score + single.total()).abs() < EPS);

    let err = run_error("assign(s='a b', t='a c')\nreward(xent(s) + xent(t))", "");
    assert!(matches!(err, Error::Type { line: 1, .. }));

    let err = run_error("assign(s='a b', t='a b c')\nreward(xent(s) - xent(t))", "");
    assert!(matches!(err, Error::Type { line: 1, .. }));
}

/// Test the relations between xent, nex, xed and dex on real programs.
#[test]
fn test_scoring_identities() {
    let source = "assign(s='the blue sky', t=' blue sky')\n\
                  reveal(xed(t | s), xent(t) - xent(t | s), nex(t), xent(t), dex(t | s), xent(t, s), xent(t | s))";
    let summary = TestHarness::from_source(source).run_constant("");
    let values = summary.rounds[0]
        .history
        .iter()
        .find_map(|e| match e {
            Event::Reveal { values, .. } => Some(values.clone()),
            _ => None,
        })
        .unwrap();
    let totals: Vec<f64> = values.iter().map(total).collect();

    assert!((totals[0] - totals[1]).abs() < EPS, "xed = xent(plain) - xent(decorated)");
    assert!(totals[0] > 0.0, "relevant context lowers cross-entropy");
    assert!((totals[2] + totals[3]).abs() < EPS, "nex = -xent");
    assert!((totals[4] + totals[0]).abs() < EPS, "dex = -xed");
    assert!((totals[5] - totals[6]).abs() < EPS, "decoration acts as context");
}

/// Test that ensure accepts traced comparisons over scores.
#[test]
fn test_validated_conditions_gate_ensure() {
    let source = "elicit(x, 10)\n\
                  ensure(xent(x | x) < xent(x), is_true('true true true'))\n\
                  reward(dex(x | x))";
    let summary = TestHarness::from_source(source).run_constant("cat cat cat");
    assert_eq!(
        event_names(&summary.rounds[0].history),
        vec![
            "round_started",
            "elicit_request",
            "elicit_response",
            "reward",
            "round_finished"
        ]
    );
    assert!(summary.total_score < 0.0);
}

async fn run_batch(config: &RunConfig) -> Vec<UnitReport> {
    let store = FileStore::new(&config.output_dir).unwrap();
    Orchestrator::new(
        config.max_concurrency,
        Arc::new(store),
        Arc::new(ScriptedPlayers),
        Arc::new(BuiltinJudges),
    )
    .run(config.work_units().unwrap())
    .await
}

/// Test that a second orchestrator run over the same store touches nothing.
#[tokio::test]
async fn test_orchestrator_idempotence() {
    let dir = tempfile::tempdir().unwrap();
    let config: RunConfig = serde_json::from_value(serde_json::json!({
        "games": [
            {"name": "echo", "program": "elicit(x, 10)\nreward(xent(x))"},
            {"name": "broken", "program": "reward(missing)"}
        ],
        "players": [{"id": "p", "responses": ["hello there"]}],
        "seeds": [1, 2, 3],
        "max_concurrency": 2,
        "output_dir": dir.path()
    }))
    .unwrap();

    let first = run_batch(&config).await;
    assert_eq!(first.len(), 6);
    let completed = first
        .iter()
        .filter(|r| matches!(r.status, UnitStatus::Completed { .. }))
        .count();
    let failed = first
        .iter()
        .filter(|r| matches!(r.status, UnitStatus::Failed { .. }))
        .count();
    assert_eq!((completed, failed), (3, 3));

    let second = run_batch(&config).await;
    for (before, after) in first.iter().zip(&second) {
        match (&before.status, &after.status) {
            (UnitStatus::Completed { total_score }, UnitStatus::Skipped { total_score: stored }) => {
                assert_eq!(total_score, stored)
            }
            (UnitStatus::Failed { .. }, UnitStatus::Failed { .. }) => {}
            other => panic!("unexpected transition {:?}", other),
        }
    }

    let files = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(files, 3);
}
