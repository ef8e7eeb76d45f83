//! Bounded concurrent execution of work units
//!
//! Every unit becomes a tokio task. A semaphore caps how many are in flight,
//! and the VM itself runs on the blocking pool. A unit that fails or panics
//! is logged and reported; it never takes its siblings down.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};
use xent_runtime::{Checkpoint, Game, JudgeConfig, JudgeFactory, RunOutcome};

use crate::error::Result;
use crate::store::{ResultStore, UnitRecord};
use crate::unit::{PlayerFactory, WorkUnit};

/// How a work unit ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Completed { total_score: f64 },
    /// The player halted; the stored state can be resumed later
    Suspended,
    /// A completed record was already stored
    Skipped { total_score: f64 },
    /// No result; the error is logged
    Failed { error: String },
}

/// Report for one work unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitReport {
    pub key: String,
    pub game: String,
    pub player: String,
    pub seed: u64,
    #[serde(flatten)]
    pub status: UnitStatus,
}

/// Shared handles every unit needs.
#[derive(Clone)]
struct UnitContext {
    store: Arc<dyn ResultStore>,
    players: Arc<dyn PlayerFactory>,
    judges: Arc<dyn JudgeFactory>,
    judge: JudgeConfig,
}

/// Runs work units with bounded concurrency against a result store.
pub struct Orchestrator {
    max_concurrency: usize,
    context: UnitContext,
}

impl Orchestrator {
    pub fn new(
        max_concurrency: usize,
        store: Arc<dyn ResultStore>,
        players: Arc<dyn PlayerFactory>,
        judges: Arc<dyn JudgeFactory>,
    ) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            context: UnitContext {
                store,
                players,
                judges,
                judge: JudgeConfig::default(),
            },
        }
    }

    /// Judge model for new units; each unit's seed replaces the configured one.
    pub fn with_judge(mut self, judge: JudgeConfig) -> Self {
        self.context.judge = judge;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Run every unit and report each outcome, in input order.
    #[instrument(skip_all, fields(units = units.len(), max_concurrency = self.max_concurrency))]
    pub async fn run(&self, units: Vec<WorkUnit>) -> Vec<UnitReport> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, unit) in units.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let context = self.context.clone();
            tasks.spawn(async move {
                let report = |status| UnitReport {
                    key: unit.key(),
                    game: unit.game.name.clone(),
                    player: unit.player.id.clone(),
                    seed: unit.seed,
                    status,
                };

                // Acquire semaphore permit for concurrency control
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return (index, report(UnitStatus::Failed { error: e.to_string() }));
                    }
                };

                let key = unit.key();
                let blocking_unit = unit.clone();
                let status = match tokio::task::spawn_blocking(move || context.execute(&blocking_unit)).await {
                    Ok(Ok(status)) => status,
                    Ok(Err(e)) => {
                        error!(key = %key, error = %e, "work unit failed");
                        UnitStatus::Failed { error: e.to_string() }
                    }
                    Err(e) => {
                        error!(key = %key, error = %e, "work unit panicked");
                        UnitStatus::Failed { error: format!("panicked: {}", e) }
                    }
                };
                (index, report(status))
            });
        }

        let mut reports = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => error!(error = %e, "work unit task aborted"),
            }
        }
        reports.sort_by_key(|(index, _)| *index);
        let reports: Vec<UnitReport> = reports.into_iter().map(|(_, report)| report).collect();

        let count = |pred: fn(&UnitStatus) -> bool| reports.iter().filter(|r| pred(&r.status)).count();
        info!(
            completed = count(|s| matches!(s, UnitStatus::Completed { .. })),
            suspended = count(|s| matches!(s, UnitStatus::Suspended)),
            skipped = count(|s| matches!(s, UnitStatus::Skipped { .. })),
            failed = count(|s| matches!(s, UnitStatus::Failed { .. })),
            "batch finished"
        );
        reports
    }
}

impl UnitContext {
    /// Run one unit to completion or suspension, consulting the store first.
    fn execute(&self, unit: &WorkUnit) -> Result<UnitStatus> {
        let key = unit.key();
        let existing = self.store.load(&key)?;

        let mut game = match existing {
            Some(record) if record.is_complete() => {
                info!(key = %key, "already completed, skipping");
                return Ok(UnitStatus::Skipped {
                    total_score: record.total_score,
                });
            }
            Some(UnitRecord {
                checkpoint: Checkpoint::State(suspended),
                ..
            }) => {
                info!(key = %key, "resuming suspended unit");
                Game::resume(*suspended, self.judges.as_ref())?
            }
            _ => {
                let judge = self.judges.build(&JudgeConfig {
                    model: self.judge.model.clone(),
                    seed: unit.seed,
                })?;
                Game::new(&unit.game.program, unit.game.config.clone(), judge)?
            }
        };

        let mut player = self.players.create(&unit.player, unit.seed)?;
        debug!(key = %key, "running unit");
        let outcome = game.run(player.as_mut())?;

        let summary = game.summary();
        let (checkpoint, status) = match outcome {
            RunOutcome::Finished(summary) => (
                Checkpoint::from(summary.clone()),
                UnitStatus::Completed {
                    total_score: summary.total_score,
                },
            ),
            RunOutcome::Suspended(suspended) => {
                warn!(key = %key, line = suspended.vm.line, "player halted, unit suspended");
                (Checkpoint::State(suspended), UnitStatus::Suspended)
            }
        };
        let record = UnitRecord {
            game: unit.game.name.clone(),
            player: unit.player.id.clone(),
            seed: unit.seed,
            total_score: summary.total_score,
            usage: summary.usage,
            checkpoint,
        };
        self.store.save(&key, &record)?;
        Ok(status)
    }
}
