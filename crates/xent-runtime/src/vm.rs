//! Instruction execution.
//!
//! One `Vm` borrows everything a line needs and runs it. Control flow comes
//! back as a [`Flow`]; the caller moves the line pointer.

use tracing::{debug, error};
use xent_ast::Expr;

use crate::error::{Error, Result};
use crate::eval::Evaluator;
use crate::events::Event;
use crate::game::GameConfig;
use crate::instruction::Instruction;
use crate::judge::Judge;
use crate::player::{Player, PlayerError};
use crate::program::Program;
use crate::registers::RegisterId;
use crate::scoring;
use crate::state::{ElicitProgress, VmState, PREVIOUS_ELICIT_BEACON, START_BEACON, USER_BEACONS};
use crate::value::{Value, XString};

/// Where execution goes after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Next,
    Jump(usize),
    /// The player halted; the line will run again on resume
    Halt,
}

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    Halted,
}

pub(crate) struct Vm<'a> {
    pub program: &'a Program,
    pub config: &'a GameConfig,
    pub state: &'a mut VmState,
    pub judge: &'a dyn Judge,
    pub player: &'a mut dyn Player,
}

impl Vm<'_> {
    /// Record an event and show it to the player.
    pub fn emit(&mut self, event: Event) {
        self.player.notify(&event);
        self.state.history.push(event);
    }

    /// Execute the line under the pointer.
    pub fn step(&mut self) -> Result<Step> {
        let line = self.state.line;
        let Some(entry) = self.program.line(line) else {
            return Err(self.internal(line, format!("line pointer {} is outside the program", line)));
        };
        let Some(instruction) = entry else {
            self.state.line = line + 1;
            return Ok(Step::Continue);
        };
        if self.state.steps >= self.config.max_steps {
            return Err(Error::game(
                line,
                format!(
                    "round {} exceeded {} executed instructions",
                    self.state.round, self.config.max_steps
                ),
            ));
        }

        debug!(line, instruction = %instruction.kind(), "executing");
        match self.execute(instruction, line)? {
            Flow::Next => self.state.line = line + 1,
            Flow::Jump(target) => {
                if target > self.program.len() {
                    return Err(self.internal(line, format!("jump target {} is outside the program", target)));
                }
                self.state.line = target;
            }
            Flow::Halt => return Ok(Step::Halted),
        }
        self.state.steps += 1;
        Ok(Step::Continue)
    }

    fn execute(&mut self, instruction: &Instruction, line: usize) -> Result<Flow> {
        match instruction {
            Instruction::Assign { targets } => self.assign(targets, line),
            Instruction::Reveal { exprs } => {
                let values = exprs
                    .iter()
                    .map(|expr| self.eval(expr, line))
                    .collect::<Result<Vec<_>>>()?;
                self.emit(Event::Reveal { line, values });
                Ok(Flow::Next)
            }
            Instruction::Elicit { targets, max_len } => self.elicit(targets, max_len, line),
            Instruction::Ensure { conditions } => self.ensure(conditions, line),
            Instruction::Reward { expr } => self.reward(expr, line),
            Instruction::Beacon { name } => {
                if !USER_BEACONS.contains(&name.as_str()) {
                    return Err(Error::game(
                        line,
                        format!(
                            "'{}' is not a beacon; use one of {}",
                            name,
                            USER_BEACONS.join(", ")
                        ),
                    ));
                }
                self.state.beacons.insert(name.clone(), line);
                Ok(Flow::Next)
            }
            Instruction::Replay { name, count } => self.replay(name, count, line),
        }
    }

    fn eval(&self, expr: &Expr, line: usize) -> Result<Value> {
        Evaluator::new(&self.state.registers, self.judge, line).eval(expr)
    }

    fn count(&self, expr: &Expr, what: &str, line: usize) -> Result<usize> {
        let value = self.eval(expr, line)?;
        value.as_count().ok_or_else(|| {
            Error::type_error(
                line,
                format!("{} must be a non-negative integer, got {}", what, value),
            )
        })
    }

    fn assign(&mut self, targets: &[(RegisterId, Expr)], line: usize) -> Result<Flow> {
        // Evaluate every right-hand side before any write lands
        let values = targets
            .iter()
            .map(|(_, expr)| self.eval(expr, line))
            .collect::<Result<Vec<_>>>()?;
        for ((id, _), value) in targets.iter().zip(values) {
            self.state
                .registers
                .set(*id, value)
                .map_err(|e| Error::type_error(line, e.to_string()))?;
        }
        Ok(Flow::Next)
    }

    fn elicit(&mut self, targets: &[RegisterId], max_len: &Expr, line: usize) -> Result<Flow> {
        self.state
            .beacons
            .insert(PREVIOUS_ELICIT_BEACON.to_string(), line);
        let budget = self.count(max_len, "elicit length budget", line)?;

        let progress = self
            .state
            .pending_elicit
            .take()
            .filter(|p| p.line == line)
            .unwrap_or(ElicitProgress {
                line,
                next: 0,
                requested: false,
            });

        for (idx, id) in targets.iter().enumerate().skip(progress.next) {
            let register = id.to_string();
            if !(idx == progress.next && progress.requested) {
                self.emit(Event::ElicitRequest {
                    line,
                    register: register.clone(),
                    max_len: budget,
                });
            }

            let snapshot = self.state.registers.public_snapshot();
            let answer = match self.player.request_move(&register, budget, &snapshot) {
                Ok(answer) => answer,
                Err(PlayerError::Halt) => {
                    debug!(line, register = %register, "player halted");
                    self.state.pending_elicit = Some(ElicitProgress {
                        line,
                        next: idx,
                        requested: true,
                    });
                    return Ok(Flow::Halt);
                }
                Err(PlayerError::Failed(message)) => {
                    return Err(Error::Player { line, message });
                }
            };

            let response = scoring::first_n_tokens(self.judge, &XString::new(answer.response), budget);
            self.state
                .registers
                .set(*id, Value::Str(response.clone()))
                .map_err(|e| Error::type_error(line, e.to_string()))?;
            self.state.usage += answer.usage;
            self.state.round_usage += answer.usage;
            self.emit(Event::ElicitResponse {
                line,
                register,
                response,
            });
        }
        Ok(Flow::Next)
    }

    fn ensure(&mut self, conditions: &[Expr], line: usize) -> Result<Flow> {
        let mut results = Vec::with_capacity(conditions.len());
        for expr in conditions {
            let value = self.eval(expr, line)?;
            let holds = value.as_condition().ok_or_else(|| {
                Error::type_error(
                    line,
                    format!("ensure() needs boolean conditions, got {}", value.kind_name()),
                )
            })?;
            results.push(holds);
        }

        if results.iter().all(|holds| *holds) {
            self.state.ensure_failures.shift_remove(&line);
            return Ok(Flow::Next);
        }

        let Some(&retry_line) = self.state.beacons.get(PREVIOUS_ELICIT_BEACON) else {
            return Err(Error::game(
                line,
                "ensure() failed with no earlier elicit to retry",
            ));
        };
        let attempt = {
            let failures = self.state.ensure_failures.entry(line).or_insert(0);
            *failures += 1;
            *failures
        };
        self.emit(Event::FailedEnsure {
            line,
            results,
            retry_line,
            attempt,
        });
        if attempt >= self.config.max_ensure_failures {
            return Err(Error::game(
                line,
                format!("ensure() failed {} times in a row", attempt),
            ));
        }
        debug!(line, retry_line, attempt, "ensure failed, retrying elicit");
        Ok(Flow::Jump(retry_line))
    }

    fn reward(&mut self, expr: &Expr, line: usize) -> Result<Flow> {
        let value = self.eval(expr, line)?;
        let score = match &value {
            Value::Number(n) => *n,
            Value::Xent(v) => v.total(),
            other => {
                return Err(Error::type_error(
                    line,
                    format!("reward() needs a number or xent vector, got {}", other.kind_name()),
                ))
            }
        };
        let round_score = self.state.round_score + score;
        let total_score = self.state.total_score + score;
        if !round_score.is_finite() || !total_score.is_finite() {
            return Err(Error::type_error(
                line,
                format!("reward of {} overflows the game score", score),
            ));
        }
        self.state.round_score = round_score;
        self.state.total_score = total_score;
        self.emit(Event::Reward { line, value, score });
        Ok(Flow::Next)
    }

    fn replay(&mut self, name: &str, count: &Expr, line: usize) -> Result<Flow> {
        let count = self.count(count, "replay count", line)? as u64;
        let taken = self.state.replay_counters.get(&line).copied().unwrap_or(0);
        if taken >= count {
            self.state.replay_counters.shift_remove(&line);
            return Ok(Flow::Next);
        }

        let Some(&beacon_line) = self.state.beacons.get(name) else {
            return Err(self.internal(line, format!("replay to undeclared beacon '{}'", name)));
        };
        self.state.replay_counters.insert(line, taken + 1);
        // `start` sits before the first line rather than on it
        let target = if name == START_BEACON {
            beacon_line
        } else {
            beacon_line + 1
        };
        Ok(Flow::Jump(target))
    }

    fn internal(&self, line: usize, message: String) -> Error {
        error!(line, round = self.state.round, message = %message, "internal VM error");
        Error::internal(line, message)
    }
}
