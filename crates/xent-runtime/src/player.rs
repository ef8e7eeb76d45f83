//! Players
//!
//! A player answers `elicit` requests. It may instead signal [`PlayerError::Halt`],
//! which suspends the game until a response is available.

use std::collections::VecDeque;
use std::ops::AddAssign;
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::Event;
use crate::value::Value;

/// Resource usage reported by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl AddAssign for Usage {
    fn add_assign(&mut self, other: Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// A player's answer to one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Move {
    pub response: String,
    pub usage: Usage,
}

impl Move {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            usage: Usage::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayerError {
    /// No answer yet; suspend and resume later
    #[error("player halted")]
    Halt,

    #[error("player failed: {0}")]
    Failed(String),
}

/// Something that answers `elicit` requests.
pub trait Player: Send {
    fn id(&self) -> &str;

    /// Produce text for `register`, at most `max_len` judge tokens long.
    fn request_move(
        &mut self,
        register: &str,
        max_len: usize,
        snapshot: &IndexMap<String, Value>,
    ) -> Result<Move, PlayerError>;

    /// Observe an event. Called for every event the game emits.
    fn notify(&mut self, _event: &Event) {}
}

/// What a [`ScriptedPlayer`] does once its script runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhenExhausted {
    #[default]
    RepeatLast,
    Halt,
}

/// Answers from a fixed list of responses.
#[derive(Debug, Clone)]
pub struct ScriptedPlayer {
    id: String,
    responses: VecDeque<String>,
    last: Option<String>,
    when_exhausted: WhenExhausted,
    requests: usize,
    events: Vec<Event>,
}

impl ScriptedPlayer {
    pub fn new<I, S>(id: impl Into<String>, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            responses: responses.into_iter().map(Into::into).collect(),
            last: None,
            when_exhausted: WhenExhausted::default(),
            requests: 0,
            events: Vec::new(),
        }
    }

    pub fn when_exhausted(mut self, behaviour: WhenExhausted) -> Self {
        self.when_exhausted = behaviour;
        self
    }

    /// Number of requests that produced a response.
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Events seen through `notify`.
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl Player for ScriptedPlayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn request_move(
        &mut self,
        _register: &str,
        _max_len: usize,
        _snapshot: &IndexMap<String, Value>,
    ) -> Result<Move, PlayerError> {
        let response = match self.responses.pop_front() {
            Some(response) => response,
            None => match (self.when_exhausted, &self.last) {
                (WhenExhausted::RepeatLast, Some(last)) => last.clone(),
                _ => return Err(PlayerError::Halt),
            },
        };
        self.last = Some(response.clone());
        self.requests += 1;
        Ok(Move {
            usage: Usage {
                input_tokens: 0,
                output_tokens: response.split_whitespace().count() as u64,
            },
            response,
        })
    }

    fn notify(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

/// Always gives the same answer.
#[derive(Debug, Clone)]
pub struct ConstantPlayer {
    id: String,
    response: String,
}

impl ConstantPlayer {
    pub fn new(id: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            response: response.into(),
        }
    }
}

impl Player for ConstantPlayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn request_move(
        &mut self,
        _register: &str,
        _max_len: usize,
        _snapshot: &IndexMap<String, Value>,
    ) -> Result<Move, PlayerError> {
        Ok(Move::new(self.response.clone()))
    }
}

/// Answers from a shared queue filled from outside; halts while it is empty.
#[derive(Debug, Clone)]
pub struct MailboxPlayer {
    id: String,
    inbox: Arc<Mutex<VecDeque<String>>>,
}

impl MailboxPlayer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            inbox: Arc::default(),
        }
    }

    /// Handle for posting responses from another thread.
    pub fn sender(&self) -> Arc<Mutex<VecDeque<String>>> {
        Arc::clone(&self.inbox)
    }

    pub fn post(&self, response: impl Into<String>) {
        if let Ok(mut inbox) = self.inbox.lock() {
            inbox.push_back(response.into());
        }
    }
}

impl Player for MailboxPlayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn request_move(
        &mut self,
        _register: &str,
        _max_len: usize,
        _snapshot: &IndexMap<String, Value>,
    ) -> Result<Move, PlayerError> {
        let mut inbox = self
            .inbox
            .lock()
            .map_err(|e| PlayerError::Failed(format!("mailbox poisoned: {}", e)))?;
        inbox.pop_front().map(Move::new).ok_or(PlayerError::Halt)
    }
}
