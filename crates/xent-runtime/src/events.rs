//! Round history events.

use serde::{Deserialize, Serialize};

use crate::value::{Value, XString};

/// An immutable record of something that happened during a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    RoundStarted {
        round: usize,
    },
    ElicitRequest {
        line: usize,
        register: String,
        max_len: usize,
    },
    ElicitResponse {
        line: usize,
        register: String,
        response: XString,
    },
    Reveal {
        line: usize,
        values: Vec<Value>,
    },
    Reward {
        line: usize,
        value: Value,
        /// Amount added to the score
        score: f64,
    },
    FailedEnsure {
        line: usize,
        /// Outcome of each condition, in order
        results: Vec<bool>,
        retry_line: usize,
        /// Consecutive failures on this line so far
        attempt: u32,
    },
    RoundFinished {
        round: usize,
        score: f64,
    },
}

impl Event {
    /// The snake_case event tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::RoundStarted { .. } => "round_started",
            Event::ElicitRequest { .. } => "elicit_request",
            Event::ElicitResponse { .. } => "elicit_response",
            Event::Reveal { .. } => "reveal",
            Event::Reward { .. } => "reward",
            Event::FailedEnsure { .. } => "failed_ensure",
            Event::RoundFinished { .. } => "round_finished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_matches_name() {
        let events = vec![
            Event::RoundStarted { round: 0 },
            Event::FailedEnsure {
                line: 3,
                results: vec![true, false],
                retry_line: 2,
                attempt: 1,
            },
            Event::Reward {
                line: 4,
                value: Value::Number(2.0),
                score: 2.0,
            },
        ];
        for event in &events {
            let json = serde_json::to_value(event).unwrap();
            assert_eq!(json["type"], event.name());
        }
    }
}
