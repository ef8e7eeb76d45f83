//! Cache language model judge.
//!
//! Predicts each token from how often it already appeared in the preceding
//! tokens, with additive smoothing over a fixed vocabulary size. Fully
//! deterministic, and context-sensitive enough that `xed` is meaningful.

use tracing::trace;

use super::{Judge, JudgeConfig, JudgeError};

/// Additive smoothing mass per vocabulary entry.
const ALPHA: f64 = 0.5;

/// Nominal vocabulary size.
const VOCAB_SIZE: f64 = 50_000.0;

/// Deterministic reference judge.
#[derive(Debug, Clone)]
pub struct CacheJudge {
    seed: u64,
}

impl CacheJudge {
    pub const MODEL: &'static str = "cache";

    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Cost of `token` after `history`.
    fn token_cost(token: &str, history: &[String]) -> f64 {
        let seen = history.iter().filter(|t| t.as_str() == token).count() as f64;
        let probability = (seen + ALPHA) / (history.len() as f64 + ALPHA * VOCAB_SIZE);
        -probability.log2()
    }
}

impl Default for CacheJudge {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Judge for CacheJudge {
    /// Words take at most one leading space; every other character stands alone.
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut rest = text;
        while let Some(first) = rest.chars().next() {
            let after_space = if first == ' ' { &rest[1..] } else { rest };
            let word_len: usize = after_space
                .chars()
                .take_while(|c| c.is_alphanumeric())
                .map(char::len_utf8)
                .sum();
            let len = if word_len > 0 {
                word_len + (rest.len() - after_space.len())
            } else {
                first.len_utf8()
            };
            tokens.push(rest[..len].to_string());
            rest = &rest[len..];
        }
        tokens
    }

    fn score(&self, tokens: &[String], prefix_len: usize) -> Result<Vec<f64>, JudgeError> {
        if prefix_len > tokens.len() {
            return Err(JudgeError::PrefixOutOfRange {
                prefix_len,
                len: tokens.len(),
            });
        }
        let costs: Vec<f64> = (prefix_len..tokens.len())
            .map(|i| Self::token_cost(&tokens[i], &tokens[..i]))
            .collect();
        trace!(prefix_len, scored = costs.len(), "cache judge scored");
        Ok(costs)
    }

    fn config(&self) -> JudgeConfig {
        JudgeConfig {
            model: Self::MODEL.to_string(),
            seed: self.seed,
        }
    }
}
