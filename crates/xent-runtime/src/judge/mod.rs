//! Judge language model interface
//!
//! A judge turns text into tokens and reports, for a token sequence, the
//! cost in bits of every token after a given prefix. Scoring is built on
//! these two calls only.

mod cache;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::CacheJudge;

/// Judge failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JudgeError {
    #[error("unknown judge model '{0}'")]
    UnknownModel(String),

    #[error("prefix length {prefix_len} exceeds sequence length {len}")]
    PrefixOutOfRange { prefix_len: usize, len: usize },

    #[error("judge returned {got} costs for {expected} tokens")]
    CostCount { expected: usize, got: usize },

    #[error("judge backend failed: {0}")]
    Backend(String),
}

/// Everything needed to rebuild an equivalent judge after resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeConfig {
    pub model: String,
    #[serde(default)]
    pub seed: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            model: CacheJudge::MODEL.to_string(),
            seed: 0,
        }
    }
}

/// Log-probability oracle.
pub trait Judge: Send {
    /// Split text into judge tokens. Concatenating the tokens gives back `text`.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Cost in bits of each token in `tokens[prefix_len..]`, given all
    /// preceding tokens. An empty prefix means beginning of text.
    fn score(&self, tokens: &[String], prefix_len: usize) -> Result<Vec<f64>, JudgeError>;

    /// Configuration this judge was built from.
    fn config(&self) -> JudgeConfig;
}

/// Builds judges from their configuration.
pub trait JudgeFactory: Send + Sync {
    fn build(&self, config: &JudgeConfig) -> Result<Box<dyn Judge>, JudgeError>;
}

/// Factory for the judges shipped with the runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinJudges;

impl JudgeFactory for BuiltinJudges {
    fn build(&self, config: &JudgeConfig) -> Result<Box<dyn Judge>, JudgeError> {
        match config.model.as_str() {
            CacheJudge::MODEL => Ok(Box::new(CacheJudge::new(config.seed))),
            other => Err(JudgeError::UnknownModel(other.to_string())),
        }
    }
}
