//! Runtime errors
//!
//! Every variant is fatal to the program instance that raised it. `ensure`
//! failures below the retry ceiling are control flow and never reach here.

use thiserror::Error;

use crate::judge::JudgeError;

/// Runtime result type
pub type Result<T> = std::result::Result<T, Error>;

/// Runtime errors
#[derive(Debug, Error)]
pub enum Error {
    /// A line does not parse as a valid instruction call
    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A value has the wrong kind for its target or operator
    #[error("type error on line {line}: {message}")]
    Type { line: usize, message: String },

    /// Unknown identifier, unknown function, or bad builtin arity
    #[error("resolution error on line {line}: {message}")]
    Resolution { line: usize, message: String },

    /// A runtime precondition of the game was violated
    #[error("game error on line {line}: {message}")]
    Game { line: usize, message: String },

    /// Invariant violation inside the VM
    #[error("internal error on line {line}: {message}")]
    Internal { line: usize, message: String },

    /// Program exceeds structural limits before execution starts
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("judge error on line {line}: {source}")]
    Judge {
        line: usize,
        #[source]
        source: JudgeError,
    },

    #[error("player error on line {line}: {message}")]
    Player { line: usize, message: String },

    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

impl Error {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            message: message.into(),
        }
    }

    pub fn type_error(line: usize, message: impl Into<String>) -> Self {
        Error::Type {
            line,
            message: message.into(),
        }
    }

    pub fn resolution(line: usize, message: impl Into<String>) -> Self {
        Error::Resolution {
            line,
            message: message.into(),
        }
    }

    pub fn game(line: usize, message: impl Into<String>) -> Self {
        Error::Game {
            line,
            message: message.into(),
        }
    }

    pub fn internal(line: usize, message: impl Into<String>) -> Self {
        Error::Internal {
            line,
            message: message.into(),
        }
    }

    /// Program line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. }
            | Error::Type { line, .. }
            | Error::Resolution { line, .. }
            | Error::Game { line, .. }
            | Error::Internal { line, .. }
            | Error::Judge { line, .. }
            | Error::Player { line, .. } => Some(*line),
            Error::Configuration(_) | Error::Checkpoint(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Checkpoint(err.to_string())
    }
}
