//! Orchestrator errors

use std::path::PathBuf;

use thiserror::Error;

/// Orchestrator result type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Runtime(#[from] xent_runtime::Error),

    #[error("judge error: {0}")]
    Judge(#[from] xent_runtime::JudgeError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid run configuration: {0}")]
    Config(String),

    #[error("unknown player '{0}'")]
    UnknownPlayer(String),

    #[error("result store lock poisoned")]
    StorePoisoned,
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
