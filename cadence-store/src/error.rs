use std::path::PathBuf;

use cadence_core::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("access denied")]
    AccessDenied,

    #[error("{0}")]
    Duplicate(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt store file {path}: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Engine(EngineError::validation(msg))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
