use thiserror::Error;

/// Errors raised by the window/status engine.
///
/// Both variants are scoped to a single task or request; nothing here is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Bad input: unknown window token, missing/non-positive custom days, unknown time zone.
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested transition does not apply to the task's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
