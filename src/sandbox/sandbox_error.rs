use crate::symbolic::symbolic_error::SymbolicError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Symbolic(#[from] SymbolicError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("script error at '{step}': {reason}")]
    Script { step: String, reason: String },
    #[error("no token with id {0}")]
    UnknownToken(usize),
}

impl SandboxError {
    pub fn script(step: &str, reason: impl Into<String>) -> Self {
        SandboxError::Script {
            step: step.to_string(),
            reason: reason.into(),
        }
    }
}
