//! Error type shared by the parser, the integrator and the equation solver.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolicError {
    /// The input string could not be turned into an expression tree
    #[error("cannot parse '{input}': {reason}")]
    Parse { input: String, reason: String },
    #[error("cannot integrate {0}")]
    CannotIntegrate(String),
    #[error("no solution found for {0}")]
    NoSolution(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("variable '{0}' has no value")]
    UnboundVariable(String),
}

impl SymbolicError {
    pub fn parse(input: &str, reason: impl Into<String>) -> Self {
        SymbolicError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
