use thiserror::Error;

use crate::error::UseError;

/// Faults raised while parsing or evaluating a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("SyntaxError: {0}")]
    Syntax(String),
    #[error("ReferenceError: {0}")]
    Reference(String),
    #[error("TypeError: {0}")]
    Type(String),
    /// A value raised by a `throw` statement, rendered as a string.
    #[error("Uncaught {0}")]
    Thrown(String),
    /// A host error raised by a native function. It keeps its own kind once
    /// it leaves the script.
    #[error(transparent)]
    Host(Box<UseError>),
}

impl From<UseError> for ScriptError {
    fn from(error: UseError) -> Self {
        ScriptError::Host(Box::new(error))
    }
}
