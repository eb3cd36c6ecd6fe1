use thiserror::Error;

use crate::runner::ds::error::ScriptError;

/// Errors raised by the module execution environment.
#[derive(Debug, Error)]
pub enum UseError {
    #[error("Only JS scripts are allowed as dependencies. Invalid dependency: {0}")]
    UnsupportedDependency(String),

    #[error("Unable to load script dependency {0}.")]
    DependencyNotFound(String),

    #[error("Unable to read script {0}.")]
    DependencyUnreadable(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Failed to evaluate script {script}: {source}")]
    ScriptEvaluation {
        script: String,
        #[source]
        source: ScriptError,
    },

    #[error("{0}")]
    LifecycleMisuse(String),

    #[error("Async container was already completed")]
    AlreadyCompleted,

    #[error("Failed to obtain a {0} script engine.")]
    EngineUnavailable(String),

    #[error("Result of {0} is still pending")]
    Unresolved(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UseError {
    /// Convert a script fault raised while running `script`. Host errors
    /// that passed through the script keep their own kind.
    pub fn from_script(script: &str, error: ScriptError) -> Self {
        match error {
            ScriptError::Host(inner) => *inner,
            source => UseError::ScriptEvaluation {
                script: script.to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_host_error_keeps_kind() {
        let inner = ScriptError::from(UseError::DependencyNotFound("x.js".to_string()));
        assert!(matches!(
            UseError::from_script("/apps/a.js", inner),
            UseError::DependencyNotFound(_)
        ));
    }

    #[test]
    fn test_script_fault_is_wrapped_with_cause() {
        let err = UseError::from_script("/apps/a.js", ScriptError::Reference("y is not defined".to_string()));
        assert!(err.to_string().contains("/apps/a.js"));
        assert!(err.source().unwrap().to_string().contains("y is not defined"));
    }
}
