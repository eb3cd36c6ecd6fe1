//! Core types for the evaluation engine.

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::ScriptValue;

/// Completion record type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionType {
    /// Normal completion - execution continues.
    Normal,
    /// Return completion - the enclosing function or program returns.
    Return,
}

/// Completion record.
/// Every statement evaluation returns a completion record. Thrown values
/// travel as `Err` instead.
#[derive(Debug)]
pub struct Completion {
    pub completion_type: CompletionType,
    pub value: Option<ScriptValue>,
}

impl Completion {
    /// Create a normal completion with no value.
    pub fn normal() -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: None,
        }
    }

    /// Create a normal completion with a value.
    pub fn normal_with_value(value: ScriptValue) -> Self {
        Completion {
            completion_type: CompletionType::Normal,
            value: Some(value),
        }
    }

    /// Create a return completion.
    pub fn return_value(value: ScriptValue) -> Self {
        Completion {
            completion_type: CompletionType::Return,
            value: Some(value),
        }
    }

    pub fn is_return(&self) -> bool {
        self.completion_type == CompletionType::Return
    }

    /// Consume the completion, yielding its value or `undefined`.
    pub fn into_value(self) -> ScriptValue {
        self.value.unwrap_or(ScriptValue::Undefined)
    }
}

/// Result type for statement execution.
pub type EvalResult = Result<Completion, ScriptError>;

/// Result type for expression evaluation.
pub type ValueResult = Result<ScriptValue, ScriptError>;
