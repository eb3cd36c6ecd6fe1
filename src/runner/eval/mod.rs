//! Evaluation module for executing the script AST.
//!
//! This module contains the tree-walking evaluator behind the script engine.

pub mod types;
pub mod expression;
pub mod statement;
pub mod function;

pub use types::{Completion, CompletionType, EvalResult, ValueResult};
