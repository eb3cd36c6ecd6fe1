//! The script engine: value model, evaluator and built-ins.

pub mod ds;
pub mod engine;
pub mod eval;
pub mod std_lib;
