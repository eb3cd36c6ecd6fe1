mod api;
pub mod ast;

pub use api::{describe_parse_error, Rule, ScriptParser};
