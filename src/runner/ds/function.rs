use std::rc::Rc;

use crate::parser::ast::FunctionData;
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::scope::Scope;
use crate::runner::ds::value::ScriptValue;

/// Host function callable from scripts: `(this, arguments) -> value`.
pub type NativeFunction = Rc<dyn Fn(ScriptValue, Vec<ScriptValue>) -> Result<ScriptValue, ScriptError>>;

pub enum FunctionKind {
    /// A closure defined in script source, together with its defining scope.
    Script { data: Rc<FunctionData>, scope: Rc<Scope> },
    Native(NativeFunction),
}

pub struct FunctionObject {
    pub name: String,
    pub kind: FunctionKind,
}
