//! Function creation and calls.

use std::rc::Rc;

use crate::parser::ast::{FunctionBodyData, FunctionData};
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::function::{FunctionKind, FunctionObject};
use crate::runner::ds::scope::Scope;
use crate::runner::ds::value::ScriptValue;

use super::expression::evaluate_expression;
use super::statement::execute_statements;
use super::types::ValueResult;

/// Create a closure over `scope`.
pub fn create_function(data: &Rc<FunctionData>, scope: &Rc<Scope>) -> ScriptValue {
    ScriptValue::Function(Rc::new(FunctionObject {
        name: data.name.clone().unwrap_or_default(),
        kind: FunctionKind::Script {
            data: data.clone(),
            scope: scope.clone(),
        },
    }))
}

/// Call a function with the given `this` and arguments.
pub fn call_function(
    function: &FunctionObject,
    this_value: ScriptValue,
    args: Vec<ScriptValue>,
) -> ValueResult {
    match &function.kind {
        FunctionKind::Native(native) => native(this_value, args),
        FunctionKind::Script { data, scope } => {
            let _guard = scope.heap().enter_call()?;
            let this = if data.is_arrow { None } else { Some(this_value) };
            let local = Scope::function(scope, this);
            for (index, param) in data.params.iter().enumerate() {
                let value = args.get(index).cloned().unwrap_or(ScriptValue::Undefined);
                local.declare(param, value, false);
            }
            if !data.is_arrow {
                local.declare("arguments", ScriptValue::new_list(args), false);
            }
            match &data.body {
                FunctionBodyData::Block(statements) => {
                    Ok(execute_statements(statements, &local)?.into_value())
                }
                FunctionBodyData::Expression(expression) => evaluate_expression(expression, &local),
            }
        }
    }
}

/// Call `value` if it is a function, otherwise fail with a type error
/// naming `description`.
pub fn call_value(
    value: &ScriptValue,
    description: &str,
    this_value: ScriptValue,
    args: Vec<ScriptValue>,
) -> ValueResult {
    match value {
        ScriptValue::Function(function) => call_function(function, this_value, args),
        _ => Err(ScriptError::Type(format!("{} is not a function", description))),
    }
}
