//! List built-in members.
//!
//! Methods are returned bound to the list they were read from.

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::{ListRef, ScriptValue};
use crate::runner::eval::expression::MAX_LIST_LENGTH;
use crate::runner::eval::function::call_value;

/// Look up a list method by name.
pub fn get_method(list: &ListRef, name: &str) -> Option<ScriptValue> {
    let list = list.clone();
    let method = match name {
        "push" => ScriptValue::native_function("push", move |_this, args| array_push(&list, args)),
        "join" => ScriptValue::native_function("join", move |_this, args| array_join(&list, args)),
        "map" => ScriptValue::native_function("map", move |_this, args| array_map(&list, args)),
        "forEach" => {
            ScriptValue::native_function("forEach", move |_this, args| array_for_each(&list, args))
        }
        "indexOf" => {
            ScriptValue::native_function("indexOf", move |_this, args| array_index_of(&list, args))
        }
        _ => return None,
    };
    Some(method)
}

/// Array.prototype.push
fn array_push(list: &ListRef, args: Vec<ScriptValue>) -> Result<ScriptValue, ScriptError> {
    let mut items = list.borrow_mut();
    if items.len() + args.len() > MAX_LIST_LENGTH {
        return Err(ScriptError::Thrown("RangeError: Invalid array length".to_string()));
    }
    items.extend(args);
    Ok(ScriptValue::Number(items.len() as f64))
}

/// Array.prototype.join
fn array_join(list: &ListRef, args: Vec<ScriptValue>) -> Result<ScriptValue, ScriptError> {
    let separator = match args.first() {
        None | Some(ScriptValue::Undefined) => ",".to_string(),
        Some(separator) => separator.to_js_string(),
    };
    let joined = list
        .borrow()
        .iter()
        .map(|item| {
            if item.is_nullish() {
                String::new()
            } else {
                item.to_js_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&separator);
    Ok(ScriptValue::String(joined))
}

/// Array.prototype.map
fn array_map(list: &ListRef, args: Vec<ScriptValue>) -> Result<ScriptValue, ScriptError> {
    let callback = args.first().cloned().unwrap_or(ScriptValue::Undefined);
    // Snapshot so the callback may mutate the list.
    let items = list.borrow().clone();
    let mut mapped = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        mapped.push(call_value(
            &callback,
            "map callback",
            ScriptValue::Undefined,
            vec![item, ScriptValue::Number(index as f64), ScriptValue::List(list.clone())],
        )?);
    }
    Ok(ScriptValue::new_list(mapped))
}

/// Array.prototype.forEach
fn array_for_each(list: &ListRef, args: Vec<ScriptValue>) -> Result<ScriptValue, ScriptError> {
    let callback = args.first().cloned().unwrap_or(ScriptValue::Undefined);
    let items = list.borrow().clone();
    for (index, item) in items.into_iter().enumerate() {
        call_value(
            &callback,
            "forEach callback",
            ScriptValue::Undefined,
            vec![item, ScriptValue::Number(index as f64), ScriptValue::List(list.clone())],
        )?;
    }
    Ok(ScriptValue::Undefined)
}

/// Array.prototype.indexOf
fn array_index_of(list: &ListRef, args: Vec<ScriptValue>) -> Result<ScriptValue, ScriptError> {
    let needle = args.first().cloned().unwrap_or(ScriptValue::Undefined);
    let position = list.borrow().iter().position(|item| item.strict_equals(&needle));
    Ok(ScriptValue::Number(position.map_or(-1.0, |p| p as f64)))
}
