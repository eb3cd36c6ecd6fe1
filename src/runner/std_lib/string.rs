//! String built-in members.

use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::ScriptValue;

/// Look up a string method by name, bound to `s`.
pub fn get_method(s: &str, name: &str) -> Option<ScriptValue> {
    let s = s.to_string();
    let method = match name {
        "toUpperCase" => ScriptValue::native_function("toUpperCase", move |_this, _args| {
            Ok(ScriptValue::String(s.to_uppercase()))
        }),
        "toLowerCase" => ScriptValue::native_function("toLowerCase", move |_this, _args| {
            Ok(ScriptValue::String(s.to_lowercase()))
        }),
        "trim" => ScriptValue::native_function("trim", move |_this, _args| {
            Ok(ScriptValue::String(s.trim().to_string()))
        }),
        "indexOf" => {
            ScriptValue::native_function("indexOf", move |_this, args| string_index_of(&s, args))
        }
        _ => return None,
    };
    Some(method)
}

/// String.prototype.indexOf, counting in characters.
fn string_index_of(s: &str, args: Vec<ScriptValue>) -> Result<ScriptValue, ScriptError> {
    let needle = match args.first() {
        Some(value) => value.to_js_string(),
        None => return Ok(ScriptValue::Number(-1.0)),
    };
    let position = s
        .find(&needle)
        .map_or(-1.0, |byte_index| s[..byte_index].chars().count() as f64);
    Ok(ScriptValue::Number(position))
}
