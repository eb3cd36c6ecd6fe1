//! Console built-in object.
//!
//! Provides console.log, info, warn, error, debug and trace. Output goes
//! through the `log` facade with the script name as the log target.

use log::Level;

use crate::runner::ds::object::ObjectData;
use crate::runner::ds::value::ScriptValue;

/// Build the console object for the script `script_name`.
pub fn console_object(script_name: &str) -> ScriptValue {
    let mut console = ObjectData::new();
    for (method, level) in [
        ("log", Level::Info),
        ("info", Level::Info),
        ("warn", Level::Warn),
        ("error", Level::Error),
        ("debug", Level::Debug),
        ("trace", Level::Trace),
    ] {
        let target = script_name.to_string();
        console.set(
            method,
            ScriptValue::native_function(method, move |_this, args| {
                log::log!(target: target.as_str(), level, "{}", format_args(&args));
                Ok(ScriptValue::Undefined)
            }),
        );
    }
    ScriptValue::from_object(console)
}

/// Format a ScriptValue for console output.
fn format_value(value: &ScriptValue) -> String {
    match value {
        ScriptValue::String(s) => s.clone(),
        ScriptValue::List(_) | ScriptValue::Object(_) => value.to_json().to_string(),
        other => other.to_js_string(),
    }
}

/// Format all arguments for console output.
fn format_args(args: &[ScriptValue]) -> String {
    args.iter()
        .map(format_value)
        .collect::<Vec<_>>()
        .join(" ")
}
