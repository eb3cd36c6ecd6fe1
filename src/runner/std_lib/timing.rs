//! `setImmediate` and `setTimeout`.
//!
//! Both schedule the callback as a task on the event loop of the running
//! script. The queue has no clock, so timeout delays are not honoured.

use crate::error::UseError;
use crate::event_loop::{ExecutionContext, LoopHandle};
use crate::runner::ds::bindings::{Bindings, BindingsProvider};
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::ScriptValue;
use crate::runner::eval::function::call_value;

pub struct TimingBindingsProvider;

impl BindingsProvider for TimingBindingsProvider {
    fn name(&self) -> &str {
        "timing"
    }

    fn provide(&self, context: &ExecutionContext) -> Bindings {
        let mut bindings = Bindings::new();
        let handle = context.handle();
        bindings.put_lazy("setImmediate", move || timer_function("setImmediate", handle.clone(), 1));
        let handle = context.handle();
        bindings.put_lazy("setTimeout", move || timer_function("setTimeout", handle.clone(), 2));
        bindings
    }
}

/// `name(callback, <skipped arguments>, ...callbackArguments)`
fn timer_function(name: &'static str, handle: LoopHandle, arguments_from: usize) -> ScriptValue {
    ScriptValue::native_function(name, move |_this, args| {
        let callback = match args.first() {
            Some(callback @ ScriptValue::Function(_)) => callback.clone(),
            _ => {
                return Err(ScriptError::Type(format!(
                    "{} requires a function argument",
                    name
                )))
            }
        };
        let callback_args: Vec<ScriptValue> = args.into_iter().skip(arguments_from).collect();
        handle.schedule(move || {
            call_value(&callback, name, ScriptValue::Undefined, callback_args)
                .map(|_| ())
                .map_err(|e| UseError::from_script(name, e))
        })?;
        Ok(ScriptValue::Undefined)
    })
}
