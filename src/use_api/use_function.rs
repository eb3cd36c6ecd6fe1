use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::UseError;
use crate::event_loop::{AsyncContainer, ExecutionContext, LoopHandle};
use crate::runner::ds::bindings::Bindings;
use crate::runner::ds::function::FunctionObject;
use crate::runner::ds::value::ScriptValue;
use crate::runner::eval::function::call_function;

use super::environment::JsEnvironment;
use super::resolver::ModuleSource;
use super::FILENAME_BINDING;

/// The `use` function installed into every script.
///
/// `use(callback)` runs the callback on the next turn of the event loop.
/// `use(dependency, callback)` and `use([dependencies], callback)` load each
/// dependency as a module and call the callback with their results, in the
/// order they were requested. Either form returns a container resolved with
/// the callback's return value.
pub struct UseFunction {
    environment: Weak<JsEnvironment>,
    handle: LoopHandle,
    global_bindings: Bindings,
    this_object: ScriptValue,
}

impl UseFunction {
    pub fn new(
        environment: &Rc<JsEnvironment>,
        context: &ExecutionContext,
        global_bindings: Bindings,
        arguments: &Bindings,
    ) -> Self {
        UseFunction {
            environment: Rc::downgrade(environment),
            handle: context.handle(),
            global_bindings,
            this_object: arguments.to_object(),
        }
    }

    pub fn into_script_value(self: Rc<Self>) -> ScriptValue {
        ScriptValue::native_function("use", move |_this, args| {
            Ok(ScriptValue::Async(self.call(args)?))
        })
    }

    pub fn call(&self, args: Vec<ScriptValue>) -> Result<AsyncContainer, UseError> {
        let mut args = args.into_iter();
        let (callback, dependencies) = match (args.next(), args.next()) {
            (None, _) => {
                return Err(UseError::InvalidArguments(
                    "Not enough arguments for use".to_string(),
                ))
            }
            (Some(callback), None) => (decode_callback(callback)?, vec![]),
            (Some(dependencies), Some(callback)) => {
                (decode_callback(callback)?, decode_dependencies(&dependencies))
            }
        };
        if dependencies.is_empty() {
            self.call_immediate(callback)
        } else {
            self.load_dependencies(dependencies, callback)
        }
    }

    fn context(&self) -> Result<ExecutionContext, UseError> {
        self.handle
            .upgrade()
            .ok_or_else(|| UseError::LifecycleMisuse("No current context".to_string()))
    }

    fn script_name(&self) -> String {
        self.global_bindings
            .get_str(FILENAME_BINDING)
            .unwrap_or_default()
    }

    fn call_immediate(&self, callback: Rc<FunctionObject>) -> Result<AsyncContainer, UseError> {
        let container = AsyncContainer::new();
        let result = container.clone();
        let this_object = self.this_object.clone();
        let script_name = self.script_name();
        self.context()?.schedule(move || {
            let value = call_function(&callback, this_object, vec![])
                .map_err(|e| UseError::from_script(&script_name, e))?;
            result.complete(value)
        })?;
        Ok(container)
    }

    fn load_dependencies(
        &self,
        dependencies: Vec<String>,
        callback: Rc<FunctionObject>,
    ) -> Result<AsyncContainer, UseError> {
        let environment = self
            .environment
            .upgrade()
            .ok_or_else(|| UseError::LifecycleMisuse("Environment is gone".to_string()))?;
        let context = self.context()?;
        let resolver = environment.resolver();
        let lookup = resolver.lookup_context(&self.global_bindings);
        let sources = dependencies
            .iter()
            .map(|dependency| resolver.resolve(&lookup, dependency))
            .collect::<Result<Vec<ModuleSource>, UseError>>()?;

        let container = AsyncContainer::new();
        let slots = Rc::new(RefCell::new(vec![ScriptValue::Undefined; sources.len()]));
        let remaining = Rc::new(Cell::new(sources.len()));
        let script_name = self.script_name();
        for (index, source) in sources.into_iter().enumerate() {
            let mut bindings = self.global_bindings.clone();
            bindings.put(FILENAME_BINDING, source.name.as_str());
            let slots = slots.clone();
            let remaining = remaining.clone();
            let container = container.clone();
            let callback = callback.clone();
            let this_object = self.this_object.clone();
            let script_name = script_name.clone();
            environment.run_script_with(
                &context,
                source,
                bindings,
                Bindings::new(),
                Box::new(move |value| {
                    slots.borrow_mut()[index] = value;
                    remaining.set(remaining.get() - 1);
                    if remaining.get() > 0 {
                        return Ok(());
                    }
                    let results = std::mem::take(&mut *slots.borrow_mut());
                    let value = call_function(&callback, this_object, results)
                        .map_err(|e| UseError::from_script(&script_name, e))?;
                    container.complete(value)
                }),
            )?;
        }
        Ok(container)
    }
}

fn decode_callback(value: ScriptValue) -> Result<Rc<FunctionObject>, UseError> {
    match value {
        ScriptValue::Function(function) => Ok(function),
        _ => Err(UseError::InvalidArguments(
            "No callback argument supplied".to_string(),
        )),
    }
}

fn decode_dependencies(value: &ScriptValue) -> Vec<String> {
    match value {
        ScriptValue::List(items) => items.borrow().iter().map(|v| v.to_js_string()).collect(),
        other => vec![other.to_js_string()],
    }
}
