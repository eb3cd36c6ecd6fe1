use std::cell::RefCell;
use std::rc::Rc;

use crate::error::UseError;
use crate::event_loop::{AsyncContainer, ExecutionContext, UnaryCallback};
use crate::runner::ds::bindings::{Bindings, BindingsProvider};
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::value::ScriptValue;
use crate::runner::engine::ScriptEngine;
use crate::runner::std_lib::console::console_object;
use crate::runner::std_lib::timing::TimingBindingsProvider;

use super::common_js::CommonJsModule;
use super::resolver::{DependencyResolver, ModuleSource};
use super::use_function::UseFunction;
use super::FILENAME_BINDING;

struct ActiveContext {
    context: ExecutionContext,
    depth: usize,
}

/// Runs module source on an event loop.
///
/// [`initialize`](JsEnvironment::initialize) and
/// [`cleanup`](JsEnvironment::cleanup) must be paired; nested pairs attach to
/// the context that is already active. [`enter`](JsEnvironment::enter) pairs
/// them through a guard.
pub struct JsEnvironment {
    engine: Rc<dyn ScriptEngine>,
    resolver: Rc<DependencyResolver>,
    providers: Vec<Box<dyn BindingsProvider>>,
    active: RefCell<Option<ActiveContext>>,
}

impl JsEnvironment {
    /// An environment with the timing functions installed.
    pub fn new(engine: Rc<dyn ScriptEngine>, resolver: Rc<DependencyResolver>) -> Rc<Self> {
        JsEnvironment::with_providers(engine, resolver, vec![Box::new(TimingBindingsProvider)])
    }

    pub fn with_providers(
        engine: Rc<dyn ScriptEngine>,
        resolver: Rc<DependencyResolver>,
        providers: Vec<Box<dyn BindingsProvider>>,
    ) -> Rc<Self> {
        Rc::new(JsEnvironment {
            engine,
            resolver,
            providers,
            active: RefCell::new(None),
        })
    }

    pub fn engine(&self) -> &Rc<dyn ScriptEngine> {
        &self.engine
    }

    pub fn resolver(&self) -> &Rc<DependencyResolver> {
        &self.resolver
    }

    /// Acquire the execution context, starting a new one if none is active.
    pub fn initialize(&self) -> ExecutionContext {
        let mut active = self.active.borrow_mut();
        match active.as_mut() {
            Some(current) => {
                current.depth += 1;
                debug!(
                    "Attached to execution context {} (depth {})",
                    current.context.id(),
                    current.depth
                );
                current.context.clone()
            }
            None => {
                let context = ExecutionContext::new();
                debug!("Started execution context {}", context.id());
                *active = Some(ActiveContext {
                    context: context.clone(),
                    depth: 1,
                });
                context
            }
        }
    }

    /// Release the execution context acquired by the matching `initialize`.
    ///
    /// The final cleanup discards pending tasks and releases the context's
    /// heap, so values the scripts created no longer reach their scopes.
    pub fn cleanup(&self) -> Result<(), UseError> {
        let released = {
            let mut active = self.active.borrow_mut();
            let current = active
                .as_mut()
                .ok_or_else(|| UseError::LifecycleMisuse("No current context".to_string()))?;
            current.depth -= 1;
            if current.depth > 0 {
                return Ok(());
            }
            active.take()
        };
        if let Some(ActiveContext { context, .. }) = released {
            let discarded = context.event_loop().clear();
            if discarded > 0 {
                warn!(
                    "Discarded {} pending tasks of execution context {}",
                    discarded,
                    context.id()
                );
            }
            context.heap().release();
            debug!("Released execution context {}", context.id());
        }
        Ok(())
    }

    pub fn current_context(&self) -> Option<ExecutionContext> {
        self.active.borrow().as_ref().map(|a| a.context.clone())
    }

    /// Initialize, returning a guard that cleans up when dropped.
    pub fn enter(self: &Rc<Self>) -> EnvironmentGuard {
        let context = self.initialize();
        EnvironmentGuard {
            environment: self.clone(),
            context,
        }
    }

    /// Run a module, returning a container for its result.
    pub fn run_script(
        self: &Rc<Self>,
        context: &ExecutionContext,
        source: ModuleSource,
        global_bindings: Bindings,
        arguments: Bindings,
    ) -> Result<AsyncContainer, UseError> {
        let container = AsyncContainer::new();
        self.run_script_with(
            context,
            source,
            global_bindings,
            arguments,
            container.completion_callback(),
        )?;
        Ok(container)
    }

    /// Run a module, delivering its result to `callback`.
    ///
    /// The module runs as a task. Called outside of a task this drains the
    /// queue before returning; from inside a task it only enqueues.
    pub fn run_script_with(
        self: &Rc<Self>,
        context: &ExecutionContext,
        source: ModuleSource,
        global_bindings: Bindings,
        arguments: Bindings,
        callback: UnaryCallback,
    ) -> Result<(), UseError> {
        let environment = self.clone();
        let task_context = context.clone();
        context.schedule(move || {
            environment.evaluate(&task_context, source, global_bindings, arguments, callback)
        })
    }

    fn evaluate(
        self: &Rc<Self>,
        context: &ExecutionContext,
        source: ModuleSource,
        global_bindings: Bindings,
        arguments: Bindings,
        callback: UnaryCallback,
    ) -> Result<(), UseError> {
        debug!("Evaluating {}", source.name);
        let module = CommonJsModule::new();
        let bindings = self.build_bindings(context, &source, global_bindings, arguments, &module);
        let result = self
            .eval_source(&source, &bindings)
            .map_err(|e| UseError::from_script(&source.name, e))?;
        let result = if result.is_nullish() && module.is_modified() {
            module.exports()
        } else {
            result
        };
        match result {
            ScriptValue::Async(container) => container.add_listener(callback),
            value => callback(value),
        }
    }

    fn eval_source(&self, source: &ModuleSource, bindings: &Bindings) -> Result<ScriptValue, ScriptError> {
        match self.engine.compilable() {
            Some(compiler) => compiler.compile(&source.name, &source.content)?.eval(bindings),
            None => self.engine.eval(&source.name, &source.content, bindings),
        }
    }

    /// Host globals, then provider bindings, then the module's own names.
    fn build_bindings(
        self: &Rc<Self>,
        context: &ExecutionContext,
        source: &ModuleSource,
        global_bindings: Bindings,
        arguments: Bindings,
        module: &CommonJsModule,
    ) -> Bindings {
        let mut script_globals = global_bindings;
        script_globals.put(FILENAME_BINDING, source.name.as_str());

        let mut bindings = script_globals.clone();
        for provider in &self.providers {
            bindings.extend(&provider.provide(context));
        }
        bindings.put("module", module.module_value());
        bindings.put("exports", module.exports_value());
        bindings.put("console", console_object(&source.name));
        let use_function = UseFunction::new(self, context, script_globals, &arguments);
        bindings.put("use", Rc::new(use_function).into_script_value());
        bindings.set_heap(context.heap());
        bindings
    }
}

/// Keeps the execution context acquired until dropped.
pub struct EnvironmentGuard {
    environment: Rc<JsEnvironment>,
    context: ExecutionContext,
}

impl EnvironmentGuard {
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }
}

impl Drop for EnvironmentGuard {
    fn drop(&mut self) {
        if let Err(e) = self.environment.cleanup() {
            error!("Failed to clean up execution context {}: {}", self.context.id(), e);
        }
    }
}
