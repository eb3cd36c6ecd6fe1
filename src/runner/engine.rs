//! Script engines and the registry that hands them out by name.
//!
//! An engine evaluates source against a set of [`Bindings`]. Engines that can
//! also [`Compilable::compile`] source ahead of evaluation expose that through
//! [`ScriptEngine::compilable`].

use std::rc::Rc;

use indexmap::IndexMap;

use crate::parser::ast::ProgramData;
use crate::parser::{describe_parse_error, ScriptParser};
use crate::runner::ds::bindings::Bindings;
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::heap::Heap;
use crate::runner::ds::scope::Scope;
use crate::runner::ds::value::ScriptValue;
use crate::runner::eval::statement::run_program;

pub trait ScriptEngine {
    fn name(&self) -> &str;

    /// Parse and evaluate `source` in one step.
    fn eval(&self, script_name: &str, source: &str, bindings: &Bindings)
        -> Result<ScriptValue, ScriptError>;

    fn compilable(&self) -> Option<&dyn Compilable> {
        None
    }
}

pub trait Compilable {
    fn compile(&self, script_name: &str, source: &str) -> Result<Box<dyn CompiledScript>, ScriptError>;
}

pub trait CompiledScript {
    fn eval(&self, bindings: &Bindings) -> Result<ScriptValue, ScriptError>;
}

/// The JavaScript subset engine.
#[derive(Default)]
pub struct JsEngine;

impl JsEngine {
    pub fn new() -> Self {
        JsEngine
    }

    fn parse(script_name: &str, source: &str) -> Result<ProgramData, ScriptError> {
        ScriptParser::parse_to_ast(source).map_err(|e| {
            ScriptError::Syntax(format!("{} in {}", describe_parse_error(&e), script_name))
        })
    }
}

impl ScriptEngine for JsEngine {
    fn name(&self) -> &str {
        "js"
    }

    fn eval(
        &self,
        script_name: &str,
        source: &str,
        bindings: &Bindings,
    ) -> Result<ScriptValue, ScriptError> {
        self.compile(script_name, source)?.eval(bindings)
    }

    fn compilable(&self) -> Option<&dyn Compilable> {
        Some(self)
    }
}

impl Compilable for JsEngine {
    fn compile(&self, script_name: &str, source: &str) -> Result<Box<dyn CompiledScript>, ScriptError> {
        let program = JsEngine::parse(script_name, source)?;
        Ok(Box::new(CompiledProgram {
            program: Rc::new(program),
        }))
    }
}

struct CompiledProgram {
    program: Rc<ProgramData>,
}

impl CompiledScript for CompiledProgram {
    /// Run on the heap named by `bindings`. Without one the program gets a
    /// heap of its own, released as soon as it finishes.
    fn eval(&self, bindings: &Bindings) -> Result<ScriptValue, ScriptError> {
        match bindings.heap() {
            Some(heap) => run_program(&self.program, &Scope::root(bindings.clone(), heap)),
            None => {
                let heap = Heap::new();
                let result = run_program(&self.program, &Scope::root(bindings.clone(), &heap));
                heap.release();
                result
            }
        }
    }
}

pub type EngineFactory = Box<dyn Fn() -> Rc<dyn ScriptEngine>>;

/// Maps engine names to factories.
pub struct EngineManager {
    factories: IndexMap<String, EngineFactory>,
}

impl EngineManager {
    /// A manager with no engines registered.
    pub fn empty() -> Self {
        EngineManager {
            factories: IndexMap::new(),
        }
    }

    /// A manager offering [`JsEngine`] as `js` and `javascript`.
    pub fn new() -> Self {
        let mut manager = EngineManager::empty();
        manager.register("js", || Rc::new(JsEngine::new()) as Rc<dyn ScriptEngine>);
        manager.register("javascript", || Rc::new(JsEngine::new()) as Rc<dyn ScriptEngine>);
        manager
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Rc<dyn ScriptEngine> + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn engine_by_name(&self, name: &str) -> Option<Rc<dyn ScriptEngine>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.factories.keys()
    }
}

impl Default for EngineManager {
    fn default() -> Self {
        EngineManager::new()
    }
}
