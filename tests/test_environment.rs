//! Tests for running modules in the execution environment.

extern crate js_use;

use std::cell::Cell;
use std::rc::Rc;

use js_use::event_loop::ExecutionContext;
use js_use::resource::InMemoryRepository;
use js_use::runner::ds::bindings::{Bindings, BindingsProvider};
use js_use::runner::engine::{JsEngine, ScriptEngine};
use js_use::use_api::{adapt_value, DependencyResolver, JsEnvironment, ModuleSource};
use js_use::{ScriptError, ScriptValue, UseError};
use serde_json::json;

fn environment(repository: InMemoryRepository) -> Rc<JsEnvironment> {
    JsEnvironment::new(
        Rc::new(JsEngine::new()),
        Rc::new(DependencyResolver::new(Rc::new(repository))),
    )
}

/// Run `content` as the module `name` and unwrap its result.
fn run_module(
    environment: &Rc<JsEnvironment>,
    name: &str,
    content: &str,
    globals: Bindings,
    arguments: Bindings,
) -> Result<ScriptValue, UseError> {
    let guard = environment.enter();
    let container = environment.run_script(
        guard.context(),
        ModuleSource::new(name, content),
        globals,
        arguments,
    )?;
    adapt_value(name, ScriptValue::Async(container))
}

fn run_json(content: &str) -> serde_json::Value {
    let environment = environment(InMemoryRepository::new(&["/apps"]));
    match run_module(&environment, "/apps/test.js", content, Bindings::new(), Bindings::new()) {
        Ok(value) => value.to_json(),
        Err(e) => panic!("module failed: {}", e),
    }
}

#[test]
fn test_exports_become_result() {
    assert_eq!(run_json("exports.x = 1;"), json!({"x": 1}));
    assert_eq!(run_json("module.exports = { a: 1 };"), json!({"a": 1}));
    assert_eq!(run_json("module.exports = 'text';"), json!("text"));
}

#[test]
fn test_explicit_result_wins_over_exports() {
    assert_eq!(run_json("exports.x = 1; 'explicit'"), json!("explicit"));
}

#[test]
fn test_no_result_is_undefined() {
    let environment = environment(InMemoryRepository::new(&["/apps"]));
    let value = run_module(
        &environment,
        "/apps/test.js",
        "var nothing = 1;",
        Bindings::new(),
        Bindings::new(),
    )
    .unwrap();
    assert!(matches!(value, ScriptValue::Undefined));
}

#[test]
fn test_syntax_error_names_script() {
    let environment = environment(InMemoryRepository::new(&["/apps"]));
    let result = run_module(
        &environment,
        "/apps/bad.js",
        "var = ;",
        Bindings::new(),
        Bindings::new(),
    );
    match result {
        Err(UseError::ScriptEvaluation { script, source }) => {
            assert_eq!(script, "/apps/bad.js");
            assert!(matches!(source, ScriptError::Syntax(_)));
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_use_errors_keep_their_kind() {
    let environment = environment(InMemoryRepository::new(&["/apps"]));
    let result = run_module(&environment, "/apps/test.js", "use()", Bindings::new(), Bindings::new());
    assert!(matches!(result, Err(UseError::InvalidArguments(_))));
}

#[test]
fn test_cleanup_without_initialize() {
    let environment = environment(InMemoryRepository::new(&["/apps"]));
    match environment.cleanup() {
        Err(e @ UseError::LifecycleMisuse(_)) => assert_eq!(e.to_string(), "No current context"),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_nested_initialize_shares_context() {
    let environment = environment(InMemoryRepository::new(&["/apps"]));
    let outer = environment.initialize();
    let inner = environment.initialize();
    assert_eq!(outer.id(), inner.id());

    environment.cleanup().unwrap();
    assert!(environment.current_context().is_some());
    environment.cleanup().unwrap();
    assert!(environment.current_context().is_none());
    assert!(environment.cleanup().is_err());

    let fresh = environment.initialize();
    assert_ne!(fresh.id(), outer.id());
    environment.cleanup().unwrap();
}

#[test]
fn test_guard_releases_context() {
    let environment = environment(InMemoryRepository::new(&["/apps"]));
    {
        let guard = environment.enter();
        let current = environment.current_context().unwrap();
        assert_eq!(current.id(), guard.context().id());
    }
    assert!(environment.current_context().is_none());
}

struct CountingEngine {
    inner: JsEngine,
    evaluations: Rc<Cell<usize>>,
}

impl ScriptEngine for CountingEngine {
    fn name(&self) -> &str {
        "counting"
    }

    fn eval(&self, script_name: &str, source: &str, bindings: &Bindings) -> Result<ScriptValue, ScriptError> {
        self.evaluations.set(self.evaluations.get() + 1);
        self.inner.eval(script_name, source, bindings)
    }
}

#[test]
fn test_engine_without_compilation() {
    let mut repository = InMemoryRepository::new(&["/apps"]);
    repository
        .add_script("/apps/site/page.js", "")
        .add_script("/apps/site/util.js", "exports.v = 'util';");
    let evaluations = Rc::new(Cell::new(0));
    let engine = CountingEngine {
        inner: JsEngine::new(),
        evaluations: evaluations.clone(),
    };
    let environment = JsEnvironment::new(
        Rc::new(engine),
        Rc::new(DependencyResolver::new(Rc::new(repository))),
    );
    let value = run_module(
        &environment,
        "/apps/site/page.js",
        "use('util.js', function (u) { return u.v; })",
        Bindings::new(),
        Bindings::new(),
    )
    .unwrap();
    assert_eq!(value.to_js_string(), "util");
    assert_eq!(evaluations.get(), 2);
}

#[test]
fn test_console_is_available() {
    assert_eq!(run_json("console.log('hi', 1); console.warn({ a: 1 }); 'ok'"), json!("ok"));
}

#[test]
fn test_set_immediate_runs_after_current_task() {
    let code = "
        var order = [];
        setImmediate(function () { order.push('timer'); });
        order.push('sync');
        module.exports = order;
    ";
    assert_eq!(run_json(code), json!(["sync", "timer"]));
}

#[test]
fn test_set_timeout_passes_arguments() {
    let code = "
        var box = {};
        setTimeout(function (a, b) { box.sum = a + b; }, 10, 2, 3);
        module.exports = box;
    ";
    assert_eq!(run_json(code), json!({"sum": 5}));
}

#[test]
fn test_arguments_become_this_of_use_callback() {
    let environment = environment(InMemoryRepository::new(&["/apps"]));
    let mut arguments = Bindings::new();
    arguments.put("name", "x");
    let value = run_module(
        &environment,
        "/apps/test.js",
        "use(function () { return this.name; })",
        Bindings::new(),
        arguments,
    )
    .unwrap();
    assert_eq!(value.to_js_string(), "x");
}

#[test]
fn test_host_globals_visible() {
    let environment = environment(InMemoryRepository::new(&["/apps"]));
    let mut globals = Bindings::new();
    globals.put("site", "Demo");
    let value = run_module(
        &environment,
        "/apps/test.js",
        "site + ' ' + typeof module + ' ' + typeof use",
        globals,
        Bindings::new(),
    )
    .unwrap();
    assert_eq!(value.to_js_string(), "Demo object function");
}

struct AnswerProvider;

impl BindingsProvider for AnswerProvider {
    fn name(&self) -> &str {
        "answer"
    }

    fn provide(&self, _context: &ExecutionContext) -> Bindings {
        let mut bindings = Bindings::new();
        bindings.put("answer", 42.0);
        bindings
    }
}

#[test]
fn test_custom_bindings_provider() {
    let environment = JsEnvironment::with_providers(
        Rc::new(JsEngine::new()),
        Rc::new(DependencyResolver::new(Rc::new(InMemoryRepository::new(&["/apps"])))),
        vec![Box::new(AnswerProvider)],
    );
    let value = run_module(
        &environment,
        "/apps/test.js",
        "[answer, typeof setImmediate]",
        Bindings::new(),
        Bindings::new(),
    )
    .unwrap();
    assert_eq!(value.to_json(), json!([42, "undefined"]));
}
