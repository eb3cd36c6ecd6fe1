//! Tests for the JavaScript subset engine.
//!
//! These run source through `JsEngine` and check the program result,
//! covering the grammar, operators, functions and built-in members.

extern crate js_use;

use std::cell::Cell;
use std::rc::Rc;

use js_use::runner::ds::bindings::Bindings;
use js_use::runner::engine::{Compilable, CompiledScript, JsEngine, ScriptEngine};
use js_use::{ScriptError, ScriptValue};
use serde_json::json;

/// Helper to run code with no bindings.
fn run_js(code: &str) -> Result<ScriptValue, ScriptError> {
    JsEngine::new().eval("test.js", code, &Bindings::new())
}

/// Helper to run code that must succeed, returning its JSON view.
fn eval_json(code: &str) -> serde_json::Value {
    match run_js(code) {
        Ok(value) => value.to_json(),
        Err(e) => panic!("script failed: {}", e),
    }
}

#[test]
fn test_operator_precedence() {
    assert_eq!(eval_json("1 + 2 * 3"), json!(7));
    assert_eq!(eval_json("(1 + 2) * 3"), json!(9));
    assert_eq!(eval_json("10 - 4 - 3"), json!(3));
    assert_eq!(eval_json("7 % 4 * -1"), json!(-3));
    assert_eq!(eval_json("1 < 2 && 2 < 3"), json!(true));
}

#[test]
fn test_string_concatenation_and_members() {
    assert_eq!(eval_json("'a' + 1"), json!("a1"));
    assert_eq!(eval_json("'Hi'.toUpperCase() + ' ' + '  x '.trim()"), json!("HI x"));
    assert_eq!(eval_json("'hello'.length"), json!(5));
    assert_eq!(eval_json("'hello'.indexOf('ll')"), json!(2));
    assert_eq!(eval_json("'abc'[1]"), json!("b"));
}

#[test]
fn test_equality() {
    assert_eq!(eval_json("1 == '1'"), json!(true));
    assert_eq!(eval_json("1 === '1'"), json!(false));
    assert_eq!(eval_json("null == undefined"), json!(true));
    assert_eq!(eval_json("null === undefined"), json!(false));
    assert_eq!(eval_json("'a' !== 'b'"), json!(true));
}

#[test]
fn test_logical_and_conditional() {
    assert_eq!(eval_json("0 || 'x'"), json!("x"));
    assert_eq!(eval_json("1 && 2"), json!(2));
    assert_eq!(eval_json("!''"), json!(true));
    assert_eq!(eval_json("3 > 2 ? 'yes' : 'no'"), json!("yes"));
}

#[test]
fn test_closures() {
    let code = "
        function counter() {
            var count = 0;
            return function () {
                count += 1;
                return count;
            };
        }
        var next = counter();
        next();
        next();
        next()
    ";
    assert_eq!(eval_json(code), json!(3));
}

#[test]
fn test_recursion_and_hoisting() {
    let code = "
        var result = factorial(10);
        function factorial(n) {
            if (n <= 1) {
                return 1;
            }
            return n * factorial(n - 1);
        }
        result
    ";
    assert_eq!(eval_json(code), json!(3628800));
}

#[test]
fn test_runaway_recursion_is_caught() {
    let result = run_js("function f() { return f(); } f()");
    assert!(matches!(result, Err(ScriptError::Thrown(_))));
}

#[test]
fn test_method_this_and_arrow_this() {
    let code = "
        var box = {
            n: 2,
            get: function () { return this.n; },
            later: function () { var f = () => this.n * 10; return f(); }
        };
        [box.get(), box.later()]
    ";
    assert_eq!(eval_json(code), json!([2, 20]));
}

#[test]
fn test_list_members() {
    assert_eq!(eval_json("[1, 2, 3].map(x => x * 2).join('-')"), json!("2-4-6"));
    assert_eq!(eval_json("var l = [1]; l.push(2, 3); l"), json!([1, 2, 3]));
    assert_eq!(eval_json("['a', 'b'].indexOf('b')"), json!(1));
    assert_eq!(eval_json("[].indexOf(1)"), json!(-1));
    let code = "var total = 0; [1, 2, 3].forEach(function (x, i) { total += x * i; }); total";
    assert_eq!(eval_json(code), json!(8));
    assert_eq!(eval_json("var l = []; l[2] = 'z'; l.length"), json!(3));
}

#[test]
fn test_huge_list_index_is_range_error() {
    match run_js("var a = []; a[4294967294] = 1; a.length") {
        Err(ScriptError::Thrown(message)) => assert!(message.starts_with("RangeError")),
        other => panic!("unexpected result {:?}", other),
    }
    // Writes inside the current length are unaffected.
    assert_eq!(eval_json("var a = [1, 2]; a[1] = 5; a"), json!([1, 5]));
}

#[test]
fn test_object_literals() {
    let code = "var k = 'a'; var o = { k, 'b': 2, nested: { deep: true } }; o['b'] + o.k.length";
    assert_eq!(eval_json(code), json!(3));
    assert_eq!(eval_json("var o = { x: 1 }; o.y = [o.x]; o"), json!({"x": 1, "y": [1]}));
}

#[test]
fn test_program_result_rules() {
    assert_eq!(eval_json("if (true) { return 'early'; } 'late'"), json!("early"));
    assert!(run_js("var x; x = 5").unwrap().is_nullish());
    assert!(run_js("var y = 1;").unwrap().is_nullish());
    assert_eq!(eval_json("var a = 1 // comment\nvar b = 2\na + b"), json!(3));
}

#[test]
fn test_typeof() {
    assert_eq!(eval_json("typeof undeclared"), json!("undefined"));
    assert_eq!(eval_json("typeof function () {}"), json!("function"));
    assert_eq!(eval_json("typeof null"), json!("object"));
    assert_eq!(eval_json("typeof 'x' + typeof 1"), json!("stringnumber"));
}

#[test]
fn test_errors() {
    assert!(matches!(run_js("missing + 1"), Err(ScriptError::Reference(_))));
    assert!(matches!(run_js("var o = {}; o.x.y"), Err(ScriptError::Type(_))));
    assert!(matches!(run_js("var n = 1; n()"), Err(ScriptError::Type(_))));
    assert!(matches!(run_js("const c = 1; c = 2"), Err(ScriptError::Type(_))));
    assert!(matches!(run_js("var = ;"), Err(ScriptError::Syntax(_))));
    match run_js("throw 'boom'") {
        Err(ScriptError::Thrown(message)) => assert_eq!(message, "boom"),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_bindings_and_lazy_values() {
    let realized = Rc::new(Cell::new(0));
    let counter = realized.clone();
    let mut bindings = Bindings::new();
    bindings.put("greeting", "Hello");
    bindings.put_lazy("name", move || {
        counter.set(counter.get() + 1);
        ScriptValue::from("world")
    });
    let result = JsEngine::new()
        .eval("test.js", "greeting + ', ' + name + '/' + name", &bindings)
        .unwrap();
    assert_eq!(result.to_js_string(), "Hello, world/world");
    assert_eq!(realized.get(), 1);
}

#[test]
fn test_native_function_binding() {
    let mut bindings = Bindings::new();
    bindings.put(
        "twice",
        ScriptValue::native_function("twice", |_this, args| {
            Ok(ScriptValue::Number(args[0].to_number() * 2.0))
        }),
    );
    let result = JsEngine::new().eval("test.js", "twice(21)", &bindings).unwrap();
    assert_eq!(result.to_number(), 42.0);
}

#[test]
fn test_closures_do_not_keep_bindings_alive() {
    let host = ScriptValue::new_object();
    let mut bindings = Bindings::new();
    bindings.put("host", host.clone());
    let result = JsEngine::new()
        .eval("test.js", "function f() { return host; } f(); 1", &bindings)
        .unwrap();
    assert_eq!(result.to_number(), 1.0);
    drop(bindings);
    assert_eq!(Rc::strong_count(host.as_object().unwrap()), 1);
}

#[test]
fn test_compile_once_eval_twice() {
    let engine = JsEngine::new();
    let compiled = engine
        .compilable()
        .unwrap()
        .compile("test.js", "value * 2")
        .unwrap();
    let mut first = Bindings::new();
    first.put("value", 2.0);
    let mut second = Bindings::new();
    second.put("value", 5.0);
    assert_eq!(compiled.eval(&first).unwrap().to_number(), 4.0);
    assert_eq!(compiled.eval(&second).unwrap().to_number(), 10.0);
}
