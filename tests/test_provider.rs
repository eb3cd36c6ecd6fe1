//! Tests for the provider entry point used by the templating host.

extern crate js_use;

use std::cell::RefCell;
use std::rc::Rc;

use js_use::config::ProviderConfig;
use js_use::resource::InMemoryRepository;
use js_use::runner::ds::bindings::Bindings;
use js_use::runner::ds::object::ObjectData;
use js_use::runner::engine::EngineManager;
use js_use::use_api::{JsUseProvider, ProviderOutcome, RenderContext, UseProvider};
use js_use::{ScriptValue, UseError};
use serde_json::json;

fn provider(repository: InMemoryRepository) -> JsUseProvider {
    JsUseProvider::new(
        ProviderConfig::default(),
        Rc::new(EngineManager::new()),
        Rc::new(repository),
    )
}

fn repository() -> InMemoryRepository {
    InMemoryRepository::new(&["/apps", "/libs"])
}

fn render_context(render_script: &str) -> RenderContext {
    let mut globals = Bindings::new();
    globals.put("render.script", render_script);
    RenderContext::new(globals)
}

#[test]
fn test_provides_module_value() {
    let mut repo = repository();
    repo.add_script("/apps/site/page.html", "")
        .add_script("/apps/site/page.js", "module.exports = { title: 'Home' };");
    let outcome = provider(repo).provide(
        "page.js",
        &render_context("/apps/site/page.html"),
        &Bindings::new(),
    );
    assert!(outcome.is_success());
    assert_eq!(outcome.success_value().unwrap().to_json(), json!({"title": "Home"}));
}

#[test]
fn test_non_script_is_declined() {
    let outcome = provider(repository()).provide(
        "page.html",
        &RenderContext::default(),
        &Bindings::new(),
    );
    assert!(matches!(outcome, ProviderOutcome::Failure(None)));
}

#[test]
fn test_missing_engine() {
    let provider = JsUseProvider::new(
        ProviderConfig::default(),
        Rc::new(EngineManager::empty()),
        Rc::new(repository()),
    );
    let outcome = provider.provide("page.js", &RenderContext::default(), &Bindings::new());
    match outcome.error() {
        Some(e @ UseError::EngineUnavailable(_)) => {
            assert_eq!(e.to_string(), "Failed to obtain a js script engine.")
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_missing_script() {
    let outcome = provider(repository()).provide(
        "/apps/site/missing.js",
        &RenderContext::default(),
        &Bindings::new(),
    );
    assert!(!outcome.is_success());
    assert!(matches!(outcome.error(), Some(UseError::DependencyNotFound(_))));
}

#[test]
fn test_evaluation_error() {
    let mut repo = repository();
    repo.add_script("/apps/site/page.js", "undefinedName.call()");
    let outcome = provider(repo).provide(
        "/apps/site/page.js",
        &RenderContext::default(),
        &Bindings::new(),
    );
    match outcome.error() {
        Some(UseError::ScriptEvaluation { script, .. }) => assert_eq!(script, "/apps/site/page.js"),
        other => panic!("unexpected error {:?}", other),
    }
}

struct DummyProvider;

impl UseProvider for DummyProvider {
    fn provide(&self, _: &str, _: &RenderContext, _: &Bindings) -> ProviderOutcome {
        ProviderOutcome::Failure(None)
    }
}

#[test]
fn test_ranking() {
    assert_eq!(provider(repository()).ranking(), 80);
    assert_eq!(DummyProvider.ranking(), 80);
    let config = ProviderConfig::from_json(r#"{ "service_ranking": 120 }"#).unwrap();
    let ranked = JsUseProvider::new(config, Rc::new(EngineManager::new()), Rc::new(repository()));
    assert_eq!(ranked.ranking(), 120);
}

#[test]
fn test_nested_use_chain_is_unwrapped() {
    let mut repo = repository();
    repo.add_script("/apps/site/a.js", "'a'")
        .add_script("/apps/site/b.js", "use('a.js', function (a) { return a + 'b'; })")
        .add_script(
            "/apps/site/page.js",
            "use('b.js', function (b) { return use(function () { return b; }); })",
        );
    let outcome = provider(repo).provide(
        "/apps/site/page.js",
        &RenderContext::default(),
        &Bindings::new(),
    );
    assert_eq!(outcome.success_value().unwrap().to_js_string(), "ab");
}

#[test]
fn test_arguments_are_this() {
    let mut repo = repository();
    repo.add_script(
        "/apps/site/page.js",
        "use(function () { return this.greeting + ', ' + this.name; })",
    );
    let mut arguments = Bindings::new();
    arguments.put("greeting", "Hello");
    arguments.put("name", "world");
    let outcome = provider(repo).provide("/apps/site/page.js", &RenderContext::default(), &arguments);
    assert_eq!(outcome.success_value().unwrap().to_js_string(), "Hello, world");
}

#[test]
fn test_driver_type_selects_supertype_library() {
    let mut repo = repository();
    repo.add_type("/apps/site/article", Some("base/page"))
        .add_script("/apps/site/article/article.html", "")
        .add_script("/libs/base/page/helper.js", "'from base'")
        .add_script(
            "/apps/site/article/article.js",
            "use('helper.js', function (h) { return h; })",
        );
    let mut globals = Bindings::new();
    globals.put("request.resourceType", "site/article");
    globals.put("render.script", "/apps/site/article/article.html");
    let outcome = provider(repo).provide(
        "/apps/site/article/article.js",
        &RenderContext::new(globals),
        &Bindings::new(),
    );
    assert_eq!(outcome.success_value().unwrap().to_js_string(), "from base");
}

#[test]
fn test_render_releases_host_globals() {
    let mut repo = repository();
    repo.add_script(
        "/apps/site/helper.js",
        "function read() { return host; } exports.read = read;",
    )
    .add_script(
        "/apps/site/page.js",
        "function title() { return host.title; } \
         use('helper.js', function (h) { return [h.read().title, title()]; })",
    );
    let host = Rc::new(RefCell::new(ObjectData::new()));
    host.borrow_mut().set("title", ScriptValue::from("Home"));
    let provider = provider(repo);
    {
        let mut globals = Bindings::new();
        globals.put("host", ScriptValue::Object(host.clone()));
        let outcome = provider.provide(
            "/apps/site/page.js",
            &RenderContext::new(globals),
            &Bindings::new(),
        );
        assert_eq!(outcome.success_value().unwrap().to_json(), json!(["Home", "Home"]));
    }
    assert_eq!(Rc::strong_count(&host), 1);
}
