//! # js-use - asynchronous JavaScript modules for templates
//!
//! Runs JavaScript modules on behalf of a templating engine. A module can
//! pull in other modules with `use`, and its result reaches the host
//! asynchronously once every dependency has finished loading:
//!
//! - a **dependency resolver** that finds module source by walking a layered,
//!   overlay-aware resource type hierarchy,
//! - the **`use` function** available inside scripts,
//! - an **async container**, a single-assignment future with one-shot
//!   listeners,
//! - a single-threaded FIFO **task queue** that runs all script work.
//!
//! ## Quick Start
//!
//! ```
//! use std::rc::Rc;
//! use js_use::config::ProviderConfig;
//! use js_use::resource::InMemoryRepository;
//! use js_use::runner::ds::bindings::Bindings;
//! use js_use::runner::engine::EngineManager;
//! use js_use::use_api::{JsUseProvider, RenderContext, UseProvider};
//!
//! let mut repository = InMemoryRepository::new(&["/apps", "/libs"]);
//! repository
//!     .add_script("/apps/site/util.js", "exports.greet = function (n) { return 'Hello ' + n; };")
//!     .add_script(
//!         "/apps/site/page.js",
//!         "use('util.js', function (util) { return { text: util.greet('world') }; });",
//!     );
//!
//! let mut globals = Bindings::new();
//! globals.put("render.script", "/apps/site/page.html");
//!
//! let provider = JsUseProvider::new(
//!     ProviderConfig::default(),
//!     Rc::new(EngineManager::new()),
//!     Rc::new(repository),
//! );
//! let value = provider
//!     .provide("/apps/site/page.js", &RenderContext::new(globals), &Bindings::new())
//!     .success_value()
//!     .unwrap();
//! assert_eq!(value.to_json()["text"], "Hello world");
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - pest grammar and AST for the supported JavaScript subset
//! - **[`runner`]** - values, evaluator, built-ins and the [`runner::engine`] traits
//! - **[`event_loop`]** - task queue, execution context and [`event_loop::AsyncContainer`]
//! - **[`resource`]** - repository abstraction with in-memory and filesystem backends
//! - **[`use_api`]** - resolver, environment, `use` function and provider

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod config;
pub mod error;
pub mod event_loop;
pub mod parser;
pub mod resource;
pub mod runner;
pub mod use_api;

pub use error::UseError;
pub use runner::ds::error::ScriptError;
pub use runner::ds::value::ScriptValue;
