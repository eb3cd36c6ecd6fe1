//! The asynchronous module execution environment.
//!
//! [`JsEnvironment`] runs module source on an event loop, giving every script
//! CommonJS `module`/`exports` objects, a `console` and the `use` function.
//! `use` resolves dependencies through the [`DependencyResolver`] and hands
//! their results to a callback once all of them have finished.

mod common_js;
mod environment;
mod provider;
mod resolver;
mod use_function;

pub use common_js::CommonJsModule;
pub use environment::{EnvironmentGuard, JsEnvironment};
pub use provider::{adapt_value, JsUseProvider, ProviderOutcome, RenderContext, UseProvider};
pub use resolver::{DependencyLookupContext, DependencyResolver, ModuleSource};
pub use use_function::UseFunction;

/// Binding holding the path of the script being evaluated.
pub const FILENAME_BINDING: &str = "script.filename";
/// Binding holding the resource type that drives the render request.
pub const RESOURCE_TYPE_BINDING: &str = "request.resourceType";
/// Binding holding the path of the template script that started the render.
pub const RENDER_SCRIPT_BINDING: &str = "render.script";
