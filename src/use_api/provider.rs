use std::rc::Rc;

use crate::config::ProviderConfig;
use crate::error::UseError;
use crate::resource::ResourceResolver;
use crate::runner::ds::bindings::Bindings;
use crate::runner::ds::value::ScriptValue;
use crate::runner::engine::EngineManager;

use super::environment::JsEnvironment;
use super::resolver::DependencyResolver;

/// What the host hands a provider for one render: its global bindings.
#[derive(Clone, Default)]
pub struct RenderContext {
    bindings: Bindings,
}

impl RenderContext {
    pub fn new(bindings: Bindings) -> Self {
        RenderContext { bindings }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}

#[derive(Debug)]
pub enum ProviderOutcome {
    Success(ScriptValue),
    /// The provider could not produce a value. `None` means the identifier
    /// is not one this provider handles.
    Failure(Option<UseError>),
}

impl ProviderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success(_))
    }

    pub fn success_value(self) -> Option<ScriptValue> {
        match self {
            ProviderOutcome::Success(value) => Some(value),
            ProviderOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&UseError> {
        match self {
            ProviderOutcome::Failure(error) => error.as_ref(),
            ProviderOutcome::Success(_) => None,
        }
    }
}

pub trait UseProvider {
    fn provide(
        &self,
        identifier: &str,
        render_context: &RenderContext,
        arguments: &Bindings,
    ) -> ProviderOutcome;

    /// Higher ranked providers are asked first.
    fn ranking(&self) -> i32 {
        crate::config::DEFAULT_SERVICE_RANKING
    }
}

/// Unwrap a chain of resolved containers. A pending container means the
/// script never finished.
pub fn adapt_value(identifier: &str, value: ScriptValue) -> Result<ScriptValue, UseError> {
    let mut value = value;
    while let ScriptValue::Async(container) = &value {
        value = container
            .result()
            .ok_or_else(|| UseError::Unresolved(identifier.to_string()))?;
    }
    Ok(value)
}

/// Provides the value of a JavaScript module to a template.
pub struct JsUseProvider {
    config: ProviderConfig,
    engines: Rc<EngineManager>,
    repository: Rc<dyn ResourceResolver>,
}

impl JsUseProvider {
    pub fn new(
        config: ProviderConfig,
        engines: Rc<EngineManager>,
        repository: Rc<dyn ResourceResolver>,
    ) -> Self {
        JsUseProvider {
            config,
            engines,
            repository,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn run(
        &self,
        environment: &Rc<JsEnvironment>,
        identifier: &str,
        global_bindings: Bindings,
        arguments: &Bindings,
    ) -> Result<ScriptValue, UseError> {
        let guard = environment.enter();
        let resolver = environment.resolver();
        let lookup = resolver.lookup_context(&global_bindings);
        let source = resolver.resolve(&lookup, identifier)?;
        let container =
            environment.run_script(guard.context(), source, global_bindings, arguments.clone())?;
        adapt_value(identifier, ScriptValue::Async(container))
    }
}

impl UseProvider for JsUseProvider {
    fn provide(
        &self,
        identifier: &str,
        render_context: &RenderContext,
        arguments: &Bindings,
    ) -> ProviderOutcome {
        if !self.config.is_script(identifier) {
            return ProviderOutcome::Failure(None);
        }
        let engine = match self.engines.engine_by_name(&self.config.engine_name) {
            Some(engine) => engine,
            None => {
                return ProviderOutcome::Failure(Some(UseError::EngineUnavailable(
                    self.config.engine_name.clone(),
                )))
            }
        };
        let resolver = DependencyResolver::new(self.repository.clone())
            .with_script_extension(&self.config.script_extension);
        let environment = JsEnvironment::new(engine, Rc::new(resolver));
        match self.run(&environment, identifier, render_context.bindings().clone(), arguments) {
            Ok(value) => ProviderOutcome::Success(value),
            Err(e) => {
                debug!("Unable to provide {}: {}", identifier, e);
                ProviderOutcome::Failure(Some(e))
            }
        }
    }

    fn ranking(&self) -> i32 {
        self.config.service_ranking
    }
}
