//! Controller resolution
//!
//! [`ControllerResolver`] is what the HTTP kernel talks to. It locates the
//! controller named by the request ([`CallableLocator`]), and hands back a
//! [`DeferredController`] that resolves arguments through the strategy chain
//! ([`ParameterResolver`]) each time it is called.
//!
//! # Example
//! ```
//! use meshestra_bridge::controller::{Action, ControllerRef, Parameter};
//! use meshestra_bridge::di::Container;
//! use meshestra_bridge::http::Request;
//! use meshestra_bridge::resolver::ControllerResolver;
//! use std::sync::Arc;
//!
//! let resolver = ControllerResolver::new(Arc::new(Container::new()));
//!
//! let hello = Action::new([Parameter::named("name")], |args| {
//!     Ok(format!("Hello {}", args.get_str(0)?))
//! });
//! let request = Request::create("/john")
//!     .unwrap()
//!     .with_attribute("_controller", ControllerRef::from(hello))
//!     .with_attribute("name", String::from("john"));
//!
//! let controller = resolver.get_controller(Arc::new(request)).unwrap();
//! let output = controller.call().unwrap();
//! assert_eq!(output.as_text(), Some("Hello john"));
//! ```

mod locator;
mod registry;
mod strategy;

pub use locator::CallableLocator;
pub use registry::ClassRegistry;
pub use strategy::{
    AttributeStrategy, DefaultValueStrategy, ParameterStrategy, RequestStrategy,
    ResolutionContext, TypeHintStrategy,
};

use crate::config::ResolverConfig;
use crate::controller::{Arguments, Controller, Output, ResolvedArguments};
use crate::di::ServiceLocator;
use crate::error::{InvocationError, Result};
use crate::http::Request;
use std::sync::Arc;
use strum_macros::{Display, EnumIter};

/// Where a request is in its resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Unresolved,
    CallableLocated,
    ArgumentsResolved,
    Invoked,
}

/// Runs the strategy chain over a controller's parameters.
#[derive(Clone)]
pub struct ParameterResolver {
    strategies: Arc<[Box<dyn ParameterStrategy>]>,
}

impl ParameterResolver {
    pub fn new(strategies: Vec<Box<dyn ParameterStrategy>>) -> Self {
        Self {
            strategies: strategies.into(),
        }
    }

    /// Request, attribute name, container type hint, then default values
    pub fn default_chain(container: Arc<dyn ServiceLocator>, config: &ResolverConfig) -> Self {
        Self::new(vec![
            Box::new(RequestStrategy::new(config.inject_request_once)),
            Box::new(AttributeStrategy),
            Box::new(TypeHintStrategy::new(container)),
            Box::new(DefaultValueStrategy),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn resolve(&self, controller: &dyn Controller, request: &Arc<Request>) -> Result<Arguments> {
        let parameters = controller.parameters();
        let context = ResolutionContext::new(request);
        let mut resolved = ResolvedArguments::new();

        for strategy in self.strategies.iter() {
            if resolved.len() == parameters.len() {
                break;
            }
            strategy.resolve_into(parameters, &context, &mut resolved)?;
        }

        resolved.into_arguments(parameters)
    }
}

/// Resolves controllers for the HTTP kernel.
///
/// Holds no per-request state; clone it freely and share it across requests.
#[derive(Clone)]
pub struct ControllerResolver {
    locator: Arc<CallableLocator>,
    parameters: ParameterResolver,
    config: Arc<ResolverConfig>,
}

impl ControllerResolver {
    /// A resolver with the default configuration and strategy chain
    pub fn new(container: Arc<dyn ServiceLocator>) -> Self {
        Self::builder(container).build()
    }

    pub fn builder(container: Arc<dyn ServiceLocator>) -> ControllerResolverBuilder {
        ControllerResolverBuilder::new(container)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn parameter_resolver(&self) -> &ParameterResolver {
        &self.parameters
    }

    /// Locate the request's controller and defer its invocation
    pub fn get_controller(&self, request: Arc<Request>) -> Result<DeferredController> {
        tracing::debug!(stage = %Stage::Unresolved, path = request.path(), "Resolving controller");
        let controller = self.locator.locate(&request).inspect_err(|e| {
            tracing::debug!(path = request.path(), "Controller lookup failed: {}", e);
        })?;
        tracing::debug!(stage = %Stage::CallableLocated, path = request.path(), "Controller located");

        Ok(DeferredController {
            parameters: self.parameters.clone(),
            controller,
            request,
        })
    }

    /// Positional arguments for `controller`, derived from `request`
    pub fn get_arguments(
        &self,
        request: &Arc<Request>,
        controller: &dyn Controller,
    ) -> Result<Arguments> {
        self.parameters.resolve(controller, request)
    }
}

pub struct ControllerResolverBuilder {
    container: Arc<dyn ServiceLocator>,
    config: ResolverConfig,
    classes: ClassRegistry,
    strategies: Option<Vec<Box<dyn ParameterStrategy>>>,
}

impl ControllerResolverBuilder {
    pub fn new(container: Arc<dyn ServiceLocator>) -> Self {
        Self {
            container,
            config: ResolverConfig::default(),
            classes: ClassRegistry::new(),
            strategies: None,
        }
    }

    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Controller types for the legacy fallback.
    ///
    /// Only consulted when `class_fallback` is enabled in the configuration.
    pub fn classes(mut self, classes: ClassRegistry) -> Self {
        self.classes = classes;
        self
    }

    /// Replace the default strategy chain
    pub fn strategies(mut self, strategies: Vec<Box<dyn ParameterStrategy>>) -> Self {
        self.strategies = Some(strategies);
        self
    }

    pub fn build(self) -> ControllerResolver {
        let mut locator =
            CallableLocator::new(Arc::clone(&self.container), &self.config.controller_attribute);
        if self.config.class_fallback {
            locator = locator.with_class_fallback(self.classes);
        }

        let parameters = match self.strategies {
            Some(strategies) => ParameterResolver::new(strategies),
            None => ParameterResolver::default_chain(self.container, &self.config),
        };

        ControllerResolver {
            locator: Arc::new(locator),
            parameters,
            config: Arc::new(self.config),
        }
    }
}

/// A located controller bound to its request.
///
/// Arguments are resolved anew on every [`call`](Self::call).
#[derive(Clone)]
pub struct DeferredController {
    parameters: ParameterResolver,
    controller: Arc<dyn Controller>,
    request: Arc<Request>,
}

impl DeferredController {
    pub fn call(&self) -> std::result::Result<Output, InvocationError> {
        let arguments = self.parameters.resolve(self.controller.as_ref(), &self.request)?;
        tracing::debug!(
            stage = %Stage::ArgumentsResolved,
            path = self.request.path(),
            arguments = arguments.len(),
            "Arguments resolved"
        );

        let output = self
            .controller
            .invoke(arguments)
            .map_err(InvocationError::Controller)?;
        tracing::debug!(stage = %Stage::Invoked, path = self.request.path(), "Controller invoked");
        Ok(output)
    }

    pub fn controller(&self) -> &Arc<dyn Controller> {
        &self.controller
    }

    pub fn request(&self) -> &Arc<Request> {
        &self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Action, ControllerRef, Parameter};
    use crate::di::Container;
    use strum::IntoEnumIterator;

    #[test]
    fn stages_are_ordered() {
        let stages: Vec<String> = Stage::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            stages,
            ["unresolved", "callable_located", "arguments_resolved", "invoked"]
        );
    }

    #[test]
    fn default_chain_order() {
        let resolver = ControllerResolver::new(Arc::new(Container::new()));
        assert_eq!(
            resolver.parameter_resolver().strategy_names(),
            ["request", "attribute", "type_hint", "default_value"]
        );
    }

    #[test]
    fn custom_chain_replaces_default() {
        let resolver = ControllerResolver::builder(Arc::new(Container::new()))
            .strategies(vec![Box::new(DefaultValueStrategy)])
            .build();

        let action = Action::new([Parameter::named("name")], |_| Ok("unused"));
        let request = Arc::new(
            Request::create("/")
                .unwrap()
                .with_attribute("name", String::from("john")),
        );
        assert!(resolver.get_arguments(&request, &action).is_err());
    }

    #[test]
    fn deferred_call_resolves_each_time() {
        let resolver = ControllerResolver::new(Arc::new(Container::new()));
        let action = Action::new([Parameter::named("name")], |args| {
            Ok(format!("Hello {}", args.get_str(0)?))
        });
        let request = Request::create("/")
            .unwrap()
            .with_attribute("_controller", ControllerRef::from(action))
            .with_attribute("name", String::from("john"));

        let deferred = resolver.get_controller(Arc::new(request)).unwrap();
        assert_eq!(deferred.call().unwrap().as_text(), Some("Hello john"));
        assert_eq!(deferred.call().unwrap().as_text(), Some("Hello john"));
    }
}
