use crate::controller::{Parameter, ResolvedArguments};
use crate::di::{ServiceKey, ServiceLocator, Value};
use crate::error::Result;
use crate::http::{ParameterBag, Request};
use std::sync::Arc;

/// Per-request inputs visible to the strategies
pub struct ResolutionContext<'a> {
    request: &'a Arc<Request>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(request: &'a Arc<Request>) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &'a Arc<Request> {
        self.request
    }

    pub fn attributes(&self) -> &'a ParameterBag {
        self.request.attributes()
    }
}

/// One way of deriving a parameter's value.
///
/// Strategies run in a fixed order; an index claimed by an earlier strategy
/// is never offered to a later one.
pub trait ParameterStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_resolve(
        &self,
        parameter: &Parameter,
        context: &ResolutionContext<'_>,
    ) -> Result<Option<Value>>;

    /// Offer every still unresolved parameter to [`try_resolve`](Self::try_resolve)
    fn resolve_into(
        &self,
        parameters: &[Parameter],
        context: &ResolutionContext<'_>,
        resolved: &mut ResolvedArguments,
    ) -> Result<()> {
        for (index, parameter) in parameters.iter().enumerate() {
            if resolved.is_resolved(index) {
                continue;
            }
            if let Some(value) = self.try_resolve(parameter, context)? {
                tracing::trace!(
                    strategy = self.name(),
                    index,
                    parameter = parameter.name(),
                    "Resolved argument"
                );
                resolved.insert(index, value);
            }
        }
        Ok(())
    }
}

/// Hands the request itself to parameters declared as [`Request`].
///
/// With `once` set the scan stops at the first request-typed parameter, so a
/// second one is left for the other strategies.
#[derive(Debug, Clone, Copy)]
pub struct RequestStrategy {
    once: bool,
}

impl RequestStrategy {
    pub fn new(once: bool) -> Self {
        Self { once }
    }
}

impl ParameterStrategy for RequestStrategy {
    fn name(&self) -> &'static str {
        "request"
    }

    fn try_resolve(
        &self,
        parameter: &Parameter,
        context: &ResolutionContext<'_>,
    ) -> Result<Option<Value>> {
        if !parameter.accepts::<Request>() {
            return Ok(None);
        }
        let request: Value = Arc::clone(context.request()) as Value;
        Ok(Some(request))
    }

    fn resolve_into(
        &self,
        parameters: &[Parameter],
        context: &ResolutionContext<'_>,
        resolved: &mut ResolvedArguments,
    ) -> Result<()> {
        for (index, parameter) in parameters.iter().enumerate() {
            if resolved.is_resolved(index) {
                continue;
            }
            if let Some(request) = self.try_resolve(parameter, context)? {
                resolved.insert(index, request);
                if self.once {
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Binds request attributes to parameters of the same name, without any
/// type check.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeStrategy;

impl ParameterStrategy for AttributeStrategy {
    fn name(&self) -> &'static str {
        "attribute"
    }

    fn try_resolve(
        &self,
        parameter: &Parameter,
        context: &ResolutionContext<'_>,
    ) -> Result<Option<Value>> {
        Ok(context.attributes().get(parameter.name()).cloned())
    }
}

/// Looks typed parameters up in the container, using the type as key.
///
/// A parameter declared as `dyn ServiceLocator` receives the container itself
/// unless the container has its own entry for that type.
pub struct TypeHintStrategy {
    container: Arc<dyn ServiceLocator>,
    // Wrapped once so every injection of the container is the same value.
    locator: Value,
}

impl TypeHintStrategy {
    pub fn new(container: Arc<dyn ServiceLocator>) -> Self {
        let locator: Value = Arc::new(Arc::clone(&container));
        Self { container, locator }
    }
}

impl ParameterStrategy for TypeHintStrategy {
    fn name(&self) -> &'static str {
        "type_hint"
    }

    fn try_resolve(
        &self,
        parameter: &Parameter,
        _context: &ResolutionContext<'_>,
    ) -> Result<Option<Value>> {
        let Some(hint) = parameter.type_hint() else {
            return Ok(None);
        };
        let key = ServiceKey::Type(hint);
        if self.container.has(&key) {
            return self.container.get(&key).map(Some);
        }
        if hint.is::<dyn ServiceLocator>() {
            return Ok(Some(Arc::clone(&self.locator)));
        }
        Ok(None)
    }
}

/// Falls back to declared default values
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueStrategy;

impl ParameterStrategy for DefaultValueStrategy {
    fn name(&self) -> &'static str {
        "default_value"
    }

    fn try_resolve(
        &self,
        parameter: &Parameter,
        _context: &ResolutionContext<'_>,
    ) -> Result<Option<Value>> {
        Ok(parameter.default_value().cloned())
    }
}
