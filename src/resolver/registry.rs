use crate::controller::{Controller, ControllerMethods};
use crate::di::{ServiceKey, Value, controller_value, methods_value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Instantiator = Arc<dyn Fn() -> Value + Send + Sync>;

/// Controller types that may be built without constructor arguments.
///
/// Consulted by the locator only when
/// [`ResolverConfig::class_fallback`](crate::config::ResolverConfig::class_fallback)
/// is on and the container has no entry for the requested key.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<ServiceKey, Instantiator>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an invokable controller under its own type
    pub fn register_controller<C: Controller + Default>(&mut self) -> &mut Self {
        self.register_controller_as::<C>(ServiceKey::of::<C>())
    }

    pub fn register_controller_as<C: Controller + Default>(
        &mut self,
        key: impl Into<ServiceKey>,
    ) -> &mut Self {
        self.classes
            .insert(key.into(), Arc::new(|| controller_value(C::default())));
        self
    }

    /// Register a controller with named actions under its own type
    pub fn register_methods<C: ControllerMethods + Default>(&mut self) -> &mut Self {
        self.register_methods_as::<C>(ServiceKey::of::<C>())
    }

    pub fn register_methods_as<C: ControllerMethods + Default>(
        &mut self,
        key: impl Into<ServiceKey>,
    ) -> &mut Self {
        self.classes
            .insert(key.into(), Arc::new(|| methods_value(C::default())));
        self
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.classes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// A fresh instance per call
    pub(crate) fn instantiate(&self, key: &ServiceKey) -> Option<Value> {
        self.classes.get(key).map(|instantiate| instantiate())
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.classes.keys()).finish()
    }
}
