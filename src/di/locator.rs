use crate::controller::{Controller, ControllerMethods};
use crate::di::{ServiceKey, Value};
use crate::error::{BridgeError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only view of a service container.
///
/// This is the only surface the resolver depends on. Both the strict
/// [`Container`](crate::di::Container) and the array-like [`ServiceMap`]
/// implement it.
pub trait ServiceLocator: Send + Sync {
    fn has(&self, key: &ServiceKey) -> bool;

    /// Fetch an entry, failing with [`BridgeError::ServiceNotFound`] when absent
    fn get(&self, key: &ServiceKey) -> Result<Value>;
}

/// Wrap a controller so it can be stored as a plain service value.
pub(crate) fn controller_value<C: Controller>(controller: C) -> Value {
    let handle: Arc<dyn Controller> = Arc::new(controller);
    Arc::new(handle)
}

pub(crate) fn methods_value<C: ControllerMethods>(controller: C) -> Value {
    let handle: Arc<dyn ControllerMethods> = Arc::new(controller);
    Arc::new(handle)
}

/// A plain map of services, filled up front and read afterwards.
///
/// ```
/// use meshestra_bridge::di::{ServiceKey, ServiceLocator, ServiceMap};
///
/// let mut services = ServiceMap::new();
/// services.insert("greeting", String::from("hello"));
/// assert!(services.has(&ServiceKey::named("greeting")));
/// ```
#[derive(Clone, Default)]
pub struct ServiceMap {
    entries: HashMap<ServiceKey, Value>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: 'static + Send + Sync>(
        &mut self,
        key: impl Into<ServiceKey>,
        value: T,
    ) -> &mut Self {
        self.entries.insert(key.into(), Arc::new(value));
        self
    }

    /// Store `value` under its own type, making it available to type hints
    pub fn insert_typed<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.entries.insert(ServiceKey::of::<T>(), Arc::new(value));
        self
    }

    pub fn insert_value(&mut self, key: impl Into<ServiceKey>, value: Value) -> &mut Self {
        self.entries.insert(key.into(), value);
        self
    }

    pub fn insert_controller<C: Controller>(
        &mut self,
        key: impl Into<ServiceKey>,
        controller: C,
    ) -> &mut Self {
        self.entries.insert(key.into(), controller_value(controller));
        self
    }

    pub fn insert_methods<C: ControllerMethods>(
        &mut self,
        key: impl Into<ServiceKey>,
        controller: C,
    ) -> &mut Self {
        self.entries.insert(key.into(), methods_value(controller));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ServiceLocator for ServiceMap {
    fn has(&self, key: &ServiceKey) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &ServiceKey) -> Result<Value> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| BridgeError::ServiceNotFound { key: key.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Settings {
        foo: &'static str,
    }

    #[test]
    fn typed_and_named_entries() {
        let mut services = ServiceMap::new();
        services
            .insert_typed(Settings { foo: "bar" })
            .insert("name", String::from("john"));

        let settings = services
            .get(&ServiceKey::of::<Settings>())
            .unwrap()
            .downcast::<Settings>()
            .unwrap();
        assert_eq!(settings.foo, "bar");
        assert!(services.has(&ServiceKey::named("name")));
        assert_eq!(services.len(), 2);
    }

    #[test]
    fn missing_entry_is_service_not_found() {
        let services = ServiceMap::new();
        let err = services.get(&ServiceKey::named("nope")).unwrap_err();
        assert!(matches!(err, BridgeError::ServiceNotFound { .. }));
    }
}
