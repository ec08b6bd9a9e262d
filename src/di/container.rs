use crate::controller::{Controller, ControllerMethods};
use crate::di::locator::{controller_value, methods_value};
use crate::di::{ServiceKey, ServiceLocator, Value};
use crate::error::{BridgeError, Result};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::{Arc, OnceLock};

/// Casts the erased implementation into an erased `Arc<dyn Trait>`.
type CasterFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

type FactoryFn = Arc<dyn Fn(&Container) -> Result<Value> + Send + Sync>;

/// Thread-safe dependency injection container.
///
/// Entries are keyed by [`ServiceKey`]: either a string identifier or the
/// type they are registered as. The first stored result of a factory is
/// shared by every later lookup, though concurrent first lookups may each
/// evaluate it. Trait bindings are cast once and the same `Arc<dyn Trait>`
/// is handed out until the container is modified.
pub struct Container {
    services: DashMap<ServiceKey, ServiceEntry>,
    trait_mappings: DashMap<TypeId, ServiceKey>,
    casters: DashMap<TypeId, CasterFn>,
    cast_instances: DashMap<TypeId, Value>,
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            services: self.services.clone(),
            trait_mappings: self.trait_mappings.clone(),
            casters: self.casters.clone(),
            cast_instances: self.cast_instances.clone(),
        }
    }
}

#[derive(Clone)]
enum ServiceEntry {
    Instance(Value),
    Factory {
        factory: FactoryFn,
        instance: Arc<OnceLock<Value>>,
    },
}

impl Container {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
            trait_mappings: DashMap::new(),
            casters: DashMap::new(),
            cast_instances: DashMap::new(),
        }
    }

    /// Register an instance under its own type
    pub fn register<T: 'static + Send + Sync>(&mut self, instance: T) -> &mut Self {
        self.register_value(ServiceKey::of::<T>(), Arc::new(instance))
    }

    pub fn register_named<T: 'static + Send + Sync>(
        &mut self,
        name: impl Into<ServiceKey>,
        instance: T,
    ) -> &mut Self {
        self.register_value(name.into(), Arc::new(instance))
    }

    pub fn register_value(&mut self, key: ServiceKey, value: Value) -> &mut Self {
        self.cast_instances.clear();
        self.services.insert(key, ServiceEntry::Instance(value));
        self
    }

    /// Register a factory evaluated on first lookup.
    ///
    /// The factory receives the container so it can pull its own dependencies.
    pub fn register_factory<T, F>(&mut self, key: impl Into<ServiceKey>, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&Container) -> Result<T> + 'static + Send + Sync,
    {
        let factory: FactoryFn = Arc::new(move |container: &Container| {
            let value: Value = Arc::new(factory(container)?);
            Ok(value)
        });
        self.cast_instances.clear();
        self.services.insert(
            key.into(),
            ServiceEntry::Factory {
                factory,
                instance: Arc::new(OnceLock::new()),
            },
        );
        self
    }

    /// Register an invokable controller under `key`
    pub fn register_controller<C: Controller>(
        &mut self,
        key: impl Into<ServiceKey>,
        controller: C,
    ) -> &mut Self {
        self.register_value(key.into(), controller_value(controller))
    }

    /// Register a controller exposing named actions under `key`
    pub fn register_methods<C: ControllerMethods>(
        &mut self,
        key: impl Into<ServiceKey>,
        controller: C,
    ) -> &mut Self {
        self.register_value(key.into(), methods_value(controller))
    }

    /// Bind `Trait` to the registered `Impl`.
    ///
    /// Lookups of `ServiceKey::of::<Trait>()` then yield an `Arc<dyn Trait>`.
    pub fn register_trait<Trait, Impl, F>(&mut self, caster_fn: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        let trait_id = TypeId::of::<Trait>();

        self.trait_mappings.insert(trait_id, ServiceKey::of::<Impl>());

        let caster: CasterFn = Arc::new(move |instance: Value| {
            let concrete = instance
                .downcast::<Impl>()
                .map_err(|_| BridgeError::downcast_failed::<Impl>())?;
            let trait_obj: Arc<Trait> = caster_fn(concrete);
            let wrapped: Value = Arc::new(trait_obj);
            Ok(wrapped)
        });

        self.casters.insert(trait_id, caster);
        self.cast_instances.remove(&trait_id);
        self
    }

    pub fn resolve<T: 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        self.get(&ServiceKey::of::<T>())?
            .downcast::<T>()
            .map_err(|_| BridgeError::downcast_failed::<T>())
    }

    pub fn resolve_named<T: 'static + Send + Sync>(
        &self,
        name: impl Into<ServiceKey>,
    ) -> Result<Arc<T>> {
        self.get(&name.into())?
            .downcast::<T>()
            .map_err(|_| BridgeError::downcast_failed::<T>())
    }

    pub fn resolve_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let wrapper = self
            .get(&ServiceKey::of::<T>())?
            .downcast::<Arc<T>>()
            .map_err(|_| BridgeError::downcast_failed::<T>())?;
        Ok(wrapper.as_ref().clone())
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.has(&ServiceKey::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    fn instantiate(&self, key: &ServiceKey) -> Result<Value> {
        // Clone the entry out so factories can look up other services freely.
        let entry = self
            .services
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BridgeError::ServiceNotFound { key: key.clone() })?;

        match entry {
            ServiceEntry::Instance(value) => Ok(value),
            ServiceEntry::Factory { factory, instance } => {
                if let Some(value) = instance.get() {
                    return Ok(value.clone());
                }
                tracing::debug!("Evaluating factory for {}", key);
                let value = factory(self)?;
                // A concurrent first lookup may have won; keep whichever landed.
                Ok(instance.get_or_init(|| value).clone())
            }
        }
    }

    fn cast_trait(&self, trait_id: TypeId, key: &ServiceKey) -> Result<Value> {
        if let Some(cast) = self.cast_instances.get(&trait_id) {
            return Ok(cast.value().clone());
        }
        let impl_key = self
            .trait_mappings
            .get(&trait_id)
            .map(|mapping| mapping.value().clone())
            .ok_or_else(|| BridgeError::ServiceNotFound { key: key.clone() })?;
        let caster = self
            .casters
            .get(&trait_id)
            .map(|caster| caster.value().clone())
            .ok_or_else(|| BridgeError::ServiceNotFound { key: key.clone() })?;

        let cast = caster(self.instantiate(&impl_key)?)?;
        Ok(self
            .cast_instances
            .entry(trait_id)
            .or_insert(cast)
            .value()
            .clone())
    }
}

impl ServiceLocator for Container {
    fn has(&self, key: &ServiceKey) -> bool {
        if self.services.contains_key(key) {
            return true;
        }
        match key {
            ServiceKey::Type(hint) => self.trait_mappings.contains_key(&hint.id()),
            ServiceKey::Named(_) => false,
        }
    }

    fn get(&self, key: &ServiceKey) -> Result<Value> {
        if self.services.contains_key(key) {
            return self.instantiate(key);
        }
        match key {
            ServiceKey::Type(hint) if self.trait_mappings.contains_key(&hint.id()) => {
                self.cast_trait(hint.id(), key)
            }
            _ => Err(BridgeError::ServiceNotFound { key: key.clone() }),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestService {
        value: i32,
    }

    trait MyTrait: Send + Sync {
        fn get_value(&self) -> i32;
    }

    struct MyTraitImpl {
        value: i32,
    }

    impl MyTrait for MyTraitImpl {
        fn get_value(&self) -> i32 {
            self.value
        }
    }

    #[test]
    fn typed_entry_is_shared_between_lookups() {
        let mut container = Container::new();
        container.register(TestService { value: 42 });

        let by_type = container.resolve::<TestService>().unwrap();
        let by_key = container
            .get(&ServiceKey::of::<TestService>())
            .unwrap()
            .downcast::<TestService>()
            .unwrap();
        assert_eq!(by_type.value, 42);
        assert!(Arc::ptr_eq(&by_type, &by_key));
    }

    #[test]
    fn trait_binding_hands_out_one_cast() {
        let mut container = Container::new();
        container.register(MyTraitImpl { value: 99 });
        container.register_trait::<dyn MyTrait, MyTraitImpl, _>(|i| i as Arc<dyn MyTrait>);
        assert!(container.contains::<dyn MyTrait>());

        let first = container.resolve_trait::<dyn MyTrait>().unwrap();
        assert_eq!(first.get_value(), 99);
        let key = ServiceKey::of::<dyn MyTrait>();
        assert!(Arc::ptr_eq(
            &container.get(&key).unwrap(),
            &container.get(&key).unwrap()
        ));

        container.register(MyTraitImpl { value: 5 });
        assert_eq!(container.resolve_trait::<dyn MyTrait>().unwrap().get_value(), 5);
    }

    #[test]
    fn named_entries() {
        let mut container = Container::new();
        container.register_named("foo", String::from("bar"));
        assert!(container.has(&ServiceKey::named("foo")));
        assert_eq!(*container.resolve_named::<String>("foo").unwrap(), "bar");
        assert!(!container.has(&ServiceKey::named("bar")));
    }

    #[test]
    fn factory_result_is_shared() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut container = Container::new();
        container.register(TestService { value: 7 });
        container.register_factory::<String, _>("label", move |c| {
            counter.fetch_add(1, Ordering::SeqCst);
            let service = c.resolve::<TestService>()?;
            Ok(format!("value={}", service.value))
        });

        let first = container.resolve_named::<String>("label").unwrap();
        let second = container.resolve_named::<String>("label").unwrap();
        assert_eq!(*first, "value=7");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_and_mistyped_entries() {
        let mut container = Container::new();
        container.register_named("foo", 1u32);

        assert!(matches!(
            container.resolve::<TestService>(),
            Err(BridgeError::ServiceNotFound { .. })
        ));
        assert!(matches!(
            container.resolve_named::<String>("foo"),
            Err(BridgeError::DowncastFailed { .. })
        ));
    }
}
