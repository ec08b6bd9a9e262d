use crate::controller::{Controller, ControllerMethods};
use crate::di::{Container, ServiceKey};
use crate::error::Result;
use std::sync::Arc;

/// Builder for constructing a dependency injection container
///
/// Use this to configure and register services before handing the final
/// container to a [`ControllerResolver`](crate::resolver::ControllerResolver).
///
/// # Example
/// ```
/// use meshestra_bridge::di::ContainerBuilder;
///
/// struct Mailer;
///
/// let container = ContainerBuilder::new()
///     .register(Mailer)
///     .register_named("foo", String::from("bar"))
///     .build();
/// assert_eq!(container.len(), 2);
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Register a service instance under its own type
    pub fn register<T: 'static + Send + Sync>(mut self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    /// Register a service instance under a string identifier
    pub fn register_named<T: 'static + Send + Sync>(
        mut self,
        name: impl Into<ServiceKey>,
        instance: T,
    ) -> Self {
        self.container.register_named(name, instance);
        self
    }

    /// Register a lazily evaluated definition
    pub fn factory<T, F>(mut self, key: impl Into<ServiceKey>, factory: F) -> Self
    where
        T: 'static + Send + Sync,
        F: Fn(&Container) -> Result<T> + 'static + Send + Sync,
    {
        self.container.register_factory(key, factory);
        self
    }

    pub fn controller<C: Controller>(mut self, key: impl Into<ServiceKey>, controller: C) -> Self {
        self.container.register_controller(key, controller);
        self
    }

    pub fn methods<C: ControllerMethods>(
        mut self,
        key: impl Into<ServiceKey>,
        controller: C,
    ) -> Self {
        self.container.register_methods(key, controller);
        self
    }

    /// Answer `ServiceKey::of::<Trait>()` with the entry stored under `Impl`.
    ///
    /// `caster` turns that entry into the `Arc<dyn Trait>` handed to
    /// parameters typed as the trait. The `Impl` entry may be added after the
    /// binding; it only has to exist by the first lookup.
    pub fn bind<Trait, Impl, F>(mut self, caster: F) -> Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        self.container.register_trait::<Trait, Impl, F>(caster);
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
