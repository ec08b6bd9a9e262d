use crate::controller::{Controller, ControllerMethods, ControllerRef};
use crate::di::{ServiceKey, ServiceLocator, Value};
use crate::error::{BridgeError, Result};
use crate::http::Request;
use crate::resolver::ClassRegistry;
use std::sync::Arc;

/// Turns the controller attribute of a request into something callable.
///
/// No arguments are bound here.
pub struct CallableLocator {
    container: Arc<dyn ServiceLocator>,
    classes: Option<ClassRegistry>,
    controller_attribute: String,
}

impl CallableLocator {
    pub fn new(container: Arc<dyn ServiceLocator>, controller_attribute: impl Into<String>) -> Self {
        Self {
            container,
            classes: None,
            controller_attribute: controller_attribute.into(),
        }
    }

    /// Enable the no-argument instantiation fallback for unknown keys
    pub fn with_class_fallback(mut self, classes: ClassRegistry) -> Self {
        self.classes = Some(classes);
        self
    }

    pub fn locate(&self, request: &Request) -> Result<Arc<dyn Controller>> {
        let path = request.path();
        let reference = self.controller_ref(request)?;

        match &reference {
            ControllerRef::Callable(controller) => Ok(Arc::clone(controller)),
            ControllerRef::BoundMethod { instance, method } => {
                bind_method(Arc::clone(instance), method)
                    .map_err(|e| BridgeError::not_invocable(reference.identifier(), path, e))
            }
            ControllerRef::Service(key) => {
                let value = self.lookup(key, &reference, path)?;
                value
                    .downcast_ref::<Arc<dyn Controller>>()
                    .cloned()
                    .ok_or_else(|| {
                        BridgeError::not_invocable(
                            reference.identifier(),
                            path,
                            BridgeError::downcast_failed::<dyn Controller>(),
                        )
                    })
            }
            ControllerRef::Method { target, method } => {
                let value = self.lookup(target, &reference, path)?;
                let instance = value
                    .downcast_ref::<Arc<dyn ControllerMethods>>()
                    .cloned()
                    .ok_or_else(BridgeError::downcast_failed::<dyn ControllerMethods>)
                    .map_err(|e| BridgeError::not_invocable(reference.identifier(), path, e))?;
                bind_method(instance, method)
                    .map_err(|e| BridgeError::not_invocable(reference.identifier(), path, e))
            }
        }
    }

    fn controller_ref(&self, request: &Request) -> Result<ControllerRef> {
        let path = request.path();
        let value = request
            .attributes()
            .get(&self.controller_attribute)
            .ok_or_else(|| BridgeError::not_found(path))?;

        if let Some(reference) = value.downcast_ref::<ControllerRef>() {
            return Ok(reference.clone());
        }
        if let Some(controller) = value.downcast_ref::<Arc<dyn Controller>>() {
            return Ok(ControllerRef::Callable(Arc::clone(controller)));
        }
        let id = value
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| value.downcast_ref::<&'static str>().copied());
        match id {
            Some("") => Err(BridgeError::not_found(path)),
            Some(id) => Ok(ControllerRef::Service(ServiceKey::named(id.to_string()))),
            None => Err(BridgeError::not_invocable(
                self.controller_attribute.clone(),
                path,
                BridgeError::downcast_failed::<ControllerRef>(),
            )),
        }
    }

    /// Container first, then the class registry when one is configured.
    fn lookup(&self, key: &ServiceKey, reference: &ControllerRef, path: &str) -> Result<Value> {
        match self.container.get(key) {
            Ok(value) => Ok(value),
            Err(BridgeError::ServiceNotFound { .. }) if self.has_class(key) => {
                tracing::warn!(
                    "No container entry for `{}`, instantiating it without arguments",
                    key
                );
                self.classes
                    .as_ref()
                    .and_then(|classes| classes.instantiate(key))
                    .ok_or_else(|| BridgeError::ServiceNotFound { key: key.clone() })
            }
            Err(e) => Err(BridgeError::not_invocable(reference.identifier(), path, e)),
        }
    }

    fn has_class(&self, key: &ServiceKey) -> bool {
        self.classes
            .as_ref()
            .is_some_and(|classes| classes.contains(key))
    }
}

fn bind_method(instance: Arc<dyn ControllerMethods>, method: &str) -> Result<Arc<dyn Controller>> {
    let action = instance
        .action(method)
        .ok_or_else(|| BridgeError::UnknownAction {
            method: method.to_string(),
        })?;
    Ok(Arc::new(action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Action, Arguments, Output, Parameter};
    use crate::di::Container;

    #[derive(Default)]
    struct Invokable;

    impl Controller for Invokable {
        fn parameters(&self) -> &[Parameter] {
            &[]
        }

        fn invoke(&self, _arguments: Arguments) -> crate::controller::ControllerResult {
            Ok(Output::from("Hello world"))
        }
    }

    #[derive(Default)]
    struct Pages;

    impl ControllerMethods for Pages {
        fn action(self: Arc<Self>, method: &str) -> Option<Action> {
            match method {
                "home" => Some(Action::new([], |_| Ok("home"))),
                _ => None,
            }
        }
    }

    fn run(controller: Arc<dyn Controller>) -> String {
        controller
            .invoke(Arguments::default())
            .unwrap()
            .as_text()
            .unwrap()
            .to_string()
    }

    fn request_for(reference: ControllerRef) -> Request {
        Request::create("/foo")
            .unwrap()
            .with_attribute("_controller", reference)
    }

    #[test]
    fn missing_attribute_is_not_found() {
        let locator = CallableLocator::new(Arc::new(Container::new()), "_controller");
        let err = locator
            .locate(&Request::create("/nothing").unwrap())
            .err()
            .unwrap();
        assert!(matches!(err, BridgeError::ControllerNotFound { ref path } if path == "/nothing"));
    }

    #[test]
    fn empty_identifier_is_not_found() {
        let locator = CallableLocator::new(Arc::new(Container::new()), "_controller");
        let request = Request::create("/").unwrap().with_attribute("_controller", String::new());
        assert!(matches!(
            locator.locate(&request),
            Err(BridgeError::ControllerNotFound { .. })
        ));
    }

    #[test]
    fn string_identifier_resolves_from_container() {
        let mut container = Container::new();
        container.register_controller("invokable", Invokable);
        let locator = CallableLocator::new(Arc::new(container), "_controller");

        let request = Request::create("/foo")
            .unwrap()
            .with_attribute("_controller", String::from("invokable"));
        assert_eq!(run(locator.locate(&request).unwrap()), "Hello world");
    }

    #[test]
    fn method_pair_resolves_action() {
        let mut container = Container::new();
        container.register_methods(ServiceKey::of::<Pages>(), Pages);
        let locator = CallableLocator::new(Arc::new(container), "_controller");

        let request = request_for(ControllerRef::method(ServiceKey::of::<Pages>(), "home"));
        assert_eq!(run(locator.locate(&request).unwrap()), "home");

        let request = request_for(ControllerRef::method(ServiceKey::of::<Pages>(), "missing"));
        let err = locator.locate(&request).err().unwrap();
        match err {
            BridgeError::ControllerNotInvocable { source, .. } => {
                assert!(matches!(*source, BridgeError::UnknownAction { .. }))
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn unknown_service_is_not_invocable() {
        let locator = CallableLocator::new(Arc::new(Container::new()), "_controller");
        let err = locator
            .locate(&request_for(ControllerRef::service("nope")))
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(message.contains("nope"));
        assert!(message.contains("/foo"));
        assert!(matches!(
            err,
            BridgeError::ControllerNotInvocable { ref source, .. }
                if matches!(**source, BridgeError::ServiceNotFound { .. })
        ));
    }

    #[test]
    fn non_controller_service_is_not_invocable() {
        let mut container = Container::new();
        container.register_named("plain", 42u32);
        let locator = CallableLocator::new(Arc::new(container), "_controller");
        assert!(matches!(
            locator.locate(&request_for(ControllerRef::service("plain"))),
            Err(BridgeError::ControllerNotInvocable { .. })
        ));
    }

    #[test]
    fn class_fallback_is_opt_in() {
        let mut classes = ClassRegistry::new();
        classes
            .register_controller::<Invokable>()
            .register_methods::<Pages>();

        let strict = CallableLocator::new(Arc::new(Container::new()), "_controller");
        let request = request_for(ControllerRef::service(ServiceKey::of::<Invokable>()));
        assert!(strict.locate(&request).is_err());

        let lenient = CallableLocator::new(Arc::new(Container::new()), "_controller")
            .with_class_fallback(classes);
        assert_eq!(run(lenient.locate(&request).unwrap()), "Hello world");

        let request = request_for(ControllerRef::method(ServiceKey::of::<Pages>(), "home"));
        assert_eq!(run(lenient.locate(&request).unwrap()), "home");
    }
}
