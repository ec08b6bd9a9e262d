//! Controller abstractions
//!
//! A controller declares its parameters up front ([`Parameter`]) and is
//! invoked with the positional [`Arguments`] the resolver derived for them.
//! Closures become controllers through [`Action`]; types exposing several
//! named actions implement [`ControllerMethods`].

mod arguments;
mod output;
mod parameter;

pub use arguments::{Arguments, ResolvedArguments};
pub use output::Output;
pub use parameter::Parameter;

use crate::di::ServiceKey;
use crate::error::BoxError;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

pub type ControllerResult = Result<Output, BoxError>;

/// An invokable controller
pub trait Controller: Send + Sync + 'static {
    /// Declared parameters, in positional order
    fn parameters(&self) -> &[Parameter];

    fn invoke(&self, arguments: Arguments) -> ControllerResult;
}

/// A controller type exposing actions by method name
///
/// # Example
/// ```
/// use meshestra_bridge::controller::{Action, ControllerMethods, Parameter};
/// use std::sync::Arc;
///
/// struct HelloController;
///
/// impl ControllerMethods for HelloController {
///     fn action(self: Arc<Self>, method: &str) -> Option<Action> {
///         match method {
///             "hello" => Some(Action::new([Parameter::named("name")], |args| {
///                 Ok(format!("Hello {}", args.get_str(0)?))
///             })),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait ControllerMethods: Send + Sync + 'static {
    fn action(self: Arc<Self>, method: &str) -> Option<Action>;
}

type Handler = Arc<dyn Fn(Arguments) -> ControllerResult + Send + Sync>;

/// A closure paired with its parameter list
#[derive(Clone)]
pub struct Action {
    parameters: Arc<[Parameter]>,
    handler: Handler,
}

impl Action {
    pub fn new<P, F, O>(parameters: P, handler: F) -> Self
    where
        P: IntoIterator<Item = Parameter>,
        F: Fn(Arguments) -> Result<O, BoxError> + Send + Sync + 'static,
        O: Into<Output>,
    {
        Self {
            parameters: parameters.into_iter().collect(),
            handler: Arc::new(move |arguments: Arguments| -> ControllerResult {
                handler(arguments).map(Into::into)
            }),
        }
    }

    /// An action that borrows `instance` on every call
    pub fn bound<T, P, F, O>(instance: Arc<T>, parameters: P, handler: F) -> Self
    where
        T: Send + Sync + 'static,
        P: IntoIterator<Item = Parameter>,
        F: Fn(&T, Arguments) -> Result<O, BoxError> + Send + Sync + 'static,
        O: Into<Output>,
    {
        Self::new(parameters, move |arguments| handler(&instance, arguments))
    }
}

impl Controller for Action {
    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn invoke(&self, arguments: Arguments) -> ControllerResult {
        (self.handler)(arguments)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// What the `_controller` request attribute points at
#[derive(Clone)]
pub enum ControllerRef {
    /// An action or invokable object, ready to call
    Callable(Arc<dyn Controller>),
    /// A container entry holding an invokable controller
    Service(ServiceKey),
    /// A named action on a container entry
    Method {
        target: ServiceKey,
        method: Cow<'static, str>,
    },
    /// A named action on an instance
    BoundMethod {
        instance: Arc<dyn ControllerMethods>,
        method: Cow<'static, str>,
    },
}

impl ControllerRef {
    pub fn callable<C: Controller>(controller: C) -> Self {
        ControllerRef::Callable(Arc::new(controller))
    }

    pub fn service(key: impl Into<ServiceKey>) -> Self {
        ControllerRef::Service(key.into())
    }

    pub fn method(target: impl Into<ServiceKey>, method: impl Into<Cow<'static, str>>) -> Self {
        ControllerRef::Method {
            target: target.into(),
            method: method.into(),
        }
    }

    pub fn bound<C: ControllerMethods>(
        instance: Arc<C>,
        method: impl Into<Cow<'static, str>>,
    ) -> Self {
        ControllerRef::BoundMethod {
            instance,
            method: method.into(),
        }
    }

    /// Human-readable identifier used in error messages
    pub fn identifier(&self) -> String {
        match self {
            ControllerRef::Callable(_) => "{closure}".to_string(),
            ControllerRef::Service(key) => key.to_string(),
            ControllerRef::Method { target, method } => format!("{}::{}", target, method),
            ControllerRef::BoundMethod { method, .. } => format!("{{instance}}::{}", method),
        }
    }
}

impl From<Action> for ControllerRef {
    fn from(action: Action) -> Self {
        ControllerRef::Callable(Arc::new(action))
    }
}

impl From<ServiceKey> for ControllerRef {
    fn from(key: ServiceKey) -> Self {
        ControllerRef::Service(key)
    }
}

impl From<&'static str> for ControllerRef {
    fn from(id: &'static str) -> Self {
        ControllerRef::Service(ServiceKey::named(id))
    }
}

impl fmt::Debug for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ControllerRef")
            .field(&self.identifier())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeter {
        greeting: &'static str,
    }

    impl ControllerMethods for Greeter {
        fn action(self: Arc<Self>, method: &str) -> Option<Action> {
            match method {
                "greet" => Some(Action::bound(
                    self,
                    [Parameter::named("name")],
                    |this: &Greeter, args| Ok(format!("{} {}", this.greeting, args.get_str(0)?)),
                )),
                _ => None,
            }
        }
    }

    #[test]
    fn action_invokes_closure() {
        let action = Action::new([Parameter::named("name")], |args| {
            Ok(format!("Hello {}", args.get_str(0)?))
        });
        assert_eq!(action.parameters().len(), 1);

        let output = action
            .invoke(Arguments::new(vec![Arc::new(String::from("john"))]))
            .unwrap();
        assert_eq!(output.as_text(), Some("Hello john"));
    }

    #[test]
    fn bound_action_uses_instance() {
        let greeter = Arc::new(Greeter { greeting: "Hi" });
        let action = greeter.action("greet").unwrap();
        let output = action
            .invoke(Arguments::new(vec![Arc::new("jane")]))
            .unwrap();
        assert_eq!(output.as_text(), Some("Hi jane"));
    }

    #[test]
    fn controller_errors_are_returned_as_is() {
        #[derive(Debug, thiserror::Error)]
        #[error("boom")]
        struct Boom;

        let action = Action::new([], |_| Err::<Output, BoxError>(Box::new(Boom)));
        let err = action.invoke(Arguments::default()).unwrap_err();
        assert!(err.downcast_ref::<Boom>().is_some());
    }

    #[test]
    fn identifiers() {
        assert_eq!(ControllerRef::from("home").identifier(), "home");
        assert_eq!(
            ControllerRef::method("HomeController", "index").identifier(),
            "HomeController::index"
        );
    }
}
