use crate::di::{TypeHint, Value};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Declared formal parameter of a controller.
///
/// The positional index is the parameter's position in the controller's
/// parameter list.
#[derive(Clone)]
pub struct Parameter {
    name: Cow<'static, str>,
    type_hint: Option<TypeHint>,
    default: Option<Value>,
}

impl Parameter {
    /// An untyped parameter, filled from the request attribute of the same name
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            default: None,
        }
    }

    /// A parameter declared as `T`
    pub fn typed<T: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            type_hint: Some(TypeHint::of::<T>()),
            default: None,
        }
    }

    /// Give the parameter a default used when nothing else resolves it
    pub fn with_default<T: 'static + Send + Sync>(self, default: T) -> Self {
        self.with_default_value(Arc::new(default))
    }

    pub fn with_default_value(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_hint(&self) -> Option<TypeHint> {
        self.type_hint
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    pub fn accepts<T: ?Sized + 'static>(&self) -> bool {
        self.type_hint.is_some_and(|hint| hint.is::<T>())
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("type_hint", &self.type_hint)
            .field("optional", &self.is_optional())
            .finish()
    }
}
