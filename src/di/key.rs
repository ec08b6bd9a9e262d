use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Erased form of every service, attribute and argument
pub type Value = Arc<dyn Any + Send + Sync>;

/// A declared parameter type, used both for request matching and as a
/// container lookup key.
#[derive(Clone, Copy)]
pub struct TypeHint {
    id: TypeId,
    name: &'static str,
}

impl TypeHint {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeHint {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeHint {}

impl Hash for TypeHint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identifier of a container entry.
///
/// Named keys cover string identifiers (`"mailer"`, `"home_controller"`);
/// typed keys are what type-hinted parameters are looked up by.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    Named(Cow<'static, str>),
    Type(TypeHint),
}

impl ServiceKey {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        ServiceKey::Named(name.into())
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        ServiceKey::Type(TypeHint::of::<T>())
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKey::Named(name) => f.write_str(name),
            ServiceKey::Type(hint) => f.write_str(hint.name()),
        }
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKey::Named(name) => write!(f, "Named({:?})", name),
            ServiceKey::Type(hint) => write!(f, "Type({})", hint.name()),
        }
    }
}

impl From<&'static str> for ServiceKey {
    fn from(name: &'static str) -> Self {
        ServiceKey::Named(Cow::Borrowed(name))
    }
}

impl From<String> for ServiceKey {
    fn from(name: String) -> Self {
        ServiceKey::Named(Cow::Owned(name))
    }
}

impl From<TypeHint> for ServiceKey {
    fn from(hint: TypeHint) -> Self {
        ServiceKey::Type(hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mailer;

    #[test]
    fn typed_keys_compare_by_type_id() {
        assert_eq!(ServiceKey::of::<Mailer>(), ServiceKey::of::<Mailer>());
        assert_ne!(ServiceKey::of::<Mailer>(), ServiceKey::of::<String>());
        assert_ne!(
            ServiceKey::of::<Mailer>(),
            ServiceKey::named(std::any::type_name::<Mailer>())
        );
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(ServiceKey::named("foo").to_string(), "foo");
        assert!(ServiceKey::of::<Mailer>().to_string().ends_with("Mailer"));
    }
}
