mod builder;
mod container;
mod key;
mod locator;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use key::{ServiceKey, TypeHint, Value};
pub use locator::{ServiceLocator, ServiceMap};
pub(crate) use locator::{controller_value, methods_value};
