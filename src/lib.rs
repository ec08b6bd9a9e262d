//! # Meshestra Bridge
//!
//! Resolve axum controller actions through a dependency injection container.
//!
//! A request names its controller in the `_controller` attribute. The
//! [`ControllerResolver`] finds it (as a closure action, an invokable object,
//! a named action on a service, or a container entry) and binds its declared
//! parameters from, in order:
//!
//! 1. the request itself, for a parameter declared as [`Request`](http::Request),
//! 2. request attributes with the parameter's name (route placeholders),
//! 3. container services registered under the parameter's type,
//! 4. the parameter's default value.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meshestra_bridge::prelude::*;
//!
//! struct Greeter {
//!     greeting: &'static str,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let container = ContainerBuilder::new()
//!         .register(Greeter { greeting: "Hello" })
//!         .build();
//!     let resolver = ControllerResolver::new(Arc::new(container));
//!
//!     let hello = Action::new(
//!         [Parameter::named("name"), Parameter::typed::<Greeter>("greeter")],
//!         |args| {
//!             let greeter = args.get::<Greeter>(1)?;
//!             Ok(format!("{} {}", greeter.greeting, args.get_str(0)?))
//!         },
//!     );
//!
//!     let app = Kernel::new(resolver).get("/{name}", hello).into_router();
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod config;
pub mod controller;
pub mod di;
pub mod error;
pub mod http;
pub mod kernel;
pub mod resolver;

pub use config::ResolverConfig;
pub use controller::{Action, Arguments, Controller, ControllerMethods, ControllerRef, Output, Parameter};
pub use di::{Container, ContainerBuilder, ServiceKey, ServiceLocator, ServiceMap, TypeHint, Value};
pub use error::{BoxError, BridgeError, InvocationError, Result};
pub use kernel::Kernel;
pub use resolver::{ClassRegistry, ControllerResolver, DeferredController};

pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use meshestra_bridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ResolverConfig;
    pub use crate::controller::{
        Action, Arguments, Controller, ControllerMethods, ControllerRef, ControllerResult,
        Output, Parameter,
    };
    pub use crate::di::{Container, ContainerBuilder, ServiceKey, ServiceLocator, ServiceMap};
    pub use crate::error::{BoxError, BridgeError, InvocationError, Result};
    pub use crate::http::Request;
    pub use crate::kernel::Kernel;
    pub use crate::resolver::{ClassRegistry, ControllerResolver, DeferredController};
    pub use std::sync::Arc;
}
