//! axum integration
//!
//! Every route registered through [`Kernel`] carries its controller
//! reference. On dispatch the kernel builds a [`Request`] whose attributes
//! hold that reference and the matched path placeholders, then lets the
//! [`ControllerResolver`] do the rest. URL matching stays axum's job.

use crate::controller::ControllerRef;
use crate::http::Request;
use crate::resolver::ControllerResolver;
use axum::{
    Router,
    body::Bytes,
    extract::{FromRequest, Path, rejection::PathRejection},
    response::{IntoResponse, Response},
    routing::{MethodFilter, on},
};
use std::collections::HashMap;
use std::sync::Arc;

/// Router builder dispatching through a [`ControllerResolver`]
///
/// # Example
/// ```
/// use meshestra_bridge::controller::{Action, Parameter};
/// use meshestra_bridge::di::Container;
/// use meshestra_bridge::kernel::Kernel;
/// use meshestra_bridge::resolver::ControllerResolver;
/// use std::sync::Arc;
///
/// let resolver = ControllerResolver::new(Arc::new(Container::new()));
/// let router: axum::Router = Kernel::new(resolver)
///     .get("/{name}", Action::new([Parameter::named("name")], |args| {
///         Ok(format!("Hello {}", args.get_str(0)?))
///     }))
///     .into_router();
/// ```
pub struct Kernel {
    resolver: ControllerResolver,
    router: Router,
}

impl Kernel {
    pub fn new(resolver: ControllerResolver) -> Self {
        Self {
            resolver,
            router: Router::new(),
        }
    }

    pub fn route(
        mut self,
        filter: MethodFilter,
        path: &str,
        controller: impl Into<ControllerRef>,
    ) -> Self {
        let resolver = self.resolver.clone();
        let controller = controller.into();
        tracing::debug!("Mapping {} to {:?}", path, controller);

        let handler = move |params: Result<Path<HashMap<String, String>>, PathRejection>,
                            request: axum::extract::Request| {
            let resolver = resolver.clone();
            let controller = controller.clone();
            async move {
                let params = match params {
                    Ok(Path(params)) => params,
                    Err(PathRejection::MissingPathParams(_)) => HashMap::new(),
                    Err(e) => {
                        tracing::debug!("Rejected path parameters: {}", e);
                        return e.into_response();
                    }
                };
                dispatch(resolver, controller, params, request).await
            }
        };

        self.router = self.router.route(path, on(filter, handler));
        self
    }

    pub fn get(self, path: &str, controller: impl Into<ControllerRef>) -> Self {
        self.route(MethodFilter::GET, path, controller)
    }

    pub fn post(self, path: &str, controller: impl Into<ControllerRef>) -> Self {
        self.route(MethodFilter::POST, path, controller)
    }

    pub fn put(self, path: &str, controller: impl Into<ControllerRef>) -> Self {
        self.route(MethodFilter::PUT, path, controller)
    }

    pub fn patch(self, path: &str, controller: impl Into<ControllerRef>) -> Self {
        self.route(MethodFilter::PATCH, path, controller)
    }

    pub fn delete(self, path: &str, controller: impl Into<ControllerRef>) -> Self {
        self.route(MethodFilter::DELETE, path, controller)
    }

    pub fn resolver(&self) -> &ControllerResolver {
        &self.resolver
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

async fn dispatch(
    resolver: ControllerResolver,
    controller: ControllerRef,
    params: HashMap<String, String>,
    request: axum::extract::Request,
) -> Response {
    // Buffering through `Bytes` honours `DefaultBodyLimit`; oversized bodies get 413.
    let (parts, body) = request.into_parts();
    let limited = axum::extract::Request::from_parts(parts.clone(), body);
    let body = match Bytes::from_request(limited, &()).await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Rejected request body: {}", e);
            return e.into_response();
        }
    };

    let mut request = match Request::from_parts(parts, body) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    for (name, value) in params {
        request = request.with_attribute(name, value);
    }
    let request =
        request.with_attribute(resolver.config().controller_attribute.clone(), controller);

    let path = request.path().to_string();
    let deferred = match resolver.get_controller(Arc::new(request)) {
        Ok(deferred) => deferred,
        Err(e) => {
            tracing::error!("{} {}", path, e);
            return e.into_response();
        }
    };

    match deferred.call() {
        Ok(output) => output.into_response(),
        Err(e) => {
            tracing::error!("{} {}", path, e);
            e.into_response()
        }
    }
}
