use crate::di::ServiceKey;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// A type-erased error raised by a controller body
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("No controller can be found for this request (path: {path})")]
    ControllerNotFound { path: String },

    #[error("Controller `{identifier}` for path {path} is not invocable: {source}")]
    ControllerNotInvocable {
        identifier: String,
        path: String,
        #[source]
        source: Box<BridgeError>,
    },

    #[error("Unable to resolve argument #{index} `{name}`{}", describe_type(.type_name))]
    UnresolvableArgument {
        index: usize,
        name: String,
        type_name: Option<&'static str>,
    },

    #[error("Controller has no action named `{method}`")]
    UnknownAction { method: String },

    #[error("Argument #{index} requested but only {len} were resolved")]
    ArgumentOutOfRange { index: usize, len: usize },

    #[error("Service not found: {key}")]
    ServiceNotFound { key: ServiceKey },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid resolver configuration: {0}")]
    InvalidConfig(String),
}

fn describe_type(type_name: &Option<&'static str>) -> String {
    match type_name {
        Some(name) => format!(" of type {}", name),
        None => String::new(),
    }
}

impl BridgeError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::ControllerNotFound { path: path.into() }
    }

    pub fn not_invocable(
        identifier: impl Into<String>,
        path: impl Into<String>,
        source: BridgeError,
    ) -> Self {
        Self::ControllerNotInvocable {
            identifier: identifier.into(),
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub fn downcast_failed<T: ?Sized>() -> Self {
        Self::DowncastFailed {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::ControllerNotFound { .. } => StatusCode::NOT_FOUND,
            BridgeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure of a deferred controller call.
///
/// Resolution failures and controller failures are kept apart so that the
/// controller's own error reaches upstream handlers untouched.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Resolution(#[from] BridgeError),

    #[error("{0}")]
    Controller(BoxError),
}

impl InvocationError {
    /// The controller error, if the failure happened inside the controller body
    pub fn controller_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            InvocationError::Controller(e) => Some(e.as_ref()),
            InvocationError::Resolution(_) => None,
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(json!({
            "statusCode": status.as_u16(),
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.to_string())
    }
}

impl IntoResponse for InvocationError {
    fn into_response(self) -> Response {
        match self {
            InvocationError::Resolution(e) => e.into_response(),
            InvocationError::Controller(e) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolvable_argument_names_parameter_and_type() {
        let err = BridgeError::UnresolvableArgument {
            index: 1,
            name: "x".into(),
            type_name: Some("app::Mailer"),
        };
        assert_eq!(
            err.to_string(),
            "Unable to resolve argument #1 `x` of type app::Mailer"
        );

        let untyped = BridgeError::UnresolvableArgument {
            index: 0,
            name: "x".into(),
            type_name: None,
        };
        assert_eq!(untyped.to_string(), "Unable to resolve argument #0 `x`");
    }

    #[test]
    fn not_invocable_chains_source() {
        let err = BridgeError::not_invocable(
            "home",
            "/foo",
            BridgeError::ServiceNotFound {
                key: ServiceKey::named("home"),
            },
        );
        let message = err.to_string();
        assert!(message.contains("home"));
        assert!(message.contains("/foo"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn status_mapping() {
        assert_eq!(BridgeError::not_found("/").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            BridgeError::InvalidConfig("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
