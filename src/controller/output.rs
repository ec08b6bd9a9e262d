use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// What a controller hands back.
///
/// Either a finished response or a raw value the kernel converts.
#[derive(Debug)]
pub enum Output {
    Response(Response),
    Text(String),
    Json(serde_json::Value),
    Empty,
}

impl Output {
    /// The text body, when the controller produced text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Output::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Output::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<String> for Output {
    fn from(text: String) -> Self {
        Output::Text(text)
    }
}

impl From<&str> for Output {
    fn from(text: &str) -> Self {
        Output::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Output {
    fn from(value: serde_json::Value) -> Self {
        Output::Json(value)
    }
}

impl From<Response> for Output {
    fn from(response: Response) -> Self {
        Output::Response(response)
    }
}

impl From<()> for Output {
    fn from(_: ()) -> Self {
        Output::Empty
    }
}

impl IntoResponse for Output {
    fn into_response(self) -> Response {
        match self {
            Output::Response(response) => response,
            Output::Text(text) => text.into_response(),
            Output::Json(value) => Json(value).into_response(),
            Output::Empty => StatusCode::NO_CONTENT.into_response(),
        }
    }
}
