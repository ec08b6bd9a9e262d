use crate::di::Value;
use crate::error::{BridgeError, Result};
use crate::http::ParameterBag;
use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{HeaderMap, Method, Uri, request::Parts};
use std::collections::HashMap;
use std::sync::Arc;

/// The request as seen by controllers and the resolver.
///
/// Immutable once built; shared through an `Arc` so that it can be handed to
/// controllers as an argument.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    attributes: ParameterBag,
    query: HashMap<String, String>,
}

impl Request {
    /// Build a bodiless `GET` request for `uri`, parsing its query string
    ///
    /// # Example
    /// ```
    /// use meshestra_bridge::http::Request;
    ///
    /// let request = Request::create("/hello?name=john").unwrap();
    /// assert_eq!(request.path(), "/hello");
    /// assert_eq!(request.get_str("name"), Some("john"));
    /// ```
    pub fn create(uri: &str) -> Result<Self> {
        let uri: Uri = uri
            .parse()
            .map_err(|e| BridgeError::InvalidRequest(format!("{}: {}", uri, e)))?;
        Self::with_method(Method::GET, uri)
    }

    pub fn with_method(method: Method, uri: Uri) -> Result<Self> {
        let query = parse_query(&uri)?;
        Ok(Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            attributes: ParameterBag::new(),
            query,
        })
    }

    /// Build from the parts of an incoming axum request
    pub fn from_parts(parts: Parts, body: Bytes) -> Result<Self> {
        let query = parse_query(&parts.uri)?;
        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            attributes: ParameterBag::new(),
            query,
        })
    }

    pub fn with_attribute<T: 'static + Send + Sync>(
        mut self,
        key: impl Into<String>,
        value: T,
    ) -> Self {
        self.attributes.insert(key, value);
        self
    }

    pub fn with_attribute_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert_value(key, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn attributes(&self) -> &ParameterBag {
        &self.attributes
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Look a key up in the attributes, then in the query string
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.attributes.get(key) {
            return Some(value.clone());
        }
        self.query
            .get(key)
            .map(|value| Arc::new(value.clone()) as Value)
    }

    /// String form of [`get`](Self::get)
    pub fn get_str(&self, key: &str) -> Option<&str> {
        if self.attributes.has(key) {
            return self.attributes.get_str(key);
        }
        self.query_param(key)
    }
}

fn parse_query(uri: &Uri) -> Result<HashMap<String, String>> {
    if uri.query().is_none() {
        return Ok(HashMap::new());
    }
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(query)| query)
        .map_err(|e| BridgeError::InvalidRequest(e.body_text()))
}
