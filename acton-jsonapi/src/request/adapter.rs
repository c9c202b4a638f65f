//! Transport adapter
//!
//! The pipeline reads requests only through [`ApiRequest`], so any transport
//! can feed it. [`IncomingRequest`] is the owned implementation built from
//! axum request parts.

use axum::{
    body::Bytes,
    extract::Query,
    http::{Method, Uri},
};
use serde_json::Value;

use crate::handlers::{codes, JsonApiError};

/// The request accessors the pipeline needs
pub trait ApiRequest {
    /// HTTP method
    fn method(&self) -> &Method;

    /// Key captured from the route, if any
    fn resource_id(&self) -> Option<&str>;

    /// Decoded query parameters in request order
    fn query_pairs(&self) -> &[(String, String)];

    /// Request path without the query string
    fn path(&self) -> &str;

    /// Raw (still encoded) query string
    fn raw_query(&self) -> Option<&str>;

    /// Raw body bytes
    fn body(&self) -> &[u8];
}

/// An owned request
///
/// # Example
///
/// ```rust
/// use acton_jsonapi::request::{ApiRequest, IncomingRequest};
/// use axum::http::{Method, Uri};
///
/// let uri: Uri = "/articles?include=author&sort=-title".parse().unwrap();
/// let request = IncomingRequest::new(Method::GET, &uri).unwrap().with_id("1");
///
/// assert_eq!(request.path(), "/articles");
/// assert_eq!(request.resource_id(), Some("1"));
/// assert_eq!(request.query_pairs()[1], ("sort".to_string(), "-title".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    method: Method,
    id: Option<String>,
    path: String,
    raw_query: Option<String>,
    query: Vec<(String, String)>,
    body: Bytes,
}

impl IncomingRequest {
    /// Build from a method and URI, decoding the query string
    pub fn new(method: Method, uri: &Uri) -> Result<Self, JsonApiError> {
        let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(uri).map_err(|e| {
            JsonApiError::bad_request(codes::INVALID_ATTRS, "Malformed query string")
                .with_description(e.body_text())
        })?;

        Ok(Self {
            method,
            id: None,
            path: uri.path().to_string(),
            raw_query: uri.query().map(str::to_string),
            query,
            body: Bytes::new(),
        })
    }

    /// Set the route key
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the raw body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn with_json(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }
}

impl ApiRequest for IncomingRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn resource_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}
