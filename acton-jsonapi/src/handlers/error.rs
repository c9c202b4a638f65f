//! API error types for resource handler operations
//!
//! Every fatal failure inside the handler pipeline is a [`JsonApiError`]. The
//! dispatcher is the single place that renders it into an error document; the
//! resource's error scope is ORed into the code at that point.
//!
//! # Example
//!
//! ```rust
//! use acton_jsonapi::handlers::{codes, ErrorKind, JsonApiError};
//! use axum::http::StatusCode;
//!
//! let error = JsonApiError::not_found("articles", "42");
//! assert_eq!(error.kind, ErrorKind::NotFound);
//! assert_eq!(error.code, codes::UNKNOWN_ID);
//! assert_eq!(error.status(), StatusCode::NOT_FOUND);
//! ```

use std::fmt;

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};

use super::validation::ValidationErrors;
use crate::document::{ErrorObject, ResponseDocument};
use crate::repository::RepositoryError;

/// Fixed error codes, combined with a per-resource scope bitmask
pub mod codes {
    /// The requested key does not exist
    pub const UNKNOWN_ID: u32 = 1;
    /// `include` named relations the resource does not expose
    pub const UNKNOWN_LINKED_RESOURCES: u32 = 2;
    /// The operation requires a key in the route
    pub const NO_ID: u32 = 4;
    /// Attributes, sort, pagination or linkage are malformed
    pub const INVALID_ATTRS: u32 = 8;
    /// The resource does not support the HTTP method
    pub const HTTP_METHOD_NOT_ALLOWED: u32 = 16;
    /// The operation does not accept a key in the route
    pub const ID_PROVIDED_NOT_ALLOWED: u32 = 32;
    /// The body has no `data` member
    pub const MISSING_DATA: u32 = 64;
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed request (400)
    BadRequest,
    /// Missing resource (404)
    NotFound,
    /// Unsupported method (405)
    MethodNotAllowed,
    /// Resource type conflict (409)
    Conflict,
    /// Server or persistence failure (500)
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad_request"),
            Self::NotFound => write!(f, "not_found"),
            Self::MethodNotAllowed => write!(f, "method_not_allowed"),
            Self::Conflict => write!(f, "conflict"),
            Self::Internal => write!(f, "internal_error"),
        }
    }
}

impl ErrorKind {
    /// HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A fatal failure of a JSON:API request
#[derive(Debug, Clone, PartialEq)]
pub struct JsonApiError {
    /// Category, which fixes the HTTP status
    pub kind: ErrorKind,
    /// Fixed code from [`codes`], before scoping
    pub code: u32,
    /// Short summary
    pub title: String,
    /// Longer human-readable explanation
    pub description: Option<String>,
    /// Opaque diagnostic payload
    pub detail: Option<Value>,
    /// Per-field validation messages
    pub validation: Option<ValidationErrors>,
}

impl JsonApiError {
    /// Create a new API error
    pub fn new(kind: ErrorKind, code: u32, title: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            title: title.into(),
            description: None,
            detail: None,
            validation: None,
        }
    }

    /// 400 with the given code
    pub fn bad_request(code: u32, title: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, code, title)
    }

    /// 404 for a key of a resource type
    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new(ErrorKind::NotFound, codes::UNKNOWN_ID, "Record not found")
            .with_description(format!("No {} record with id '{}'", resource_type, id))
    }

    /// 405 for an unsupported method
    pub fn method_not_allowed(method: &Method) -> Self {
        Self::new(
            ErrorKind::MethodNotAllowed,
            codes::HTTP_METHOD_NOT_ALLOWED,
            "Method not allowed",
        )
        .with_description(format!("{} is not supported by this resource", method))
    }

    /// 409 with the given title
    pub fn conflict(title: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, codes::INVALID_ATTRS, title)
    }

    /// 400 raised when the route carries no key
    pub fn no_id() -> Self {
        Self::bad_request(codes::NO_ID, "No ID provided")
    }

    /// 400 raised when the body has no `data` member
    pub fn missing_data() -> Self {
        Self::bad_request(codes::MISSING_DATA, "Bad Request").with_description(
            "Payload either contains malformed JSON or is missing the data parameter",
        )
    }

    /// 400 raised when validation rejects the attributes
    pub fn validation_failed(errors: ValidationErrors) -> Self {
        let mut error = Self::bad_request(codes::INVALID_ATTRS, "Bad Request");
        error.validation = Some(errors);
        error
    }

    /// 500 wrapping a persistence failure
    pub fn database(error: &RepositoryError) -> Self {
        Self::new(ErrorKind::Internal, 0, "Database Request Failed")
            .with_detail(Value::String(error.message.clone()))
    }

    /// Attach a description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an opaque detail payload
    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// HTTP status code
    pub fn status(&self) -> StatusCode {
        self.kind.status_code()
    }

    /// Render into error objects, ORing `scope` into every code
    ///
    /// Validation failures expand into one object per field message; every
    /// other error renders as exactly one object.
    pub fn error_objects(&self, scope: u32) -> Vec<ErrorObject> {
        let code = scope | self.code;
        match &self.validation {
            Some(errors) if !errors.is_empty() => errors
                .iter()
                .map(|(field, message)| ErrorObject {
                    code,
                    title: self.title.clone(),
                    description: Some(message.to_string()),
                    details: Some(json!({ "attribute": field })),
                })
                .collect(),
            _ => vec![ErrorObject {
                code,
                title: self.title.clone(),
                description: self.description.clone(),
                details: self.detail.clone(),
            }],
        }
    }

    /// Error document for this error under a resource scope
    pub fn into_document(self, scope: u32) -> ResponseDocument {
        ResponseDocument::errors(self.status(), self.error_objects(scope))
    }
}

impl fmt::Display for JsonApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON:API {} error {}: {}", self.kind, self.code, self.title)?;
        if let Some(description) = &self.description {
            write!(f, " ({})", description)?;
        }
        Ok(())
    }
}

impl std::error::Error for JsonApiError {}

impl From<RepositoryError> for JsonApiError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!(
            operation = %err.operation,
            kind = %err.kind,
            resource_type = ?err.resource_type,
            resource_id = ?err.resource_id,
            "Repository error: {}", err.message
        );
        Self::database(&err)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        tracing::error!(kind = %self.kind, code = self.code, "API error: {}", self.title);
        self.into_document(0).into_response()
    }
}
