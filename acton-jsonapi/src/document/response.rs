//! Response document assembly

use std::collections::BTreeMap;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::pagination::PaginationLinks;
use crate::model::Record;

/// Media type of every JSON:API document
pub const JSONAPI_CONTENT_TYPE: &str = "application/vnd.api+json";

/// One entry of a document's `errors` array
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorObject {
    /// Fixed code ORed with the resource scope
    pub code: u32,
    /// Short summary
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// A JSON:API top-level document plus its HTTP status
///
/// The primary body is an ordered list of resource objects. When flagged
/// singular it serializes as its only element (or `null`), otherwise as an
/// array. Other top-level members are assigned by name and omitted when
/// empty.
///
/// # Example
///
/// ```rust
/// use acton_jsonapi::document::ResponseDocument;
/// use axum::http::StatusCode;
/// use serde_json::json;
///
/// let mut document = ResponseDocument::new(StatusCode::OK);
/// document.set_data(vec![json!({"id": "1", "type": "tags", "attributes": {}})]);
/// document.set_body_singular(true);
/// document.set_field("meta", json!({}));
///
/// assert_eq!(document.to_json()["data"]["id"], "1");
/// assert!(document.to_json().get("meta").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDocument {
    status: StatusCode,
    data: Option<Vec<Value>>,
    singular: bool,
    fields: BTreeMap<String, Value>,
}

impl ResponseDocument {
    /// Empty document with a status
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            data: None,
            singular: false,
            fields: BTreeMap::new(),
        }
    }

    /// Document whose primary body is `records`
    pub fn with_records(status: StatusCode, records: &[Record]) -> Self {
        let mut document = Self::new(status);
        document.set_data(records.iter().map(Record::to_document).collect());
        document
    }

    /// Error document
    pub fn errors(status: StatusCode, errors: Vec<ErrorObject>) -> Self {
        let mut document = Self::new(status);
        document.set_errors(errors);
        document
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Replace the primary body
    pub fn set_data(&mut self, resources: Vec<Value>) {
        self.data = Some(resources);
    }

    /// Serialize the body as a bare object rather than an array
    pub fn set_body_singular(&mut self, singular: bool) {
        self.singular = singular;
    }

    /// Assign a top-level member
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn set_links(&mut self, links: &PaginationLinks) {
        self.set_field("links", serde_json::to_value(links).unwrap_or(Value::Null));
    }

    pub fn set_included(&mut self, included: &[Record]) {
        self.set_field(
            "included",
            Value::Array(included.iter().map(Record::to_document).collect()),
        );
    }

    pub fn set_errors(&mut self, errors: Vec<ErrorObject>) {
        self.set_field("errors", serde_json::to_value(errors).unwrap_or(Value::Null));
    }

    /// The serialized top-level object
    pub fn to_json(&self) -> Value {
        let mut document = Map::new();
        if let Some(resources) = &self.data {
            let body = if self.singular {
                resources.first().cloned().unwrap_or(Value::Null)
            } else {
                Value::Array(resources.clone())
            };
            document.insert("data".to_string(), body);
        }
        for (name, value) in &self.fields {
            if !is_empty_member(value) {
                document.insert(name.clone(), value.clone());
            }
        }
        Value::Object(document)
    }
}

fn is_empty_member(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(members) => members.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl IntoResponse for ResponseDocument {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NO_CONTENT {
            return self.status.into_response();
        }
        (
            self.status,
            [(header::CONTENT_TYPE, JSONAPI_CONTENT_TYPE)],
            self.to_json().to_string(),
        )
            .into_response()
    }
}
