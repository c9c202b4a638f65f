//! Relationship linkage payloads

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

use crate::handlers::{codes, JsonApiError};

/// `{type, id}` reference to a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// Numeric ids are accepted and stringified
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Linkage of one relation, decided by payload shape at parse time
///
/// A JSON object is a to-one reference, a JSON array is a to-many list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

impl Linkage {
    /// Parse a raw linkage value
    ///
    /// Fails with `400 Linkage item is malformed` unless the value is an
    /// object, or an array of objects, where every entry carries a string
    /// `type` and a string or numeric `id`.
    pub fn from_value(value: &Value) -> Result<Self, JsonApiError> {
        // Identifiers are objects only; serde would also read a struct from a sequence
        let entries_are_objects = match value {
            Value::Object(_) => true,
            Value::Array(items) => items.iter().all(Value::is_object),
            _ => false,
        };
        if !entries_are_objects {
            return Err(malformed());
        }
        Self::deserialize(value).map_err(|_| malformed())
    }

    pub fn is_to_one(&self) -> bool {
        matches!(self, Self::One(_))
    }

    pub fn is_to_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Referenced identifiers in payload order
    pub fn identifiers(&self) -> &[ResourceIdentifier] {
        match self {
            Self::One(identifier) => std::slice::from_ref(identifier),
            Self::Many(identifiers) => identifiers,
        }
    }
}

pub(crate) fn malformed() -> JsonApiError {
    JsonApiError::bad_request(codes::INVALID_ATTRS, "Linkage item is malformed")
        .with_description("Every linkage entry requires both a type and an id")
}
