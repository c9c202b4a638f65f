//! Per-resource handler configuration

use std::fmt;

use axum::http::{Method, StatusCode};

/// A CRUD operation, selected by HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// GET
    Fetch,
    /// POST
    Create,
    /// PUT
    Update,
    /// DELETE
    Delete,
}

impl Operation {
    /// All operations
    pub const ALL: [Operation; 4] = [Self::Fetch, Self::Create, Self::Update, Self::Delete];

    /// Operation for an HTTP method; other verbs have none
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Self::Fetch),
            Method::POST => Some(Self::Create),
            Method::PUT => Some(Self::Update),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    /// Status of a successful response
    ///
    /// A PUT answers `204` unless persistence changed the record beyond the
    /// request, in which case the body is returned with `200`.
    pub fn success_status(&self, changed: bool) -> StatusCode {
        match self {
            Self::Fetch => StatusCode::OK,
            Self::Create => StatusCode::CREATED,
            Self::Update if changed => StatusCode::OK,
            Self::Update | Self::Delete => StatusCode::NO_CONTENT,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Static configuration of one resource type
///
/// # Example
///
/// ```rust
/// use acton_jsonapi::handlers::{Operation, ResourceConfig};
///
/// let config = ResourceConfig::new("articles")
///     .with_exposed_relations(["author", "comments"])
///     .with_error_scope(0x100)
///     .with_operations([Operation::Fetch]);
///
/// assert!(config.supports(Operation::Fetch));
/// assert!(!config.supports(Operation::Delete));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
    /// JSON:API type served by the handler
    pub resource_type: String,
    /// Relations clients may request through `include`
    pub exposed_relations: Vec<String>,
    /// Bitmask ORed into every error code
    pub error_scope: u32,
    /// Supported operations
    pub operations: Vec<Operation>,
}

impl ResourceConfig {
    /// All operations, nothing exposed, scope 0
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            exposed_relations: Vec::new(),
            error_scope: 0,
            operations: Operation::ALL.to_vec(),
        }
    }

    #[must_use]
    pub fn with_exposed_relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exposed_relations = relations.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_error_scope(mut self, scope: u32) -> Self {
        self.error_scope = scope;
        self
    }

    #[must_use]
    pub fn with_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations = operations.into_iter().collect();
        self
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    pub fn exposes(&self, relation: &str) -> bool {
        self.exposed_relations.iter().any(|r| r == relation)
    }
}
