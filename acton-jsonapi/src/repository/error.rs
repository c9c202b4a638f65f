//! Repository error types
//!
//! Errors raised by a [`ResourceStore`](super::ResourceStore) implementation.
//! The handler layer never inspects the kind beyond logging: every repository
//! failure surfaces to the client as `500 Database Request Failed` with the
//! message attached as detail.
//!
//! # Example
//!
//! ```rust
//! use acton_jsonapi::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
//!
//! let error = RepositoryError::database_error(RepositoryOperation::Save, "disk full");
//! assert_eq!(error.kind, RepositoryErrorKind::DatabaseError);
//! assert_eq!(error.operation, RepositoryOperation::Save);
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Finding a single record by key
    Find,
    /// Running a filtered/sorted/paged query
    Query,
    /// Counting records matching a query
    Count,
    /// Inserting or updating a record
    Save,
    /// Deleting a record
    Delete,
    /// Loading an association of a record
    LoadRelation,
    /// Adding members to a to-many association
    Attach,
    /// Replacing the members of a to-many association
    Sync,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Find => write!(f, "find"),
            Self::Query => write!(f, "query"),
            Self::Count => write!(f, "count"),
            Self::Save => write!(f, "save"),
            Self::Delete => write!(f, "delete"),
            Self::LoadRelation => write!(f, "load_relation"),
            Self::Attach => write!(f, "attach"),
            Self::Sync => write!(f, "sync"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Record was not found where one was required
    NotFound,
    /// Database constraint violation
    ConstraintViolation,
    /// Underlying database error
    DatabaseError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured repository error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message, reported to clients as detail
    pub message: String,
    /// The resource type involved
    pub resource_type: Option<String>,
    /// The key of the record involved
    pub resource_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            resource_type: None,
            resource_id: None,
        }
    }

    /// Create a "not found" error with record context
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_jsonapi::repository::RepositoryError;
    ///
    /// let error = RepositoryError::not_found("articles", "7");
    /// assert_eq!(error.resource_id, Some("7".to_string()));
    /// ```
    pub fn not_found(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Find,
            RepositoryErrorKind::NotFound,
            "Record not found",
        )
        .with_resource(resource_type, resource_id)
    }

    /// Create a constraint violation error
    pub fn constraint_violation(
        operation: RepositoryOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(operation, RepositoryErrorKind::ConstraintViolation, message)
    }

    /// Create a database error
    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// Add record context to an existing error
    #[must_use]
    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(resource_type), Some(resource_id)) = (&self.resource_type, &self.resource_id)
        {
            write!(f, " [{}: {}]", resource_type, resource_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}
