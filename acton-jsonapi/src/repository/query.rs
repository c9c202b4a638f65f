//! Query description handed to the store
//!
//! A [`ResourceQuery`] carries everything a list fetch needs: equality
//! filters (AND-combined), an ordered multi-column sort, and optional
//! pagination.
//!
//! # Example
//!
//! ```rust
//! use acton_jsonapi::repository::{FilterCondition, OrderDirection, Pagination, ResourceQuery, SortSpec};
//!
//! let query = ResourceQuery::new("articles")
//!     .filter(FilterCondition::eq("status", "published"))
//!     .sort_by(SortSpec::new("title", OrderDirection::Descending))
//!     .paginate(Pagination::page(2, 10));
//!
//! assert_eq!(query.filters.len(), 1);
//! assert_eq!(query.pagination.map(|p| p.offset), Some(10));
//! ```

use std::fmt;

use serde_json::Value;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// One column of a multi-column sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Column to sort by
    pub column: String,
    /// Sort direction
    pub direction: OrderDirection,
}

impl SortSpec {
    /// Create a sort column
    pub fn new(column: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

/// Pagination parameters for limiting query results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return
    pub limit: u64,
}

impl Pagination {
    /// Create new pagination parameters
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Pagination for a 1-indexed page number
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_jsonapi::repository::Pagination;
    ///
    /// let page3 = Pagination::page(3, 20);
    /// assert_eq!(page3.offset, 40);
    /// assert_eq!(page3.limit, 20);
    /// ```
    #[must_use]
    pub const fn page(page_number: u64, page_size: u64) -> Self {
        let offset = page_number.saturating_sub(1) * page_size;
        Self {
            offset,
            limit: page_size,
        }
    }
}

/// A value that can be used in filter conditions
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// String value
    String(String),
    /// 64-bit integer value
    Integer(i64),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl FilterValue {
    /// Equality against a stored JSON value
    ///
    /// Query-string filters arrive as strings, so a string filter also matches
    /// numbers and booleans whose textual form is identical.
    pub fn matches(&self, stored: &Value) -> bool {
        match (self, stored) {
            (Self::Null, Value::Null) => true,
            (Self::String(expected), Value::String(actual)) => expected == actual,
            (Self::String(expected), Value::Number(actual)) => *expected == actual.to_string(),
            (Self::String(expected), Value::Bool(actual)) => *expected == actual.to_string(),
            (Self::Integer(expected), Value::Number(actual)) => actual.as_i64() == Some(*expected),
            (Self::Integer(expected), Value::String(actual)) => *actual == expected.to_string(),
            (Self::Boolean(expected), Value::Bool(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "'{}'", s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Null => write!(f, "NULL"),
        }
    }
}

/// Equality condition on one column
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// Column name; `id` addresses the primary key
    pub column: String,
    /// Expected value
    pub value: FilterValue,
}

impl FilterCondition {
    /// Create an equality condition
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value)
    }
}

/// A list query against one resource type
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceQuery {
    /// Resource type to query
    pub resource_type: String,
    /// AND-combined equality filters
    pub filters: Vec<FilterCondition>,
    /// Sort columns in precedence order
    pub sort: Vec<SortSpec>,
    /// Optional page window
    pub pagination: Option<Pagination>,
}

impl ResourceQuery {
    /// Unfiltered, unsorted query over a resource type
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            filters: Vec::new(),
            sort: Vec::new(),
            pagination: None,
        }
    }

    /// Add a filter condition
    #[must_use]
    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.filters.push(condition);
        self
    }

    /// Append a sort column
    #[must_use]
    pub fn sort_by(mut self, spec: SortSpec) -> Self {
        self.sort.push(spec);
        self
    }

    /// Restrict to a page window
    #[must_use]
    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}
