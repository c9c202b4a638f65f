//! Persistence collaborator abstractions
//!
//! The handler layer talks to storage exclusively through [`ResourceStore`].
//! Queries are described by [`ResourceQuery`] (equality filters, ordered
//! multi-column sort, optional pagination); failures are reported as
//! [`RepositoryError`].
//!
//! [`MemoryStore`] is a complete in-memory implementation.

mod error;
mod memory;
mod query;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::MemoryStore;
pub use query::{
    FilterCondition, FilterValue, OrderDirection, Pagination, ResourceQuery, SortSpec,
};
pub use traits::{RepositoryResult, ResourceStore};
