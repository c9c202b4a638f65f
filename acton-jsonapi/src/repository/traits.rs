//! The persistence collaborator seam
//!
//! [`ResourceStore`] is the only way the handler layer touches stored data. It
//! uses RPITIT (Return Position Impl Trait In Traits) for async methods
//! without `async_trait`, so implementations are plain `async fn`s.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_jsonapi::repository::{RepositoryResult, ResourceQuery, ResourceStore};
//!
//! impl ResourceStore for PgStore {
//!     async fn find(&self, resource_type: &str, id: &str) -> RepositoryResult<Option<Record>> {
//!         let row = sqlx::query("SELECT * FROM articles WHERE id = $1")
//!             .bind(id)
//!             .fetch_optional(&self.pool)
//!             .await?;
//!         Ok(row.map(|row| self.to_record(resource_type, row)))
//!     }
//!     // ... other methods
//! }
//! ```

use std::future::Future;

use super::error::RepositoryError;
use super::query::ResourceQuery;
use crate::model::{Record, RelationDef, Related};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Typed-record persistence engine used by the resource handlers
///
/// One call is one unit of work; there is no transaction spanning calls, so a
/// failure after an earlier successful call leaves that earlier write in place.
pub trait ResourceStore: Send + Sync {
    /// Find a record by key
    ///
    /// Returns `Ok(None)` when no record of that type has the key.
    fn find(
        &self,
        resource_type: &str,
        id: &str,
    ) -> impl Future<Output = RepositoryResult<Option<Record>>> + Send;

    /// Fetch records matching a query, honoring its sort and pagination
    fn fetch(
        &self,
        query: &ResourceQuery,
    ) -> impl Future<Output = RepositoryResult<Vec<Record>>> + Send;

    /// Count records matching the query's filters
    ///
    /// Sort and pagination are ignored.
    fn count(&self, query: &ResourceQuery) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Insert or update a record
    ///
    /// Assigns a key to unsaved records and writes back any attribute the
    /// store maintains itself (timestamps, defaults).
    fn save(&self, record: &mut Record) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Delete a record
    fn delete(&self, record: &Record) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Load an association of a record
    fn load_relation(
        &self,
        record: &Record,
        relation: &RelationDef,
    ) -> impl Future<Output = RepositoryResult<Related>> + Send;

    /// Add members to a to-many association, keeping existing ones
    fn attach(
        &self,
        record: &Record,
        relation: &RelationDef,
        ids: &[String],
    ) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Replace the members of a to-many association
    fn sync(
        &self,
        record: &Record,
        relation: &RelationDef,
        ids: &[String],
    ) -> impl Future<Output = RepositoryResult<()>> + Send;
}
