//! Resource handler trait
//!
//! A [`ResourceHandler`] serves one resource type. It names its store, static
//! configuration, and schema; the four operation methods default to the
//! composable functions in [`defaults`](super::defaults), so a handler only
//! overrides what it needs and can still call the default from its override.
//!
//! Uses RPITIT (Return Position Impl Trait In Traits) for async methods
//! without `async_trait`.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_jsonapi::handlers::{handle_get_default, HandlerResult, ResourceHandler};
//!
//! impl ResourceHandler for ArticleHandler {
//!     type Store = PgStore;
//!
//!     fn store(&self) -> &PgStore { &self.store }
//!     fn config(&self) -> &ResourceConfig { &self.config }
//!     fn schema(&self) -> &Arc<ModelSchema> { &self.schema }
//!
//!     async fn handle_get(&self, ctx: &RequestContext) -> HandlerResult {
//!         let outcome = handle_get_default(self, ctx).await?;
//!         self.audit.record_read(ctx).await;
//!         Ok(outcome)
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use super::config::ResourceConfig;
use super::defaults::{
    handle_delete_default, handle_get_default, handle_post_default, handle_put_default,
};
use super::error::JsonApiError;
use super::validation::{AcceptAll, Validator};
use crate::document::PaginationMeta;
use crate::model::{ModelSchema, Record, RelationDef, Related};
use crate::repository::{MemoryStore, ResourceStore};
use crate::request::RequestContext;

/// One page of a paged fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    pub meta: PaginationMeta,
}

/// Successful result of a handler operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A single record
    Record(Record),
    /// An unpaged list
    Collection(Vec<Record>),
    /// A paged list
    Page(Page),
    /// An updated record; `changed` is set when persistence altered
    /// attributes the client did not send
    Updated { record: Record, changed: bool },
}

/// Handler result; `Ok(None)` means the addressed record does not exist
pub type HandlerResult = Result<Option<Outcome>, JsonApiError>;

/// Serves one resource type
pub trait ResourceHandler: Send + Sync {
    /// Persistence engine
    type Store: ResourceStore;

    fn store(&self) -> &Self::Store;

    fn config(&self) -> &ResourceConfig;

    /// Schema of the served model
    fn schema(&self) -> &Arc<ModelSchema>;

    /// Validator consulted on create
    fn validator(&self) -> &dyn Validator {
        &AcceptAll
    }

    /// Materialize a relation declared as computed
    ///
    /// Defaults to an empty value of the relation's cardinality.
    fn compute_relation(
        &self,
        _record: &Record,
        relation: &RelationDef,
    ) -> impl Future<Output = Result<Related, JsonApiError>> + Send {
        let related = Related::empty(relation.kind);
        async move { Ok(related) }
    }

    fn handle_get(&self, ctx: &RequestContext) -> impl Future<Output = HandlerResult> + Send {
        handle_get_default(self, ctx)
    }

    fn handle_post(&self, ctx: &RequestContext) -> impl Future<Output = HandlerResult> + Send {
        handle_post_default(self, ctx)
    }

    fn handle_put(&self, ctx: &RequestContext) -> impl Future<Output = HandlerResult> + Send {
        handle_put_default(self, ctx)
    }

    fn handle_delete(&self, ctx: &RequestContext) -> impl Future<Output = HandlerResult> + Send {
        handle_delete_default(self, ctx)
    }
}

/// A handler assembled from parts
///
/// Enough for resources that only need the default operations.
///
/// # Example
///
/// ```rust
/// use acton_jsonapi::handlers::{ResourceConfig, ResourceHandler, StandardHandler};
/// use acton_jsonapi::model::ModelSchema;
/// use acton_jsonapi::repository::MemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new().with_schema(ModelSchema::new("tags")));
/// let handler = StandardHandler::new(store, ResourceConfig::new("tags")).unwrap();
/// assert_eq!(handler.schema().resource_type, "tags");
/// ```
pub struct StandardHandler<S> {
    store: Arc<S>,
    config: ResourceConfig,
    schema: Arc<ModelSchema>,
    validator: Box<dyn Validator>,
}

impl StandardHandler<MemoryStore> {
    /// Handler over a memory store; `None` when the type is not registered
    pub fn new(store: Arc<MemoryStore>, config: ResourceConfig) -> Option<Self> {
        let schema = store.schema(&config.resource_type)?;
        Some(Self::with_schema(store, config, schema))
    }
}

impl<S: ResourceStore> StandardHandler<S> {
    /// Handler over any store with an explicit schema
    pub fn with_schema(store: Arc<S>, config: ResourceConfig, schema: Arc<ModelSchema>) -> Self {
        Self {
            store,
            config,
            schema,
            validator: Box::new(AcceptAll),
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }
}

impl<S: ResourceStore> ResourceHandler for StandardHandler<S> {
    type Store = S;

    fn store(&self) -> &S {
        &self.store
    }

    fn config(&self) -> &ResourceConfig {
        &self.config
    }

    fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }
}
