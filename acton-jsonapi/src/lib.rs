//! # acton-jsonapi
//!
//! JSON:API request/response layer over a typed-record persistence engine.
//! Translates HTTP requests into fetch, create, update and delete operations
//! and serializes records back into JSON:API documents.
//!
//! ## Features
//!
//! - **Request parsing**: includes, signed multi-column sort, `filter[col]`
//!   equality filters, `page[number]`/`page[size]` pagination
//! - **Default operations**: overridable per resource, composable from overrides
//! - **Relationships**: to-one and to-many linkage, validated before any write
//! - **Documents**: included set deduplicated by `(type, id)`, pagination links,
//!   non-fatal errors, singular or collection bodies
//! - **Errors**: scoped bitmask error codes with typed HTTP status mapping
//! - **Stores**: the [`ResourceStore`](repository::ResourceStore) seam plus an
//!   in-memory implementation
//!
//! ## Example
//!
//! ```rust,no_run
//! use acton_jsonapi::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config);
//!
//!     let store = Arc::new(
//!         MemoryStore::new()
//!             .with_schema(
//!                 ModelSchema::new("articles")
//!                     .with_relation(RelationDef::to_one("author", "people"))
//!                     .with_timestamps(),
//!             )
//!             .with_schema(ModelSchema::new("people")),
//!     );
//!
//!     let articles = StandardHandler::new(
//!         Arc::clone(&store),
//!         ResourceConfig::new("articles").with_exposed_relations(["author"]),
//!     )
//!     .ok_or_else(|| std::io::Error::other("articles not registered"))?;
//!     let people = StandardHandler::new(store, ResourceConfig::new("people"))
//!         .ok_or_else(|| std::io::Error::other("people not registered"))?;
//!
//!     let app = resource_router(Arc::new(
//!         Dispatcher::new(articles).with_settings(config.jsonapi.clone()),
//!     ))
//!     .merge(resource_router(Arc::new(
//!         Dispatcher::new(people).with_settings(config.jsonapi.clone()),
//!     )));
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod handlers;
pub mod model;
pub mod observability;
pub mod relations;
pub mod repository;
pub mod request;
pub mod router;
pub mod server;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, JsonApiConfig, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::observability::init_tracing;
    pub use crate::server::Server;

    pub use crate::document::{
        ErrorObject, PaginationLinks, PaginationMeta, ResponseDocument, JSONAPI_CONTENT_TYPE,
    };
    pub use crate::handlers::{
        codes, handle_delete_default, handle_get_default, handle_post_default,
        handle_put_default, AcceptAll, Dispatcher, ErrorKind, HandlerResult, JsonApiError,
        Operation, Outcome, Page, RequiredAttributes, ResourceConfig, ResourceHandler,
        StandardHandler, ValidationErrors, Validator,
    };
    pub use crate::model::{ModelSchema, Record, RelationDef, RelationKind, Related};
    pub use crate::repository::{
        FilterCondition, FilterValue, MemoryStore, OrderDirection, Pagination, RepositoryError,
        RepositoryErrorKind, RepositoryOperation, RepositoryResult, ResourceQuery, ResourceStore,
        SortSpec,
    };
    pub use crate::request::{
        ApiRequest, IncomingRequest, Linkage, RequestContext, ResourceIdentifier,
    };
    pub use crate::router::resource_router;

    // Re-export axum types
    pub use axum::Router;

    // Re-export HTTP types
    pub use http::{Method, StatusCode, Uri};

    // Re-export serde for convenience
    pub use serde::{Deserialize, Serialize};

    // Re-export tracing macros
    pub use tracing::{debug, error, info, warn};
}
