//! Resource Handler / Dispatcher
//!
//! A [`ResourceHandler`] serves one resource type through four operations
//! selected by HTTP method. Each operation has a default implementation in
//! terms of the handler's [`ResourceStore`](crate::repository::ResourceStore);
//! the [`Dispatcher`] runs the selected operation and shapes the response.
//!
//! # Features
//!
//! - **Operations**: [`Operation`] maps GET/POST/PUT/DELETE to fetch, create,
//!   update and delete; [`ResourceConfig`] lists which ones a resource supports
//! - **Defaults**: [`handle_get_default`] and friends, composable from overrides
//! - **Errors**: [`JsonApiError`] with scoped, bitmask-composed [`codes`]
//! - **Validation**: the [`Validator`] seam consulted on create
//!
//! # Example
//!
//! ```rust
//! use acton_jsonapi::handlers::{Dispatcher, RequiredAttributes, ResourceConfig, StandardHandler};
//! use acton_jsonapi::model::{ModelSchema, RelationDef};
//! use acton_jsonapi::repository::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(
//!     MemoryStore::new()
//!         .with_schema(ModelSchema::new("articles").with_relation(RelationDef::to_one("author", "people")))
//!         .with_schema(ModelSchema::new("people")),
//! );
//! let config = ResourceConfig::new("articles")
//!     .with_exposed_relations(["author"])
//!     .with_error_scope(0x100);
//! let handler = StandardHandler::new(store, config)
//!     .unwrap()
//!     .with_validator(RequiredAttributes::new(["title"]));
//!
//! let dispatcher = Dispatcher::new(handler);
//! assert_eq!(dispatcher.resource_type(), "articles");
//! ```

mod config;
mod defaults;
mod dispatcher;
mod error;
mod traits;
mod validation;

pub use config::{Operation, ResourceConfig};
pub use defaults::{
    handle_delete_default, handle_get_default, handle_post_default, handle_put_default,
};
pub use dispatcher::Dispatcher;
pub use error::{codes, ErrorKind, JsonApiError};
pub use traits::{HandlerResult, Outcome, Page, ResourceHandler, StandardHandler};
pub use validation::{AcceptAll, RequiredAttributes, ValidationErrors, Validator};
