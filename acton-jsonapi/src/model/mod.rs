//! Resource model adapter
//!
//! Records returned by the store carry their attributes, loaded relations and
//! a shared [`ModelSchema`]; [`Record::to_document`] turns them into JSON:API
//! resource objects with relationship linkage.

mod record;
mod schema;

pub use record::{Record, Related};
pub use schema::{pluralize, ModelSchema, RelationDef, RelationKind, RelationSource};
