//! Relationship Resolver
//!
//! [`RelationshipResolver`] decides which relations a response exposes, loads
//! them, and collects the deduplicated included set. The linkage functions
//! validate and persist relationship payloads for create and update.

mod linkage;
mod resolver;

pub use linkage::{
    resolve_linkage, save_to_many_links, save_to_one_links, LinkMode, LinkagePlan,
};
pub use resolver::RelationshipResolver;
