//! Request Context
//!
//! Turns a transport request into a [`RequestContext`]: route key, includes,
//! sort, filters, pagination, and lazy accessors for the payload's attributes
//! and relationship [`Linkage`].

mod adapter;
mod context;
mod linkage;

pub use adapter::{ApiRequest, IncomingRequest};
pub use context::{PageSpec, RequestContext};
pub use linkage::{Linkage, ResourceIdentifier};
