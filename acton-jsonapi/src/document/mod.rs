//! Response Builder
//!
//! [`ResponseDocument`] holds the primary body and the other top-level
//! members of a JSON:API document together with the HTTP status.
//! [`PaginationLinks`] derives `self`/`first`/`last`/`prev`/`next` from the
//! request URL and a [`PaginationMeta`].

mod pagination;
mod response;

pub use pagination::{PaginationLinks, PaginationMeta};
pub use response::{ErrorObject, ResponseDocument, JSONAPI_CONTENT_TYPE};
