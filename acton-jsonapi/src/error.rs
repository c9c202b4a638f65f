//! Crate-level infrastructure errors
//!
//! Request-time failures are [`JsonApiError`](crate::handlers::JsonApiError)
//! values rendered by the dispatcher. This module covers everything around
//! the request path: loading configuration, binding the listener, and store
//! calls made outside a request.

use thiserror::Error;

use crate::repository::RepositoryError;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistence error outside a request
    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
