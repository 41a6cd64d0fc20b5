//! Crate error type.

use thiserror::Error;

/// Error raised by a user-supplied normalization hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors surfaced by the containers. None of them are retried internally.
#[derive(Error, Debug)]
pub enum Error {
    /// `emplace` was called with neither an insert nor an update handler.
    #[error("at least one emplace handler must be provided")]
    MissingHandler,

    /// `emplace` found no entry for the key and only an update handler was given.
    #[error("emplace needs an insert handler for an absent key")]
    MissingInsert,

    /// `reduce` on an empty container with no initial value.
    #[error("reduce of an empty collection with no initial value")]
    EmptyReduce,

    /// A normalization hook failed; the container was left unchanged.
    #[error("normalization hook failed")]
    Coercion(#[source] HookError),
}

impl Error {
    /// True for misuse of the `emplace` handler shape.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingHandler | Error::MissingInsert)
    }
}
