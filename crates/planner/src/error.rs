use model::error::ModelError;
use thiserror::Error;

/// Errors raised while turning a cursor request into a query or a window.
#[derive(Debug, Error, PartialEq)]
pub enum PlannerError {
    /// The keyset does not match the sort it is used with, usually because
    /// a cursor request was reused with a different sort.
    #[error("Invalid cursor state: {0}")]
    InvalidCursorState(String),

    /// The base query or request cannot be paginated.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The base filter already has a top-level `$or` that the keyset predicate would have to share.
    #[error("Base query already declares a top-level $or; combining it with a keyset predicate is rejected")]
    ConflictingDisjunction,

    /// Model-level error, e.g. a sort key that cannot be read from an entity.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
