use thiserror::Error;

/// Errors raised by the pagination value types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A sort property could not be located on an entity.
    #[error("Cannot resolve sort field '{0}' on entity")]
    UnresolvableField(String),

    /// Cursor requests must ask for at least one element.
    #[error("Invalid page size: {0} (must be greater than zero)")]
    InvalidPageSize(usize),

    /// A sort clause could not be parsed.
    #[error("Invalid sort expression: {0}")]
    InvalidSort(String),
}
