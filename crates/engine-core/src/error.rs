use model::error::ModelError;
use planner::error::PlannerError;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a [`QueryExecutor`](crate::connectors::source::QueryExecutor).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// The filter uses an operator the executor does not evaluate.
    #[error("Unsupported query operator: {0}")]
    UnsupportedOperator(String),

    /// The filter is structurally invalid, e.g. `$or` without an array.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// The projection mixes inclusions and exclusions or is otherwise invalid.
    #[error("Invalid projection: {0}")]
    InvalidProjection(String),

    /// The sort document has a value other than 1 or -1.
    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    /// Any error raised by a database driver.
    #[error("Driver error: {0}")]
    Driver(String),
}

/// Errors raised while fetching a window.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    #[error("Invalid request: {0}")]
    Model(#[from] ModelError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// A returned document could not be mapped onto the requested type.
    #[error("Mapping error: {0}")]
    Mapping(#[from] bson::de::Error),

    /// The request asks for more items than a window may hold.
    #[error("Page size {requested} exceeds the maximum of {max}")]
    PageSizeExceeded { requested: usize, max: usize },

    /// The window query did not finish within the configured time limit.
    #[error("Query on '{collection}' timed out after {after:?}")]
    Timeout { collection: String, after: Duration },
}
