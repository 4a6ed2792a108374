pub mod entity;
pub mod error;
pub mod pagination;
pub mod query;
pub mod sort;
