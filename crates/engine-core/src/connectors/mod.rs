pub mod memory;
pub mod source;
