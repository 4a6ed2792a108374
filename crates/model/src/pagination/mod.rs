pub mod cursor;
pub mod window;
