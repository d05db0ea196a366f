pub mod loader;
pub mod mutations;
