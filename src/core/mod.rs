pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod profile;
pub mod rate_limit;
pub mod scope;
