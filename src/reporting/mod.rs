//! Run reports
//!
//! - model: serialisable report types
//! - reporter: per-attempt outcome sink with counters
//! - json / text: renderers

pub mod json;
pub mod model;
pub mod reporter;
pub mod text;
