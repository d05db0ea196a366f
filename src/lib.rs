//! AUTHSMITH
//!
//! Login surface discovery and credential testing for authorized web
//! assessments. The pipeline runs reconnaissance, form inference, password
//! space expansion and the attack itself against a single target host.

pub mod attack;
pub mod cli;
pub mod core;
pub mod http;
pub mod payload;
pub mod reporting;
pub mod scanner;
pub mod validation;
