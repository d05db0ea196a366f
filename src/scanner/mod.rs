//! Reconnaissance and login surface discovery

pub mod fingerprint;
pub mod forms;
pub mod recon;
