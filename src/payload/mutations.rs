//! Username-derived password candidates

use crate::core::config::PasswordGeneration;
use std::collections::HashSet;

/// Always added, whatever the wordlist holds.
pub const COMMON_PASSWORDS: &[&str] = &["123456", "password", "admin", "qwerty", "letmein"];

#[derive(Debug, Clone)]
pub struct PasswordSpace {
    suffixes: Vec<String>,
    prefixes: Vec<String>,
}

impl PasswordSpace {
    pub fn new(suffixes: Vec<String>, prefixes: Vec<String>) -> Self {
        Self { suffixes, prefixes }
    }

    pub fn from_config(cfg: &PasswordGeneration) -> Self {
        Self::new(cfg.common_suffixes.clone(), cfg.common_prefixes.clone())
    }

    /// Expand the base list. The result holds no duplicates; wordlist order
    /// comes first, then derived candidates in generation order.
    pub fn expand(&self, base: &[String], usernames: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut push = |candidate: String| {
            if seen.insert(candidate.clone()) {
                out.push(candidate);
            }
        };

        for password in base {
            push(password.clone());
        }

        for username in usernames {
            let lower = username.to_lowercase();

            push(username.clone());
            push(lower.clone());

            for suffix in &self.suffixes {
                push(format!("{}{}", username, suffix));
                push(format!("{}{}", lower, suffix));
            }

            for prefix in &self.prefixes {
                push(format!("{}{}", prefix, username));
                push(format!("{}{}", prefix, lower));
            }
        }

        for common in COMMON_PASSWORDS {
            push(common.to_string());
        }

        out
    }
}
