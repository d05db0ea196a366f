//! Typed configuration document
//!
//! Every section and key is optional in the JSON input; anything missing
//! takes the defaults below.

use crate::core::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_settings: DefaultSettings,
    pub login_detection: LoginDetection,
    pub response_analysis: ResponseAnalysis,
    pub password_generation: PasswordGeneration,
    /// `None` when the section was absent from the document.
    pub rate_limiting: Option<RateLimiting>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    pub max_workers: usize,
    /// Seconds between attempts; used when `rate_limiting` is absent.
    pub delay_between_attempts: f64,
    /// Request timeout in seconds.
    pub timeout: u64,
    pub user_agents: Vec<String>,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            max_workers: 5,
            delay_between_attempts: 1.0,
            timeout: 10,
            user_agents: vec![DEFAULT_USER_AGENT.to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoginDetection {
    pub username_patterns: Vec<String>,
    pub password_patterns: Vec<String>,
    pub common_login_paths: Vec<String>,
}

impl Default for LoginDetection {
    fn default() -> Self {
        Self {
            username_patterns: strings(&["username", "user", "email", "login", "userid", "user_name"]),
            password_patterns: strings(&["password", "pass", "pwd", "userpass"]),
            common_login_paths: strings(&["/login", "/signin", "/auth", "/admin", "/wp-admin"]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponseAnalysis {
    pub success_indicators: Vec<String>,
    pub failure_indicators: Vec<String>,
    pub success_status_codes: Vec<u16>,
    pub failure_status_codes: Vec<u16>,
}

impl Default for ResponseAnalysis {
    fn default() -> Self {
        Self {
            success_indicators: strings(&["dashboard", "welcome", "logout", "profile", "success"]),
            failure_indicators: strings(&["invalid", "incorrect", "failed", "error", "wrong"]),
            success_status_codes: vec![200, 302, 303],
            failure_status_codes: vec![401, 403, 404],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordGeneration {
    pub common_suffixes: Vec<String>,
    pub common_prefixes: Vec<String>,
}

impl Default for PasswordGeneration {
    fn default() -> Self {
        Self {
            common_suffixes: strings(&["123", "1234", "2023", "2024", "admin"]),
            common_prefixes: strings(&["admin", "user", "test"]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimiting {
    pub default_delay: f64,
    pub adaptive_delay: bool,
    pub max_delay: f64,
}

impl Default for RateLimiting {
    fn default() -> Self {
        Self {
            default_delay: 1.0,
            adaptive_delay: false,
            max_delay: 10.0,
        }
    }
}

impl Config {
    /// Load a config document. `None` yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Effective rate-limiting settings, folding in the legacy
    /// `delay_between_attempts` key when the section is absent.
    pub fn rate_limiting(&self) -> RateLimiting {
        self.rate_limiting.clone().unwrap_or_else(|| RateLimiting {
            default_delay: self.default_settings.delay_between_attempts,
            ..RateLimiting::default()
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.default_settings.timeout.max(1))
    }

    pub fn user_agent(&self) -> &str {
        self.default_settings
            .user_agents
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Convert a seconds value from the config into a `Duration`. Negative
/// and NaN values are zero; values too large to represent saturate.
pub fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}
