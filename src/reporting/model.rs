use crate::core::profile::{Credential, FormMethod, LoginForm, TargetProfile};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Full,
    ReconOnly,
    FormsOnly,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Full => write!(f, "full"),
            RunMode::ReconOnly => write!(f, "recon-only"),
            RunMode::FormsOnly => write!(f, "forms-only"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub tool: String,
    pub version: String,
    pub generated_at: String,
}

impl ReportMetadata {
    pub fn now() -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetSummary {
    pub url: String,
    pub domain: String,
    pub server: Option<String>,
    pub powered_by: Option<String>,
    pub reachable: bool,
    pub cookies: usize,
}

impl From<&TargetProfile> for TargetSummary {
    fn from(profile: &TargetProfile) -> Self {
        Self {
            url: profile.url.clone(),
            domain: profile.domain.clone(),
            server: profile.fingerprint.server.clone(),
            powered_by: profile.fingerprint.powered_by.clone(),
            reachable: profile.reachable,
            cookies: profile.cookies.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormSummary {
    pub action: String,
    pub method: FormMethod,
    pub username_field: String,
    pub password_field: String,
    pub auxiliary_fields: BTreeMap<String, String>,
}

impl From<&LoginForm> for FormSummary {
    fn from(form: &LoginForm) -> Self {
        Self {
            action: form.action_url().to_string(),
            method: form.method(),
            username_field: form.username_field().to_string(),
            password_field: form.password_field().to_string(),
            auxiliary_fields: form.auxiliary_fields().clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttemptStats {
    pub attempts: usize,
    pub failures: usize,
    pub transport_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunResult {
    Found { credential: Credential },
    NotFound,
    /// Recon-only or forms-only run that finished.
    Completed,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub metadata: ReportMetadata,
    pub mode: RunMode,
    pub target: Option<TargetSummary>,
    pub forms: Vec<FormSummary>,
    pub stats: AttemptStats,
    pub result: RunResult,
}

impl RunReport {
    pub fn new(mode: RunMode, profile: Option<&TargetProfile>) -> Self {
        Self {
            metadata: ReportMetadata::now(),
            mode,
            target: profile.map(TargetSummary::from),
            forms: profile
                .map(|p| p.login_forms().iter().map(FormSummary::from).collect())
                .unwrap_or_default(),
            stats: AttemptStats::default(),
            result: RunResult::NotFound,
        }
    }

    /// Exit status 0.
    pub fn is_success(&self) -> bool {
        matches!(self.result, RunResult::Found { .. } | RunResult::Completed)
    }

    pub fn credential(&self) -> Option<&Credential> {
        match &self.result {
            RunResult::Found { credential } => Some(credential),
            _ => None,
        }
    }
}
