//! Target profile and login form model

use crate::core::error::{FormError, ReconError};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMethod {
    Get,
    Post,
}

impl FromStr for FormMethod {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(FormMethod::Get),
            "post" => Ok(FormMethod::Post),
            _ => Err(FormError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormMethod::Get => write!(f, "get"),
            FormMethod::Post => write!(f, "post"),
        }
    }
}

/// One authentication surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    action_url: String,
    method: FormMethod,
    username_field: String,
    password_field: String,
    /// Replayed unchanged on every attempt (CSRF tokens and the like).
    auxiliary_fields: BTreeMap<String, String>,
}

impl LoginForm {
    pub fn new(
        action_url: impl Into<String>,
        method: FormMethod,
        username_field: impl Into<String>,
        password_field: impl Into<String>,
        auxiliary_fields: BTreeMap<String, String>,
    ) -> Result<Self, FormError> {
        let action_url = action_url.into();
        let username_field = username_field.into();
        let password_field = password_field.into();

        if action_url.is_empty() {
            return Err(FormError::MissingAction);
        }
        if username_field.is_empty() {
            return Err(FormError::MissingUsernameField);
        }
        if password_field.is_empty() {
            return Err(FormError::MissingPasswordField);
        }

        Ok(Self {
            action_url,
            method,
            username_field,
            password_field,
            auxiliary_fields,
        })
    }

    pub fn action_url(&self) -> &str {
        &self.action_url
    }

    pub fn method(&self) -> FormMethod {
        self.method
    }

    pub fn username_field(&self) -> &str {
        &self.username_field
    }

    pub fn password_field(&self) -> &str {
        &self.password_field
    }

    pub fn auxiliary_fields(&self) -> &BTreeMap<String, String> {
        &self.auxiliary_fields
    }

    /// Field set for one attempt: auxiliary defaults plus the credentials.
    pub fn fill(&self, username: &str, password: &str) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .auxiliary_fields
            .iter()
            .filter(|(k, _)| *k != &self.username_field && *k != &self.password_field)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        fields.push((self.username_field.clone(), username.to_string()));
        fields.push((self.password_field.clone(), password.to_string()));
        fields
    }
}

/// Server fingerprint collected from the baseline response.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Fingerprint {
    pub server: Option<String>,
    pub powered_by: Option<String>,
}

/// Reconnaissance result for one target.
#[derive(Debug, Clone)]
pub struct TargetProfile {
    pub url: String,
    pub domain: String,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub fingerprint: Fingerprint,
    pub reachable: bool,
    pub success_indicators: Vec<String>,
    pub failure_indicators: Vec<String>,
    login_forms: Vec<LoginForm>,
}

impl TargetProfile {
    pub fn new(url: impl Into<String>, domain: impl Into<String>) -> Result<Self, ReconError> {
        let url = url.into();
        let domain = domain.into();

        if url.is_empty() || domain.is_empty() {
            return Err(ReconError::InvalidTarget {
                url,
                reason: "url and domain must be non-empty".to_string(),
            });
        }

        Ok(Self {
            url,
            domain,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            fingerprint: Fingerprint::default(),
            reachable: false,
            success_indicators: Vec::new(),
            failure_indicators: Vec::new(),
            login_forms: Vec::new(),
        })
    }

    /// Append a form, skipping exact duplicates found on another page.
    pub fn add_login_form(&mut self, form: LoginForm) -> bool {
        if self.login_forms.contains(&form) {
            return false;
        }
        self.login_forms.push(form);
        true
    }

    pub fn login_forms(&self) -> &[LoginForm] {
        &self.login_forms
    }

    pub fn form_count(&self) -> usize {
        self.login_forms.len()
    }
}

/// A username/password pair that the target accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}
