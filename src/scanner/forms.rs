//! Login form inference
//!
//! Static `<form>` elements are inspected first. Pages that render their
//! login widget client-side often have bare inputs and no form; for those
//! the page-wide inputs are matched with the same heuristics and a bounded
//! list of common authentication endpoints is guessed instead.

use crate::core::config::Config;
use crate::core::profile::{FormMethod, LoginForm};
use crate::http::client::HttpClient;
use crate::http::request::HttpRequest;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Endpoints tried when a page has credential inputs but no usable form.
pub const FALLBACK_ENDPOINTS: &[&str] = &[
    "/api/login",
    "/auth/login",
    "/api/auth/login",
    "/login",
    "/signin",
    "/api/signin",
    "/auth/signin",
];

#[derive(Debug, Default)]
struct FieldScan {
    username: Option<String>,
    password: Option<String>,
    auxiliary: BTreeMap<String, String>,
}

pub struct FormInference {
    username_patterns: Vec<String>,
    timeout: Duration,
}

impl FormInference {
    pub fn new(username_patterns: &[String], timeout: Duration) -> Self {
        Self {
            username_patterns: username_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.login_detection.username_patterns, config.timeout())
    }

    /// Fetch a page and infer its login forms. Failures are logged and
    /// yield an empty list.
    pub async fn extract_forms(&self, client: &HttpClient, page: &Url) -> Vec<LoginForm> {
        let req = HttpRequest::get(page.clone()).with_timeout(self.timeout);
        let resp = match client.execute(req).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", page, e);
                return Vec::new();
            }
        };

        if !resp.is_success() {
            tracing::warn!("Failed to fetch {}: status {}", page, resp.status);
            return Vec::new();
        }

        self.parse_forms(&resp.body_text(), &resp.final_url)
    }

    pub fn parse_forms(&self, html: &str, page: &Url) -> Vec<LoginForm> {
        let document = Html::parse_document(html);
        let (Ok(form_sel), Ok(input_sel)) = (Selector::parse("form"), Selector::parse("input, textarea"))
        else {
            return Vec::new();
        };

        let mut forms = Vec::new();
        for form in document.select(&form_sel) {
            if let Some(login) = self.analyze_form(form, &input_sel, page) {
                tracing::info!("Found login form: {} ({})", login.action_url(), login.method());
                forms.push(login);
            }
        }

        if forms.is_empty() {
            forms = self.guess_endpoints(document.select(&input_sel), page);
        }

        forms
    }

    fn analyze_form(&self, form: ElementRef, input_sel: &Selector, page: &Url) -> Option<LoginForm> {
        let action = match non_empty(form.value().attr("action")) {
            Some(action) => match page.join(action) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Skipping form with bad action '{}': {}", action, e);
                    return None;
                }
            },
            None => page.clone(),
        };

        let method: FormMethod = match form.value().attr("method").unwrap_or("get").parse() {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!("Skipping form at {}: {}", action, e);
                return None;
            }
        };

        let scan = self.scan_fields(form.select(input_sel), false);
        let (Some(username), Some(password)) = (scan.username, scan.password) else {
            return None;
        };

        match LoginForm::new(action.as_str(), method, username, password, scan.auxiliary) {
            Ok(form) => Some(form),
            Err(e) => {
                tracing::warn!("Discarding form at {}: {}", action, e);
                None
            }
        }
    }

    fn guess_endpoints<'a>(
        &self,
        inputs: impl Iterator<Item = ElementRef<'a>>,
        page: &Url,
    ) -> Vec<LoginForm> {
        let scan = self.scan_fields(inputs, true);
        let (Some(username), Some(password)) = (scan.username, scan.password) else {
            return Vec::new();
        };

        FALLBACK_ENDPOINTS
            .iter()
            .filter_map(|endpoint| page.join(endpoint).ok())
            .filter_map(|url| {
                LoginForm::new(
                    url.as_str(),
                    FormMethod::Post,
                    username.clone(),
                    password.clone(),
                    BTreeMap::new(),
                )
                .ok()
            })
            .inspect(|form| tracing::info!("Detected potential JS login endpoint: {}", form.action_url()))
            .collect()
    }

    fn scan_fields<'a>(
        &self,
        inputs: impl Iterator<Item = ElementRef<'a>>,
        match_placeholder: bool,
    ) -> FieldScan {
        let mut scan = FieldScan::default();

        for input in inputs {
            let el = input.value();
            let input_type = el.attr("type").unwrap_or("text").trim().to_ascii_lowercase();
            let name = non_empty(el.attr("name"));
            let id = non_empty(el.attr("id"));
            let ident = name.or(id);

            if input_type == "password" {
                if scan.password.is_none() {
                    scan.password = ident.map(str::to_string);
                }
                continue;
            }

            let placeholder = if match_placeholder { el.attr("placeholder") } else { None };
            if ident.is_some() && self.looks_like_username(&[name, id, placeholder])
            {
                if scan.username.is_none() {
                    scan.username = ident.map(str::to_string);
                }
                continue;
            }

            if let Some(field) = ident {
                let value = if el.name() == "textarea" {
                    input.text().collect::<String>()
                } else {
                    el.attr("value").unwrap_or_default().to_string()
                };
                scan.auxiliary.entry(field.to_string()).or_insert(value);
            }
        }

        scan
    }

    fn looks_like_username(&self, attrs: &[Option<&str>]) -> bool {
        attrs.iter().flatten().any(|attr| {
            let attr = attr.to_lowercase();
            self.username_patterns.iter().any(|p| attr.contains(p.as_str()))
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
