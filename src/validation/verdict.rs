//! Login response classification
//!
//! A pure decision list over one response. Rules are evaluated in order and
//! the first one that matches decides. When nothing matches the verdict is
//! `Failure`.

use crate::core::config::ResponseAnalysis;
use crate::http::response::HttpResponse;
use serde::Serialize;
use std::collections::HashSet;

const JSON_SUCCESS_KEYS: &[&str] = &["token", "access_token", "user", "success"];
const JSON_MESSAGE_KEYS: &[&str] = &["error", "message", "detail"];
const JSON_FAILURE_WORDS: &[&str] = &["invalid", "incorrect", "failed", "wrong"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Success,
    Failure,
}

/// The rule that produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    RedirectAfterPost,
    FailureStatus,
    JsonSuccessKey,
    JsonFailureMessage,
    FailureIndicator,
    SuccessIndicator,
    LeftLoginPage,
    CleanOk,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub rule: Rule,
}

impl Classification {
    fn new(verdict: Verdict, rule: Rule) -> Self {
        Self { verdict, rule }
    }
}

#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    success_status: HashSet<u16>,
    failure_status: HashSet<u16>,
    success_indicators: Vec<String>,
    failure_indicators: Vec<String>,
}

impl ResponseClassifier {
    pub fn new(
        success_status: impl IntoIterator<Item = u16>,
        failure_status: impl IntoIterator<Item = u16>,
        success_indicators: &[String],
        failure_indicators: &[String],
    ) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|i| i.to_lowercase())
                .filter(|i| !i.is_empty())
                .collect()
        };

        Self {
            success_status: success_status.into_iter().collect(),
            failure_status: failure_status.into_iter().collect(),
            success_indicators: lower(success_indicators),
            failure_indicators: lower(failure_indicators),
        }
    }

    /// Status sets from the config; indicator sets from the target profile.
    pub fn from_config(
        analysis: &ResponseAnalysis,
        success_indicators: &[String],
        failure_indicators: &[String],
    ) -> Self {
        Self::new(
            analysis.success_status_codes.iter().copied(),
            analysis.failure_status_codes.iter().copied(),
            success_indicators,
            failure_indicators,
        )
    }

    pub fn classify(&self, resp: &HttpResponse) -> Classification {
        use Rule::*;
        use Verdict::*;

        let status = resp.status;

        if self.success_status.contains(&status) && matches!(status, 302 | 303) {
            return Classification::new(Success, RedirectAfterPost);
        }

        if self.failure_status.contains(&status) {
            return Classification::new(Failure, FailureStatus);
        }

        if resp.is_json() {
            if let Some(c) = classify_json(&resp.body) {
                return c;
            }
        }

        let body = resp.body_text().to_lowercase();
        if self.failure_indicators.iter().any(|i| body.contains(i.as_str())) {
            return Classification::new(Failure, FailureIndicator);
        }

        if self.success_indicators.iter().any(|i| body.contains(i.as_str())) {
            return Classification::new(Success, SuccessIndicator);
        }

        if resp.redirects > 0 && !resp.final_url.as_str().to_lowercase().contains("login") {
            return Classification::new(Success, LeftLoginPage);
        }

        if status == 200 {
            return Classification::new(Success, CleanOk);
        }

        Classification::new(Failure, Fallback)
    }
}

/// Malformed JSON or a non-object body is "no match".
fn classify_json(body: &[u8]) -> Option<Classification> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;

    if JSON_SUCCESS_KEYS.iter().any(|k| object.contains_key(*k)) {
        return Some(Classification::new(Verdict::Success, Rule::JsonSuccessKey));
    }

    let failed = JSON_MESSAGE_KEYS
        .iter()
        .filter_map(|k| object.get(*k))
        .map(|v| match v {
            serde_json::Value::String(s) => s.to_lowercase(),
            other => other.to_string().to_lowercase(),
        })
        .any(|msg| JSON_FAILURE_WORDS.iter().any(|w| msg.contains(w)));

    failed.then(|| Classification::new(Verdict::Failure, Rule::JsonFailureMessage))
}
