use crate::validation::verdict::Verdict;
use serde::Serialize;
use std::sync::Mutex;

/// Result of one credential attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptOutcome {
    pub username: String,
    pub password: String,
    pub action_url: String,
    pub verdict: Verdict,
    pub elapsed_ms: u128,
    /// `None` when the exchange failed at the transport layer.
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        self.verdict == Verdict::Success
    }

    /// Responses that suggest the target is pushing back.
    pub fn is_throttled(&self) -> bool {
        self.error.is_some() || matches!(self.status, Some(429) | Some(503))
    }
}

/// Consumer of attempt outcomes, injected into the attack engine.
pub trait OutcomeSink: Send + Sync {
    /// `attempt` is 1-based; `total` is the size of the whole cross product.
    fn record(&self, attempt: usize, total: usize, outcome: &AttemptOutcome);
}

/// Keeps every outcome in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    outcomes: Mutex<Vec<AttemptOutcome>>,
    records: Mutex<Vec<(usize, usize)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<AttemptOutcome> {
        self.outcomes
            .lock()
            .map(|o| o.clone())
            .unwrap_or_default()
    }

    /// `(attempt, total)` pairs in the order they were recorded.
    pub fn records(&self) -> Vec<(usize, usize)> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl OutcomeSink for RecordingSink {
    fn record(&self, attempt: usize, total: usize, outcome: &AttemptOutcome) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push(outcome.clone());
        }
        if let Ok(mut records) = self.records.lock() {
            records.push((attempt, total));
        }
    }
}
