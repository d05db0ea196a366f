use crate::attack::outcome::{AttemptOutcome, OutcomeSink};
use crate::reporting::model::AttemptStats;
use std::sync::atomic::{AtomicUsize, Ordering};

const PROGRESS_EVERY: usize = 50;

/// Outcome sink used by the CLI: counts attempts and logs them.
#[derive(Debug, Default)]
pub struct Reporter {
    attempts: AtomicUsize,
    failures: AtomicUsize,
    transport_errors: AtomicUsize,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> AttemptStats {
        AttemptStats {
            attempts: self.attempts.load(Ordering::SeqCst),
            failures: self.failures.load(Ordering::SeqCst),
            transport_errors: self.transport_errors.load(Ordering::SeqCst),
        }
    }
}

impl OutcomeSink for Reporter {
    fn record(&self, attempt: usize, total: usize, outcome: &AttemptOutcome) {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if outcome.is_success() {
            tracing::info!(
                "[{}/{}] SUCCESS {}:{} via {} ({}ms)",
                attempt,
                total,
                outcome.username,
                outcome.password,
                outcome.action_url,
                outcome.elapsed_ms
            );
            return;
        }

        self.failures.fetch_add(1, Ordering::SeqCst);

        if let Some(ref err) = outcome.error {
            self.transport_errors.fetch_add(1, Ordering::SeqCst);
            tracing::warn!(
                "[{}/{}] request error for {}: {}",
                attempt,
                total,
                outcome.username,
                err
            );
        } else {
            tracing::debug!(
                "[{}/{}] {}:{} -> {:?} (status {})",
                attempt,
                total,
                outcome.username,
                outcome.password,
                outcome.verdict,
                outcome.status.unwrap_or_default()
            );
        }

        if attempt % PROGRESS_EVERY == 0 {
            tracing::info!("Progress: {}/{} attempts", attempt, total);
        }
    }
}
