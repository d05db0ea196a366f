use crate::core::config::{seconds, RateLimiting};
use std::time::Duration;

/// Per-worker pacing between credential attempts.
///
/// The base delay is fixed. In adaptive mode it doubles for every
/// consecutive throttling signal, capped at `max_delay`, and drops back to
/// the base delay on the next ordinary response.
#[derive(Debug, Clone)]
pub struct Pacer {
    base: Duration,
    max: Duration,
    adaptive: bool,
    throttled_streak: u32,
}

impl Pacer {
    pub fn new(base: Duration, max: Duration, adaptive: bool) -> Self {
        Self {
            base,
            max: max.max(base),
            adaptive,
            throttled_streak: 0,
        }
    }

    pub fn from_config(rl: &RateLimiting) -> Self {
        Self::new(seconds(rl.default_delay), seconds(rl.max_delay), rl.adaptive_delay)
    }

    /// Record the observation from the last attempt.
    pub fn observe(&mut self, throttled: bool) {
        if throttled {
            self.throttled_streak = self.throttled_streak.saturating_add(1);
        } else {
            self.throttled_streak = 0;
        }
    }

    pub fn current_delay(&self) -> Duration {
        if !self.adaptive || self.throttled_streak == 0 {
            return self.base;
        }
        let factor = 2u32.saturating_pow(self.throttled_streak.min(16));
        self.base.saturating_mul(factor).min(self.max)
    }

    pub async fn wait(&self) {
        let delay = self.current_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
