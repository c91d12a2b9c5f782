//! Explicit retry configuration.
//!
//! Retry behavior is carried as a value object rather than closed-over state,
//! so the schedule a resolver will follow is visible at construction time.

use std::time::Duration;

/// How the delay grows between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backoff {
    /// `base × (attempt + 1)` — used for transient network failures.
    Linear,
    /// `base × 2^attempt` — used for rate limiting.
    Exponential,
}

/// A retry schedule: how many times to retry, and how long to wait.
///
/// `max_retries` counts retries *after* the initial attempt, so a policy with
/// `max_retries = 3` performs at most four requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn linear(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            backoff: Backoff::Linear,
        }
    }

    pub fn exponential(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            backoff: Backoff::Exponential,
        }
    }

    /// Delay before the retry following failed attempt `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Linear => self.base_delay * (attempt + 1),
            Backoff::Exponential => self.base_delay * 2u32.saturating_pow(attempt),
        }
    }
}
