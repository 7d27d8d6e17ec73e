//! Bounded retry for transient database failures.
//!
//! Only infrastructure faults are retried: pool timeouts, dropped
//! connections, serialization failures and deadlocks. Business outcomes such
//! as "not found" or "insufficient stock" are returned on the first attempt.
//!
//! The retried operation must be a whole unit of work. Each attempt opens its
//! own transaction, so a failed attempt has already rolled back before the
//! next one starts.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Classifies errors that may succeed if the operation is run again.
pub trait Transient {
    /// Whether retrying could change the outcome.
    fn is_transient(&self) -> bool;
}

/// How many times to run an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub base_delay: Duration,
    /// Upper bound on a single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Run once, never retry.
    pub const NONE: Self = Self {
        max_attempts: 1,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    };

    /// Policy with the given attempt count and default delays.
    #[must_use]
    pub const fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
        }
    }

    /// Backoff before attempt `attempt + 1`, without jitter.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation`.
    pub async fn run<T, E, F, Fut>(&self, name: &'static str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient + std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = jittered(self.delay_for(attempt));
                    tracing::warn!(
                        operation = name,
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Transient database failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_transient() {
                        tracing::error!(
                            operation = name,
                            attempts = attempt,
                            error = %err,
                            "Retries exhausted"
                        );
                    }
                    return Err(err);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_attempts(3)
    }
}

/// Spread concurrent retries by up to half the delay.
fn jittered(delay: Duration) -> Duration {
    let half = u64::try_from(delay.as_millis() / 2).unwrap_or(0);
    if half == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::rng().random_range(0..=half))
}
