//! Fixed-delay retry policy.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retry policy with a constant pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelayRetry {
    /// Additional attempts after the first.
    pub retries: u32,
    /// Pause between two attempts.
    pub delay: Duration,
}

impl FixedDelayRetry {
    /// Creates a new retry policy.
    #[must_use]
    pub const fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Total number of attempts this policy allows.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Executes a function with retry logic.
    ///
    /// Attempts run strictly one after another; the last error is returned
    /// once every attempt has failed.
    pub async fn execute<F, Fut, T, E>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;

        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < self.max_attempts() => {
                    debug!(attempt, delay = ?self.delay, error = %e, "Attempt failed, retrying");
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    debug!(attempt, error = %e, "Final attempt failed");
                    return Err(e);
                }
            }
        }
    }
}
