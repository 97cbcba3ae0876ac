//! Per-call overrides for the call guard.

use std::fmt;
use std::time::Duration;
use tracing::warn;

type Fallback<T> = Box<dyn FnOnce() -> anyhow::Result<Option<T>> + Send>;

/// Options for one guarded call. Unset fields fall back to the guard's
/// [`CallGuardConfig`](bazaar_config::CallGuardConfig).
pub struct CallOptions<T> {
    /// Deadline applied to each attempt.
    pub timeout: Option<Duration>,
    /// Additional attempts after the first.
    pub retries: Option<u32>,
    /// Fixed pause between attempts.
    pub delay_retry: Option<Duration>,
    fallback: Option<Fallback<T>>,
}

impl<T> Default for CallOptions<T> {
    fn default() -> Self {
        Self {
            timeout: None,
            retries: None,
            delay_retry: None,
            fallback: None,
        }
    }
}

impl<T> fmt::Debug for CallOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("delay_retry", &self.delay_retry)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl<T> CallOptions<T> {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-attempt deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the number of additional attempts.
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Sets the pause between attempts.
    #[must_use]
    pub fn delay_retry(mut self, delay: Duration) -> Self {
        self.delay_retry = Some(delay);
        self
    }

    /// Supplies a substitute value used once every attempt has failed.
    ///
    /// Returning `None` means no substitute is available.
    #[must_use]
    pub fn fallback<F>(self, fallback: F) -> Self
    where
        F: FnOnce() -> Option<T> + Send + 'static,
    {
        self.try_fallback(move || Ok(fallback()))
    }

    /// Like [`fallback`](Self::fallback), for suppliers that can fail.
    ///
    /// A failing supplier is treated the same as a missing one.
    #[must_use]
    pub fn try_fallback<F>(mut self, fallback: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Option<T>> + Send + 'static,
    {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Returns true if a fallback supplier is set.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Consumes the options and runs the fallback supplier, if any.
    pub(crate) fn resolve_fallback(self, service: &str) -> Option<T> {
        let fallback = self.fallback?;
        match fallback() {
            Ok(value) => value,
            Err(e) => {
                warn!(service, error = %e, "Fallback supplier failed");
                None
            }
        }
    }
}
