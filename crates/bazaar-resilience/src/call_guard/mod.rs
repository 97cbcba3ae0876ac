//! Guarded execution of a single remote call.
//!
//! [`CallGuard::call`] turns one asynchronous remote invocation into a
//! bounded operation:
//!
//! - every attempt races the producer against a deadline;
//! - failed attempts are retried after a fixed delay, up to `retries` times;
//! - once retries are exhausted an optional fallback may supply a value;
//! - otherwise the terminal failure is classified into a [`BazaarError`].
//!
//! Callers never see a raw transport failure: timeouts and unreachable peers
//! become [`BazaarError::ServiceUnavailable`], structured peer errors are
//! forwarded as [`BazaarError::Rpc`], and everything else collapses into
//! [`BazaarError::Internal`] with a fixed message key.

mod options;

pub use options::CallOptions;

use crate::{with_timeout, FixedDelayRetry, RemoteError};
use bazaar_config::CallGuardConfig;
use bazaar_core::{BazaarError, BazaarResult};
use std::fmt::Debug;
use std::future::Future;
use tracing::{debug, error, warn};

/// Executes remote calls with timeout, retry, and fallback.
#[derive(Debug, Clone, Default)]
pub struct CallGuard {
    config: CallGuardConfig,
}

impl CallGuard {
    /// Creates a call guard with the given defaults.
    #[must_use]
    pub const fn new(config: CallGuardConfig) -> Self {
        Self { config }
    }

    /// Returns the defaults applied to unset options.
    #[must_use]
    pub const fn config(&self) -> &CallGuardConfig {
        &self.config
    }

    /// Runs `producer` under the guard.
    ///
    /// `producer` is invoked once per attempt. `service` only labels log
    /// events, metrics, and the unavailable error.
    pub async fn call<T, F, Fut>(&self, service: &str, mut producer: F, options: CallOptions<T>) -> BazaarResult<T>
    where
        T: Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let timeout = options.timeout.unwrap_or_else(|| self.config.timeout());
        let policy = FixedDelayRetry::new(
            options.retries.unwrap_or(self.config.retries),
            options.delay_retry.unwrap_or_else(|| self.config.delay_retry()),
        );

        let err = match policy.execute(|| with_timeout(timeout, producer())).await {
            Ok(value) => {
                record_outcome(service, "success");
                return Ok(value);
            }
            Err(err) => err,
        };

        if let Some(value) = options.resolve_fallback(service) {
            warn!(
                service,
                fallback = ?value,
                error = %err,
                attempts = policy.max_attempts(),
                "Remote call failed, serving fallback value"
            );
            record_outcome(service, "fallback");
            return Ok(value);
        }

        Err(classify(service, err))
    }
}

/// Runs `producer` under a guard built from [`CallGuardConfig::default`].
pub async fn call_guarded<T, F, Fut>(producer: F, service: &str, options: CallOptions<T>) -> BazaarResult<T>
where
    T: Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    CallGuard::default().call(service, producer, options).await
}

/// Maps a terminal remote failure onto the public error taxonomy.
fn classify(service: &str, err: RemoteError) -> BazaarError {
    match err {
        RemoteError::Timeout(detail) | RemoteError::Unavailable(detail) => {
            error!(service, error = %detail, "Remote service unavailable");
            record_outcome(service, "unavailable");
            BazaarError::service_unavailable(service, detail)
        }
        RemoteError::Rpc(rpc) => {
            debug!(service, code = %rpc.code, message = %rpc.message, "Forwarding remote error");
            record_outcome(service, "rpc_error");
            BazaarError::Rpc(rpc)
        }
        RemoteError::Other(detail) => {
            error!(service, error = %detail, "Remote call failed with unexpected error");
            record_outcome(service, "internal_error");
            BazaarError::internal()
        }
    }
}

fn record_outcome(service: &str, outcome: &'static str) {
    metrics::counter!(
        "bazaar_remote_calls_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
