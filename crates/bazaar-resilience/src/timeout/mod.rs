//! Per-attempt deadline for remote calls.

use crate::RemoteError;
use std::future::Future;
use std::time::Duration;

/// Races a remote call against a deadline.
///
/// The call future is dropped when the deadline fires.
pub async fn with_timeout<Fut, T>(duration: Duration, call: Fut) -> Result<T, RemoteError>
where
    Fut: Future<Output = Result<T, RemoteError>>,
{
    tokio::time::timeout(duration, call)
        .await
        .map_err(|_| RemoteError::Timeout(format!("no response within {:?}", duration)))?
}
