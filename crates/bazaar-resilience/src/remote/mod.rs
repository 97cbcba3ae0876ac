//! Tagged failures produced at the RPC client boundary.
//!
//! RPC clients convert whatever their transport raises into a
//! [`RemoteError`] before handing it to the call guard, so classification
//! downstream is a plain `match` instead of shape sniffing.

use bazaar_core::{RpcError, RpcErrorCode};
use thiserror::Error;
use tonic::{Code, Status};

/// Failure of a single remote invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// No response within the deadline.
    #[error("Remote call timed out: {0}")]
    Timeout(String),

    /// The transport reported the peer as unreachable.
    #[error("Remote service unavailable: {0}")]
    Unavailable(String),

    /// The peer answered with its own structured error.
    #[error(transparent)]
    Rpc(RpcError),

    /// Anything else: malformed response, unexpected transport failure.
    #[error("Remote call failed: {0}")]
    Other(String),
}

impl RemoteError {
    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::Unavailable(detail.into())
    }

    /// Creates an unclassified error.
    #[must_use]
    pub fn other(detail: impl Into<String>) -> Self {
        Self::Other(detail.into())
    }

    /// Returns true for timeouts and explicit unavailability.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Unavailable(_))
    }
}

impl From<RpcError> for RemoteError {
    fn from(err: RpcError) -> Self {
        Self::Rpc(err)
    }
}

impl From<Status> for RemoteError {
    fn from(status: Status) -> Self {
        match status.code() {
            Code::Unavailable => return Self::Unavailable(status.message().to_string()),
            Code::DeadlineExceeded => return Self::Timeout(status.message().to_string()),
            _ => {}
        }

        // Services that speak the structured contract put it in the message.
        if let Some(err) = RpcError::from_payload(status.message()) {
            return Self::Rpc(err);
        }

        let code = match status.code() {
            Code::InvalidArgument | Code::OutOfRange => RpcErrorCode::BadRequest,
            Code::Unauthenticated => RpcErrorCode::Unauthorized,
            Code::PermissionDenied => RpcErrorCode::Forbidden,
            Code::NotFound => RpcErrorCode::NotFound,
            Code::AlreadyExists | Code::Aborted => RpcErrorCode::Conflict,
            Code::FailedPrecondition => RpcErrorCode::UnprocessableEntity,
            Code::ResourceExhausted => RpcErrorCode::TooManyRequests,
            _ => return Self::Other(format!("{:?}: {}", status.code(), status.message())),
        };

        Self::Rpc(RpcError::new(code, status.message()))
    }
}
