//! Unified error types for the gateway core.

use crate::rpc::{RpcError, RpcErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Message key returned to callers for unclassified failures.
///
/// Raw failure detail is logged, never surfaced.
pub const INTERNAL_ERROR_KEY: &str = "error.internal_server_error";

/// Message key for a remote service that timed out or is unreachable.
pub const SERVICE_UNAVAILABLE_KEY: &str = "error.service_unavailable";

/// Unified error type for the Bazaar gateway.
#[derive(Error, Debug)]
pub enum BazaarError {
    // ============ Remote Call Errors ============
    /// A remote service timed out or reported itself unavailable.
    #[error("Service unavailable: {service} - {message}")]
    ServiceUnavailable { service: String, message: String },

    /// Structured error raised by a remote service, forwarded unchanged.
    #[error(transparent)]
    Rpc(RpcError),

    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    // ============ Infrastructure Errors ============
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// A cache lookup was attempted with an empty key.
    #[error("Cache key must not be empty")]
    EmptyCacheKey,

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BazaarError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ServiceUnavailable { .. } => 503,
            Self::Rpc(err) => err.code.status_code(),
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Configuration(_)
            | Self::Cache(_)
            | Self::EmptyCacheKey
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            Self::Rpc(err) => err.code.as_str(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::EmptyCacheKey => "EMPTY_CACHE_KEY",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Creates a service unavailable error.
    #[must_use]
    pub fn service_unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an internal error carrying the generic message key.
    #[must_use]
    pub fn internal() -> Self {
        Self::Internal(INTERNAL_ERROR_KEY.to_string())
    }

    /// Returns the forwarded remote error, if this is a passthrough.
    #[must_use]
    pub const fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            Self::Rpc(err) => Some(err),
            _ => None,
        }
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::ServiceUnavailable { .. } | Self::Cache(_) => true,
            Self::Rpc(err) => matches!(
                err.code,
                RpcErrorCode::ServiceUnavailable | RpcErrorCode::TooManyRequests
            ),
            _ => false,
        }
    }
}

impl From<RpcError> for BazaarError {
    fn from(err: RpcError) -> Self {
        Self::Rpc(err)
    }
}

impl From<serde_json::Error> for BazaarError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message or message key
    pub message: String,
    /// Request trace ID for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response from a `BazaarError`.
    ///
    /// Passthrough RPC errors keep their message key; service outages and
    /// internal failures expose only a fixed key.
    #[must_use]
    pub fn from_error(error: &BazaarError) -> Self {
        let message = match error {
            BazaarError::Rpc(err) => err.message.clone(),
            BazaarError::ServiceUnavailable { .. } => SERVICE_UNAVAILABLE_KEY.to_string(),
            BazaarError::NotFound { .. } | BazaarError::Validation(_) => error.to_string(),
            _ => INTERNAL_ERROR_KEY.to_string(),
        };

        Self {
            code: error.error_code().to_string(),
            message,
            trace_id: None,
        }
    }

    /// Sets the trace ID.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

impl From<&BazaarError> for ErrorResponse {
    fn from(error: &BazaarError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(BazaarError::service_unavailable("product", "timeout").status_code(), 503);
        assert_eq!(BazaarError::not_found("Product", 1).status_code(), 404);
        assert_eq!(BazaarError::validation("bad page").status_code(), 400);
        assert_eq!(BazaarError::internal().status_code(), 500);
        assert_eq!(BazaarError::EmptyCacheKey.status_code(), 500);
    }

    #[test]
    fn test_rpc_status_follows_remote_code() {
        let err = BazaarError::from(RpcError::new(RpcErrorCode::Conflict, "order.already_paid"));
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn test_rpc_display_is_transparent() {
        let err = BazaarError::from(RpcError::not_found("product.not_found"));
        assert_eq!(err.to_string(), "NOT_FOUND: product.not_found");
        assert_eq!(err.as_rpc().map(|e| e.message.as_str()), Some("product.not_found"));
    }

    #[test]
    fn test_internal_uses_fixed_key() {
        match BazaarError::internal() {
            BazaarError::Internal(msg) => assert_eq!(msg, INTERNAL_ERROR_KEY),
            other => panic!("Expected Internal error, got {other:?}"),
        }
    }

    #[test]
    fn test_retriable_errors() {
        assert!(BazaarError::service_unavailable("payment", "down").is_retriable());
        assert!(BazaarError::Cache("conn reset".to_string()).is_retriable());
        assert!(BazaarError::from(RpcError::new(RpcErrorCode::TooManyRequests, "slow.down")).is_retriable());
        assert!(!BazaarError::from(RpcError::not_found("x")).is_retriable());
        assert!(!BazaarError::validation("bad").is_retriable());
        assert!(!BazaarError::EmptyCacheKey.is_retriable());
    }

    #[test]
    fn test_error_response_hides_internal_detail() {
        let err = BazaarError::Internal("stack trace with secrets".to_string());
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(response.message, INTERNAL_ERROR_KEY);
    }

    #[test]
    fn test_error_response_keeps_rpc_message() {
        let err = BazaarError::from(RpcError::new(RpcErrorCode::Forbidden, "cart.forbidden"));
        let response = ErrorResponse::from(&err).with_trace_id("trace-123");
        assert_eq!(response.code, "FORBIDDEN");
        assert_eq!(response.message, "cart.forbidden");
        assert_eq!(response.trace_id, Some("trace-123".to_string()));
    }

    #[test]
    fn test_error_response_for_outage() {
        let err = BazaarError::service_unavailable("auth", "deadline exceeded after 3s");
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "SERVICE_UNAVAILABLE");
        assert_eq!(response.message, SERVICE_UNAVAILABLE_KEY);
    }
}
