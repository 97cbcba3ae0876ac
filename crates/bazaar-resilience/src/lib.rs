//! # Bazaar Resilience
//!
//! Guarded remote calls for the Bazaar gateway.
//! Wraps one outbound call with a per-attempt timeout, fixed-delay retry,
//! an optional fallback, and classification into typed errors.

pub mod call_guard;
pub mod remote;
pub mod retry;
pub mod timeout;

pub use call_guard::*;
pub use remote::*;
pub use retry::*;
pub use timeout::*;
