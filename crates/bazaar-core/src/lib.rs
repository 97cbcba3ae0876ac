//! # Bazaar Core
//!
//! Core types shared by every Bazaar gateway crate: the unified error
//! type, the structured RPC error contract exchanged with remote services,
//! result aliases, and telemetry initialization.

pub mod error;
pub mod result;
pub mod rpc;
pub mod telemetry;

pub use error::*;
pub use result::*;
pub use rpc::*;
pub use telemetry::*;
