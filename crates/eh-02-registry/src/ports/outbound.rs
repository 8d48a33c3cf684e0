//! # Outbound Ports
//!
//! The Registry asks publishers one question: does this caller hold the
//! key for this thread?

pub use shared_types::HookRegistrationOracle;
