//! # Adapters
//!
//! Stock `HookHandler` implementations.

pub mod handlers;

pub use handlers::{LoggingHandler, NoopHandler};
