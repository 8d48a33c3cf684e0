//! # Shared Ledger
//!
//! The execution environment every EventHook component runs against.
//!
//! ## Module Structure
//!
//! ```text
//! shared-ledger/
//! ├── config.rs    # LedgerConfig (chain id, genesis, automine)
//! ├── context.rs   # CallContext handed to operations
//! ├── errors.rs    # LedgerError
//! └── ledger.rs    # Ledger: height, balances, event log, transact
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod errors;
pub mod ledger;

// Re-exports
pub use config::{LedgerConfig, DEFAULT_CHAIN_ID};
pub use context::CallContext;
pub use errors::LedgerError;
pub use ledger::{Ledger, LedgerStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
