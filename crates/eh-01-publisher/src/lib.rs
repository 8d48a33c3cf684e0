//! # EH-01 Publisher
//!
//! Broadcasts signed hook events for independent threads of activity.
//!
//! **Component ID:** 1  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Per-thread table of authorized signing keys, set by the owner
//! - `fire_hook`: authenticate a signed payload digest against the thread's
//!   key and emit it; each signature carries a per-thread sequence and
//!   fires once
//! - Optional immutable attestations that subscribers query instead of
//!   re-verifying signatures
//!
//! ## Variants
//!
//! | Policy | Behaviour |
//! |--------|-----------|
//! | `EmitOnly` | Emit `HookFired`; nothing retained |
//! | `Retain` | Also record (digest, thread, sequence, fired_at); duplicates rejected |
//!
//! ## Module Structure
//!
//! ```text
//! eh-01-publisher/
//! ├── domain/          # Attestation, FireHookMessage, errors, invariants
//! ├── ports/           # PublisherApi
//! ├── adapters/        # PublisherDirectory (oracle routing)
//! └── service.rs       # Publisher
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::PublisherDirectory;
pub use domain::{
    invariant_digest_matches, invariant_owner, invariant_sequence_fresh, invariant_within_window,
    Attestation, AttestationKey, AttestationPolicy, FireHookMessage, FireHookRequest, FiredHook,
    PublisherError,
};
pub use ports::PublisherApi;
pub use service::{Publisher, PublisherConfig, PublisherStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
