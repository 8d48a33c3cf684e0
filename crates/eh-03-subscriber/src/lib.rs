//! # EH-03 Subscriber
//!
//! Receives hook deliveries from relayers, rejects replays and forgeries,
//! and pays whoever delivers a valid hook first.
//!
//! **Component ID:** 3  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Owner-maintained set of accepted (publisher, thread) scopes
//! - Monotonic nonce counters, per scope or shared
//! - Validity windows anchored at the signed block height
//! - Fixed relayer fee, paid atomically with the nonce update
//!
//! ## Authentication Strategies
//!
//! | Strategy | Check |
//! |----------|-------|
//! | `LocalSignatureCheck` | Recover the signer of the typed `Hook` message |
//! | `DelegatedAttestationCheck` | Ask the publisher; nonce and height must match its attestation |
//!
//! ## Module Structure
//!
//! ```text
//! eh-03-subscriber/
//! ├── domain/          # HookDelivery, HookMessage, strategies, errors, invariants
//! ├── ports/           # SubscriberApi, HookHandler, AttestationOracle
//! ├── adapters/        # NoopHandler, LoggingHandler
//! └── service.rs       # Subscriber
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{LoggingHandler, NoopHandler};
pub use domain::{
    invariant_matches_attestation, invariant_nonce_fresh, invariant_owner,
    invariant_within_validity, AuthenticationStrategy, DeliveryReceipt, HookDelivery, HookMessage,
    NonceScope, NonceSeed, SubscriberError,
};
pub use ports::{AttestationOracle, AttestationStamp, HookHandler, SubscriberApi};
pub use service::{
    Subscriber, SubscriberConfig, SubscriberStats, DEFAULT_RELAYER_FEE, DEFAULT_VALIDITY_BLOCKS,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
