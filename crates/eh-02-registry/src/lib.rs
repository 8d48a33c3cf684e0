//! # EH-02 Registry
//!
//! Public directory of which key may fire each publisher thread and what
//! each subscriber pays relayers per delivery.
//!
//! **Component ID:** 2  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Record a thread's key once the publisher confirms it
//! - Record subscriptions and the account that owns each subscriber id
//! - Let the current key or owner, and nobody else, change an entry
//!
//! The registry is informational. Subscribers do not consult it when
//! accepting deliveries.
//!
//! ## Module Structure
//!
//! ```text
//! eh-02-registry/
//! ├── domain/          # Subscription, SubscriptionTerms, errors, invariants
//! ├── ports/           # RegistryApi, HookRegistrationOracle
//! └── service.rs       # Registry
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{invariant_fee_positive, RegistryError, Subscription, SubscriptionTerms};
pub use ports::{HookRegistrationOracle, RegistryApi};
pub use service::Registry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
