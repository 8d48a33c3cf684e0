//! # Shared Types Crate
//!
//! Value objects, composite keys, events and the error taxonomy shared by
//! the publisher, registry and subscriber crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identities and keys are defined once here.
//! - **Composite keys**: per-scope state is keyed by explicit structs
//!   (`ScopeKey`, `SubscriptionKey`), never by nested maps.
//! - **Zero defaults**: absent lookups resolve to `Address::ZERO`, `U256::zero()`
//!   or `None`, never to a panic.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entities;
pub mod errors;
pub mod events;
pub mod oracles;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use oracles::*;
