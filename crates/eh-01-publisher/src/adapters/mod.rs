//! # Adapters Layer (Hexagonal Architecture)
//!
//! Exposes publishers to the registry and subscribers through the shared
//! oracle ports.

mod directory;

pub use directory::PublisherDirectory;
