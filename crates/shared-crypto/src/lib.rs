//! # Shared Crypto - Signature / Domain Primitives
//!
//! Pure functions shared by publishers and subscribers: no state, no I/O.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Addresses, payload digests |
//! | `ecdsa` | secp256k1 | Recoverable signing, signer recovery |
//! | `typed_data` | EIP-712 | Domain-separated message digests |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S enforced on recovery (EIP-2)
//! - **Domain separation**: name, version, chain id, verifying party and salt
//!   are all bound into the digest; a signature for one component or chain
//!   recovers a different address anywhere else

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod typed_data;

// Re-exports
pub use ecdsa::{address_from_pubkey, recover_address, EcdsaSignature, Secp256k1KeyPair};
pub use errors::CryptoError;
pub use hashing::{keccak256, keccak256_many, payload_digest, KeccakHasher};
pub use typed_data::{
    signing_digest, DomainConfig, Eip712Domain, FieldKind, TypeSchema, TypedMessage, TypedValue,
    HOOK_DOMAIN_NAME, HOOK_DOMAIN_SALT, HOOK_DOMAIN_VERSION,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
