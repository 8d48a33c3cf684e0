//! # Core Domain Entities
//!
//! Value objects shared by every protocol component.
//!
//! ## Clusters
//!
//! - **Identity**: `Address` (accounts, contracts, signing keys)
//! - **Digests**: `Hash` (Keccak-256 outputs, payload words)
//! - **Scoping**: `ThreadId`, `BlockHeight`, `ScopeKey`, `SubscriptionKey`

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Re-export U256 from primitive-types for balances and fees
pub use primitive_types::U256;

/// Ledger height. Monotonically increasing, visible during execution.
pub type BlockHeight = u64;

/// Error returned when parsing a hex-encoded fixed-width value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseHexError {
    /// Not valid hexadecimal.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded to the wrong number of bytes.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte length
        expected: usize,
        /// Decoded byte length
        actual: usize,
    },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], ParseHexError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|e| ParseHexError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(ParseHexError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account address.
///
/// Identifies publishers, subscribers, registries, owners, relayers and
/// signing keys alike.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000). Returned for absent lookups.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Parses a `0x`-prefixed (or bare) hex string.
    pub fn from_hex(s: &str) -> Result<Self, ParseHexError> {
        decode_fixed::<20>(s).map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Left-pads the address into a 32-byte ABI word.
    #[must_use]
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}...{}", hex::encode(&self.0[..4]), hex::encode(&self.0[18..]))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 20] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

// =============================================================================
// HASH (32 bytes)
// =============================================================================

/// A 32-byte Keccak-256 digest or ABI word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a hash from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Creates a hash from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(slice).ok().map(Self)
    }

    /// Parses a `0x`-prefixed (or bare) hex string.
    pub fn from_hex(s: &str) -> Result<Self, ParseHexError> {
        decode_fixed::<32>(s).map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if this is the zero hash.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}...{}", hex::encode(&self.0[..4]), hex::encode(&self.0[28..]))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Hash> for [u8; 32] {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

// =============================================================================
// SCOPING
// =============================================================================

/// Identifier of a logical event stream within one publisher.
///
/// Independent threads never share nonce or authorization state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct ThreadId(pub u64);

impl ThreadId {
    /// Encodes the thread id as a uint256 value.
    #[must_use]
    pub fn as_u256(&self) -> U256 {
        U256::from(self.0)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ThreadId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Composite key for per-(publisher, thread) state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeKey {
    /// Publisher address
    pub publisher: Address,
    /// Thread within the publisher
    pub thread: ThreadId,
}

impl ScopeKey {
    /// Creates a scope key.
    #[must_use]
    pub const fn new(publisher: Address, thread: ThreadId) -> Self {
        Self { publisher, thread }
    }
}

/// Composite key for per-(subscriber, publisher, thread) subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionKey {
    /// Subscriber address
    pub subscriber: Address,
    /// Publisher address
    pub publisher: Address,
    /// Thread within the publisher
    pub thread: ThreadId,
}

impl SubscriptionKey {
    /// Creates a subscription key.
    #[must_use]
    pub const fn new(subscriber: Address, publisher: Address, thread: ThreadId) -> Self {
        Self {
            subscriber,
            publisher,
            thread,
        }
    }

    /// The (publisher, thread) scope this subscription listens to.
    #[must_use]
    pub const fn scope(&self) -> ScopeKey {
        ScopeKey::new(self.publisher, self.thread)
    }
}
