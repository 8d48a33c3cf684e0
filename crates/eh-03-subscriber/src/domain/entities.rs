//! # Domain Entities
//!
//! Deliveries, the signed `Hook` message, and the knobs that select a
//! subscriber variant.

use serde::{Deserialize, Serialize};
use shared_crypto::{
    payload_digest, CryptoError, EcdsaSignature, Eip712Domain, FieldKind, Secp256k1KeyPair,
    TypeSchema, TypedMessage, TypedValue,
};
use shared_types::{Address, AttestationOracle, BlockHeight, Hash, ThreadId, U256};
use std::fmt;
use std::sync::Arc;

/// Where the nonce counter of a newly added publisher starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NonceSeed {
    /// Start at zero.
    #[default]
    Zero,
    /// Start at the height of the `add_publisher` transaction.
    CurrentHeight,
}

/// How many nonce counters a subscriber keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NonceScope {
    /// One counter per (publisher, thread).
    #[default]
    PerPublisherThread,
    /// A single counter shared by every scope.
    Global,
}

/// How a subscriber decides a delivery is authentic.
#[derive(Clone)]
pub enum AuthenticationStrategy {
    /// Recover the signer of the `Hook` message and compare it to the
    /// added key.
    LocalSignatureCheck,
    /// Ask the publisher whether it holds an attestation for the payload
    /// digest within `[fired_at + from_offset, fired_at + to_offset]`.
    ///
    /// The delivery's nonce and blockheight must be the attestation's
    /// sequence and firing height, so relayers cannot pick them.
    DelegatedAttestationCheck {
        /// Publisher lookup
        oracle: Arc<dyn AttestationOracle>,
        /// Window start, relative to the firing height
        from_offset: u64,
        /// Window end, relative to the firing height
        to_offset: u64,
    },
}

impl AuthenticationStrategy {
    /// Delegated check with the given attestation window.
    pub fn delegated(oracle: Arc<dyn AttestationOracle>, from_offset: u64, to_offset: u64) -> Self {
        Self::DelegatedAttestationCheck {
            oracle,
            from_offset,
            to_offset,
        }
    }

    /// Label for logs and metrics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LocalSignatureCheck => "local_signature",
            Self::DelegatedAttestationCheck { .. } => "delegated_attestation",
        }
    }
}

impl fmt::Debug for AuthenticationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalSignatureCheck => f.write_str("LocalSignatureCheck"),
            Self::DelegatedAttestationCheck {
                from_offset,
                to_offset,
                ..
            } => f
                .debug_struct("DelegatedAttestationCheck")
                .field("from_offset", from_offset)
                .field("to_offset", to_offset)
                .finish_non_exhaustive(),
        }
    }
}

/// The typed message a thread key signs for a subscriber:
/// `Hook(bytes32 payload,uint256 nonce,uint256 blockheight,uint256 thread)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookMessage {
    /// Payload digest
    pub payload: Hash,
    /// Delivery nonce
    pub nonce: u64,
    /// Height the message was signed at
    pub blockheight: BlockHeight,
    /// Thread
    pub thread: ThreadId,
}

impl TypedMessage for HookMessage {
    fn schema() -> TypeSchema {
        TypeSchema::new("Hook")
            .field("payload", FieldKind::Bytes32)
            .field("nonce", FieldKind::Uint256)
            .field("blockheight", FieldKind::Uint256)
            .field("thread", FieldKind::Uint256)
    }

    fn values(&self) -> Vec<(&'static str, TypedValue)> {
        vec![
            ("payload", self.payload.into()),
            ("nonce", self.nonce.into()),
            ("blockheight", self.blockheight.into()),
            ("thread", self.thread.as_u256().into()),
        ]
    }
}

/// A delivery as a relayer submits it to `verify_hook`.
///
/// `publisher` is the identity the subscriber added: the signing key under
/// `LocalSignatureCheck`, the publisher's address under
/// `DelegatedAttestationCheck`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDelivery {
    /// Claimed publisher or key
    pub publisher: Address,
    /// Payload words
    pub payload: Vec<Hash>,
    /// Thread
    pub thread: ThreadId,
    /// Delivery nonce; the attested firing sequence under delegated checks
    pub nonce: u64,
    /// Height the delivery was signed or fired at
    pub blockheight: BlockHeight,
    /// Signature over `HookMessage`; unused by delegated checks.
    pub signature: Option<EcdsaSignature>,
}

impl HookDelivery {
    /// Unsigned delivery, for subscribers that delegate authentication.
    pub fn unsigned(
        publisher: Address,
        payload: Vec<Hash>,
        thread: ThreadId,
        nonce: u64,
        blockheight: BlockHeight,
    ) -> Self {
        Self {
            publisher,
            payload,
            thread,
            nonce,
            blockheight,
            signature: None,
        }
    }

    /// Delivery signed by `key` in the subscriber's `domain`. The key's
    /// address becomes the claimed publisher.
    pub fn sign(
        payload: Vec<Hash>,
        thread: ThreadId,
        nonce: u64,
        blockheight: BlockHeight,
        domain: &Eip712Domain,
        key: &Secp256k1KeyPair,
    ) -> Result<Self, CryptoError> {
        let mut delivery = Self::unsigned(key.address(), payload, thread, nonce, blockheight);
        let digest = delivery.message().signing_digest(domain)?;
        delivery.signature = Some(key.sign_digest(&digest)?);
        Ok(delivery)
    }

    /// keccak256 of the payload words.
    pub fn digest(&self) -> Hash {
        payload_digest(&self.payload)
    }

    /// The typed message this delivery claims was signed.
    pub fn message(&self) -> HookMessage {
        HookMessage {
            payload: self.digest(),
            nonce: self.nonce,
            blockheight: self.blockheight,
            thread: self.thread,
        }
    }
}

/// Outcome of an accepted delivery, handed to the application handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Claimed publisher or key
    pub publisher: Address,
    /// Thread
    pub thread: ThreadId,
    /// Accepted nonce
    pub nonce: u64,
    /// Payload digest
    pub digest: Hash,
    /// Account paid for the delivery
    pub relayer: Address,
    /// Fee paid
    pub fee: U256,
    /// Height the delivery was accepted at
    pub accepted_at: BlockHeight,
}
