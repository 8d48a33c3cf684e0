//! # Domain Entities
//!
//! Core types for hook firing and attestation.

use serde::{Deserialize, Serialize};
use shared_crypto::{
    payload_digest, CryptoError, EcdsaSignature, Eip712Domain, FieldKind, Secp256k1KeyPair,
    TypeSchema, TypedMessage, TypedValue,
};
use shared_types::{Address, AttestationStamp, BlockHeight, Hash, ThreadId};

/// Whether a publisher keeps a record of what it fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttestationPolicy {
    /// Emit the fired event only; subscribers verify signatures themselves.
    #[default]
    EmitOnly,
    /// Also retain an immutable attestation subscribers can query.
    Retain,
}

impl AttestationPolicy {
    /// Label for logs and metrics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EmitOnly => "emit_only",
            Self::Retain => "retain",
        }
    }
}

/// Key of a retained attestation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttestationKey {
    /// Payload digest
    pub digest: Hash,
    /// Thread
    pub thread: ThreadId,
}

/// A retained record that a hook was authentically fired.
///
/// Written once, never modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Payload digest
    pub digest: Hash,
    /// Thread
    pub thread: ThreadId,
    /// Signed firing sequence of the thread.
    pub sequence: u64,
    /// Height of the firing transaction; anchors validity windows.
    pub fired_at: BlockHeight,
    /// Key that signed the firing.
    pub signer: Address,
}

impl Attestation {
    /// Lookup key of this attestation.
    pub fn key(&self) -> AttestationKey {
        AttestationKey {
            digest: self.digest,
            thread: self.thread,
        }
    }

    /// Sequence and height, as handed to subscribers.
    pub fn stamp(&self) -> AttestationStamp {
        AttestationStamp {
            sequence: self.sequence,
            fired_at: self.fired_at,
        }
    }
}

/// The typed message a thread key signs to fire a hook:
/// `FireHook(bytes32 payload,uint256 thread,uint256 sequence)`.
///
/// `sequence` must exceed the last sequence fired on the thread, so a
/// signature fires at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireHookMessage {
    /// Payload digest
    pub payload: Hash,
    /// Thread
    pub thread: ThreadId,
    /// Firing sequence
    pub sequence: u64,
}

impl TypedMessage for FireHookMessage {
    fn schema() -> TypeSchema {
        TypeSchema::new("FireHook")
            .field("payload", FieldKind::Bytes32)
            .field("thread", FieldKind::Uint256)
            .field("sequence", FieldKind::Uint256)
    }

    fn values(&self) -> Vec<(&'static str, TypedValue)> {
        vec![
            ("payload", self.payload.into()),
            ("thread", self.thread.as_u256().into()),
            ("sequence", self.sequence.into()),
        ]
    }
}

/// Arguments of `fire_hook`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireHookRequest {
    /// Payload words
    pub payload: Vec<Hash>,
    /// Digest the caller claims for `payload`
    pub digest: Hash,
    /// Thread
    pub thread: ThreadId,
    /// Firing sequence
    pub sequence: u64,
    /// Thread key's signature over `FireHookMessage`
    pub signature: EcdsaSignature,
}

impl FireHookRequest {
    /// Builds a request signed by `key` in the publisher's `domain`.
    pub fn sign(
        payload: Vec<Hash>,
        thread: ThreadId,
        sequence: u64,
        domain: &Eip712Domain,
        key: &Secp256k1KeyPair,
    ) -> Result<Self, CryptoError> {
        let digest = payload_digest(&payload);
        let message = FireHookMessage {
            payload: digest,
            thread,
            sequence,
        };
        let signature = key.sign_digest(&message.signing_digest(domain)?)?;
        Ok(Self {
            payload,
            digest,
            thread,
            sequence,
            signature,
        })
    }

    /// The message the signature covers.
    pub fn message(&self) -> FireHookMessage {
        FireHookMessage {
            payload: self.digest,
            thread: self.thread,
            sequence: self.sequence,
        }
    }
}

/// Receipt of a successful `fire_hook`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredHook {
    /// Payload digest
    pub digest: Hash,
    /// Thread
    pub thread: ThreadId,
    /// Firing sequence
    pub sequence: u64,
    /// Height of the firing transaction
    pub fired_at: BlockHeight,
    /// Key that signed the firing
    pub signer: Address,
    /// Whether an attestation was retained
    pub retained: bool,
}
