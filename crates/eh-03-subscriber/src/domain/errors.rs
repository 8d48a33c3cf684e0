//! # Domain Errors
//!
//! Error types for the Subscriber.

use shared_crypto::CryptoError;
use shared_ledger::LedgerError;
use shared_types::{Address, BlockHeight, Categorized, ErrorCategory, Hash, ThreadId};
use thiserror::Error;

/// Subscriber error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriberError {
    /// Caller is not the subscriber's owner.
    #[error("Caller is not the owner: {caller:?}")]
    NotOwner {
        /// Transaction sender
        caller: Address,
    },

    /// (publisher, thread) was never added.
    #[error("Publisher not valid: {publisher:?} on thread {thread}")]
    PublisherNotValid {
        /// Claimed publisher or key
        publisher: Address,
        /// Thread
        thread: ThreadId,
    },

    /// The delivery's window has not opened.
    #[error("Hook event not valid yet: valid from {not_before}, current {current}")]
    HookEventNotValidYet {
        /// First valid height
        not_before: BlockHeight,
        /// Current height
        current: BlockHeight,
    },

    /// The delivery's window has closed.
    #[error("Hook event has expired: valid until {not_after}, current {current}")]
    HookEventHasExpired {
        /// First height at which the delivery is expired
        not_after: BlockHeight,
        /// Current height
        current: BlockHeight,
    },

    /// The nonce is not above the last accepted one.
    #[error("Obsolete hook detected: nonce {nonce}, last accepted {last}")]
    ObsoleteHookDetected {
        /// Delivered nonce
        nonce: u64,
        /// Stored counter
        last: u64,
    },

    /// The signature recovers to someone other than the registered key.
    #[error("Signature mismatch: expected {expected:?}, recovered {recovered:?}")]
    SignatureMismatch {
        /// Registered key
        expected: Address,
        /// Recovered signer; `None` when no signature was supplied
        recovered: Option<Address>,
    },

    /// The signature could not be parsed or recovered.
    #[error("Malformed signature: {0}")]
    MalformedSignature(CryptoError),

    /// The publisher holds no fresh attestation for the payload.
    #[error("Publisher attestation missing: {digest:?} on thread {thread} of {publisher:?}")]
    PublisherAttestationMissing {
        /// Publisher address
        publisher: Address,
        /// Payload digest
        digest: Hash,
        /// Thread
        thread: ThreadId,
    },

    /// The delivery claims a nonce or blockheight other than the attested ones.
    #[error(
        "Attestation mismatch: claimed nonce {nonce} at {blockheight}, \
         attested sequence {sequence} at {fired_at}"
    )]
    AttestationMismatch {
        /// Delivered nonce
        nonce: u64,
        /// Delivered blockheight
        blockheight: BlockHeight,
        /// Attested firing sequence
        sequence: u64,
        /// Attested firing height
        fired_at: BlockHeight,
    },

    /// The relayer fee could not be paid.
    #[error("Settlement failed: {0}")]
    Settlement(#[from] LedgerError),

    /// Typed-data encoding failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl SubscriberError {
    /// Short label for metrics and logs.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotOwner { .. } => "not_owner",
            Self::PublisherNotValid { .. } => "publisher_not_valid",
            Self::HookEventNotValidYet { .. } => "not_valid_yet",
            Self::HookEventHasExpired { .. } => "expired",
            Self::ObsoleteHookDetected { .. } => "obsolete",
            Self::SignatureMismatch { .. } => "signature_mismatch",
            Self::MalformedSignature(_) => "malformed_signature",
            Self::PublisherAttestationMissing { .. } => "attestation_missing",
            Self::AttestationMismatch { .. } => "attestation_mismatch",
            Self::Settlement(_) => "settlement",
            Self::Crypto(_) => "crypto",
        }
    }
}

impl Categorized for SubscriberError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::NotOwner { .. } => ErrorCategory::Authorization,
            Self::HookEventNotValidYet { .. }
            | Self::HookEventHasExpired { .. }
            | Self::ObsoleteHookDetected { .. } => ErrorCategory::Freshness,
            Self::PublisherNotValid { .. }
            | Self::SignatureMismatch { .. }
            | Self::MalformedSignature(_)
            | Self::PublisherAttestationMissing { .. }
            | Self::AttestationMismatch { .. } => ErrorCategory::Authenticity,
            Self::Settlement(_) => ErrorCategory::Settlement,
            Self::Crypto(_) => ErrorCategory::Validation,
        }
    }
}
