//! # Domain Errors
//!
//! Error types for the Publisher.

use shared_crypto::CryptoError;
use shared_types::{Address, Categorized, ErrorCategory, Hash, ThreadId};
use thiserror::Error;

/// Publisher error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublisherError {
    /// Caller is not the publisher's owner.
    #[error("Caller is not the owner: {caller:?}")]
    NotOwner {
        /// Transaction sender
        caller: Address,
    },

    /// The supplied digest is not the digest of the supplied payload.
    #[error("Digest mismatch: claimed {claimed:?}, computed {computed:?}")]
    DigestMismatch {
        /// Digest supplied by the caller
        claimed: Hash,
        /// Digest of the payload
        computed: Hash,
    },

    /// The signature could not be parsed or recovered.
    #[error("Malformed signature: {0}")]
    MalformedSignature(CryptoError),

    /// The recovered signer is not the thread's authorized key.
    #[error("Signer not authorized for thread {thread}: recovered {recovered:?}")]
    UnauthorizedSigner {
        /// Thread the hook was fired on
        thread: ThreadId,
        /// Address recovered from the signature
        recovered: Address,
    },

    /// The signed sequence does not exceed the thread's last firing.
    #[error("Stale firing sequence {sequence} on thread {thread}: last fired {last}")]
    StaleSequence {
        /// Thread
        thread: ThreadId,
        /// Sequence in the request
        sequence: u64,
        /// Last sequence fired on the thread
        last: u64,
    },

    /// (digest, thread) was already attested; the record is immutable.
    #[error("Attestation already recorded for {digest:?} on thread {thread}")]
    DuplicateAttestation {
        /// Payload digest
        digest: Hash,
        /// Thread
        thread: ThreadId,
    },

    /// Typed-data encoding failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl PublisherError {
    /// Short label for metrics.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotOwner { .. } => "not_owner",
            Self::DigestMismatch { .. } => "digest_mismatch",
            Self::MalformedSignature(_) => "malformed_signature",
            Self::UnauthorizedSigner { .. } => "unauthorized_signer",
            Self::StaleSequence { .. } => "stale_sequence",
            Self::DuplicateAttestation { .. } => "duplicate_attestation",
            Self::Crypto(_) => "crypto",
        }
    }
}

impl Categorized for PublisherError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::NotOwner { .. } => ErrorCategory::Authorization,
            Self::DigestMismatch { .. } | Self::Crypto(_) => ErrorCategory::Validation,
            Self::MalformedSignature(_) | Self::UnauthorizedSigner { .. } => {
                ErrorCategory::Authenticity
            }
            Self::StaleSequence { .. } => ErrorCategory::Freshness,
            Self::DuplicateAttestation { .. } => ErrorCategory::Conflict,
        }
    }
}
