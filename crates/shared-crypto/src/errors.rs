//! Crypto error types.

use shared_types::{Categorized, ErrorCategory};
use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signature bytes were not 65 bytes (r || s || v).
    #[error("Invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Recovery id was not one of 0, 1, 27, 28.
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// r or s is zero or not below the curve order.
    #[error("Invalid signature")]
    InvalidSignature,

    /// s is in the upper half of the curve order (EIP-2).
    #[error("Malleable signature: s is not low")]
    MalleableSignature,

    /// No public key could be recovered for this digest and signature.
    #[error("Public key recovery failed")]
    RecoveryFailed,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// A schema field had no value.
    #[error("Missing typed-data field: {0}")]
    MissingField(String),

    /// A value was supplied for a field the schema does not declare.
    #[error("Unknown typed-data field: {0}")]
    UnknownField(String),

    /// A value's type did not match the schema.
    #[error("Typed-data field {field}: expected {expected}, got {actual}")]
    FieldTypeMismatch {
        /// Field name
        field: String,
        /// Declared type
        expected: &'static str,
        /// Supplied type
        actual: &'static str,
    },
}

impl Categorized for CryptoError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingField(_) | Self::UnknownField(_) | Self::FieldTypeMismatch { .. } => {
                ErrorCategory::Validation
            }
            _ => ErrorCategory::Authenticity,
        }
    }
}
