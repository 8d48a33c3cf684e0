//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable secp256k1 signatures over 32-byte prehashed digests, and
//! address recovery from them.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2); high-S signatures are rejected on recovery
//! - Malformed signatures fail with a distinct error, never a garbage address

use crate::hashing::keccak256;
use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash};
use tracing::trace;

/// Length of the `r || s || v` wire form.
pub const SIGNATURE_LENGTH: usize = 65;

/// Recoverable ECDSA signature split into its parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// Recovery id, 27/28 (or 0/1).
    pub v: u8,
    /// r scalar.
    pub r: [u8; 32],
    /// s scalar.
    pub s: [u8; 32],
}

impl EcdsaSignature {
    /// Parses the 65-byte `r || s || v` form produced by signing RPCs.
    pub fn from_rpc_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignatureLength {
                expected: SIGNATURE_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { v: bytes[64], r, s })
    }

    /// Encodes as `r || s || v`.
    pub fn to_rpc_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, CryptoError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(CryptoError::InvalidRecoveryId(v)),
    };
    RecoveryId::from_byte(id).ok_or(CryptoError::InvalidRecoveryId(v))
}

/// Derives the 20-byte address of a public key.
///
/// Keccak-256 of the uncompressed point without its 0x04 prefix; the last
/// 20 bytes are the address.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash.0[12..]);
    Address(address)
}

/// Recovers the signer of `digest`.
pub fn recover_address(digest: &Hash, signature: &EcdsaSignature) -> Result<Address, CryptoError> {
    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&sig_bytes).map_err(|_| CryptoError::InvalidSignature)?;

    // normalize_s returns Some only for a high-S signature
    if sig.normalize_s().is_some() {
        return Err(CryptoError::MalleableSignature);
    }

    let recovered = VerifyingKey::recover_from_prehash(digest.as_bytes(), &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    let address = address_from_pubkey(&recovered);
    trace!(signer = ?address, "recovered signer");
    Ok(address)
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// The address controlled by this key.
    pub fn address(&self) -> Address {
        address_from_pubkey(self.signing_key.verifying_key())
    }

    /// Signs a 32-byte digest (deterministic RFC 6979, low-S).
    pub fn sign_digest(&self, digest: &Hash) -> Result<EcdsaSignature, CryptoError> {
        let (sig, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest.as_bytes())
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(EcdsaSignature {
            v: 27 + recovery_id.to_byte(),
            r,
            s,
        })
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
