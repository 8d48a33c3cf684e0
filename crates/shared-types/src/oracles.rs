//! # Cross-Component Oracles
//!
//! Read-only questions the registry and subscriber ask a publisher. They
//! live here so neither side depends on the publisher crate directly.

use crate::entities::{Address, BlockHeight, Hash, ThreadId};
use serde::{Deserialize, Serialize};

/// Where a retained attestation sits in its thread.
///
/// A delegated delivery must claim exactly these values as its nonce and
/// blockheight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationStamp {
    /// Signed firing sequence of the thread.
    pub sequence: u64,
    /// Height of the firing transaction.
    pub fired_at: BlockHeight,
}

/// Answers whether a key is the authorized signer of a publisher thread.
pub trait HookRegistrationOracle: Send + Sync {
    /// True iff `publisher` recognises `key` as the authorized key for `thread`.
    /// Unknown publishers answer false.
    fn verify_hook_registration(&self, publisher: Address, thread: ThreadId, key: Address)
        -> bool;
}

/// Answers whether a publisher holds a fresh attestation for a digest.
pub trait AttestationOracle: Send + Sync {
    /// True iff `publisher` retained an attestation for (`digest`, `thread`)
    /// and the current height lies within
    /// `[fired_at + from_offset, fired_at + to_offset]`.
    fn verify_event_hook(
        &self,
        publisher: Address,
        digest: Hash,
        thread: ThreadId,
        from_offset: u64,
        to_offset: u64,
    ) -> bool;

    /// Sequence and height of the attestation for (`digest`, `thread`).
    fn attestation_stamp(
        &self,
        publisher: Address,
        digest: Hash,
        thread: ThreadId,
    ) -> Option<AttestationStamp>;
}
