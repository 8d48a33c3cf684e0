//! # Domain Invariants
//!
//! Business rules for the Publisher.

use super::errors::PublisherError;
use shared_crypto::payload_digest;
use shared_types::{Address, BlockHeight, Hash, ThreadId};

/// Invariant: only the owner mutates the key table.
pub fn invariant_owner(owner: &Address, caller: &Address) -> Result<(), PublisherError> {
    if owner != caller {
        return Err(PublisherError::NotOwner { caller: *caller });
    }
    Ok(())
}

/// Invariant: the attested digest is the digest of the payload.
pub fn invariant_digest_matches(payload: &[Hash], claimed: &Hash) -> Result<(), PublisherError> {
    let computed = payload_digest(payload);
    if computed != *claimed {
        return Err(PublisherError::DigestMismatch {
            claimed: *claimed,
            computed,
        });
    }
    Ok(())
}

/// Invariant: a thread's firing sequence strictly increases.
pub fn invariant_sequence_fresh(
    thread: ThreadId,
    sequence: u64,
    last: u64,
) -> Result<(), PublisherError> {
    if sequence <= last {
        return Err(PublisherError::StaleSequence {
            thread,
            sequence,
            last,
        });
    }
    Ok(())
}

/// Invariant: `current` lies in `[fired_at + from_offset, fired_at + to_offset]`.
///
/// Offsets saturate instead of wrapping.
pub fn invariant_within_window(
    fired_at: BlockHeight,
    from_offset: u64,
    to_offset: u64,
    current: BlockHeight,
) -> bool {
    let not_before = fired_at.saturating_add(from_offset);
    let not_after = fired_at.saturating_add(to_offset);
    not_before <= current && current <= not_after
}
