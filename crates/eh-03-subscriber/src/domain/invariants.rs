//! # Domain Invariants
//!
//! Business rules for the Subscriber.

use super::errors::SubscriberError;
use shared_types::{Address, AttestationStamp, BlockHeight};

/// Invariant: only the owner adds publishers.
pub fn invariant_owner(owner: &Address, caller: &Address) -> Result<(), SubscriberError> {
    if owner != caller {
        return Err(SubscriberError::NotOwner { caller: *caller });
    }
    Ok(())
}

/// Invariant: `current` lies in `[blockheight, blockheight + validity_blocks)`.
pub fn invariant_within_validity(
    blockheight: BlockHeight,
    validity_blocks: u64,
    current: BlockHeight,
) -> Result<(), SubscriberError> {
    if current < blockheight {
        return Err(SubscriberError::HookEventNotValidYet {
            not_before: blockheight,
            current,
        });
    }
    let not_after = blockheight.saturating_add(validity_blocks);
    if current >= not_after {
        return Err(SubscriberError::HookEventHasExpired { not_after, current });
    }
    Ok(())
}

/// Invariant: a nonce is accepted only above the last accepted one.
pub fn invariant_nonce_fresh(nonce: u64, last: u64) -> Result<(), SubscriberError> {
    if nonce <= last {
        return Err(SubscriberError::ObsoleteHookDetected { nonce, last });
    }
    Ok(())
}

/// Invariant: a delegated delivery claims the attested sequence as its nonce
/// and the firing height as its blockheight.
pub fn invariant_matches_attestation(
    nonce: u64,
    blockheight: BlockHeight,
    stamp: &AttestationStamp,
) -> Result<(), SubscriberError> {
    if nonce != stamp.sequence || blockheight != stamp.fired_at {
        return Err(SubscriberError::AttestationMismatch {
            nonce,
            blockheight,
            sequence: stamp.sequence,
            fired_at: stamp.fired_at,
        });
    }
    Ok(())
}
