//! # Inbound Ports
//!
//! API trait defining what a Publisher can do.

use crate::domain::{Attestation, FireHookRequest, FiredHook, PublisherError};
use shared_ledger::CallContext;
use shared_types::{Address, Hash, ThreadId};

/// Publisher API - inbound port.
pub trait PublisherApi: Send + Sync {
    /// The publisher's own address (its identity in the registry).
    fn address(&self) -> Address;

    /// Sets the authorized key of `thread`. Owner only; re-setting rotates.
    fn add_hook(&self, ctx: &CallContext, thread: ThreadId, key: Address)
        -> Result<(), PublisherError>;

    /// True iff `key` is the authorized key of `thread`.
    fn verify_hook_registration(&self, thread: ThreadId, key: Address) -> bool;

    /// Authenticates a signed hook and emits it.
    fn fire_hook(
        &self,
        ctx: &CallContext,
        request: &FireHookRequest,
    ) -> Result<FiredHook, PublisherError>;

    /// True iff (`digest`, `thread`) was attested and the current height is
    /// within `[fired_at + from_offset, fired_at + to_offset]`.
    fn verify_event_hook(
        &self,
        digest: Hash,
        thread: ThreadId,
        from_offset: u64,
        to_offset: u64,
    ) -> bool;

    /// The retained attestation for (`digest`, `thread`), if any.
    fn attestation(&self, digest: Hash, thread: ThreadId) -> Option<Attestation>;
}
