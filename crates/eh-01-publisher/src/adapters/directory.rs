//! Publisher Directory Adapter
//!
//! Routes `HookRegistrationOracle` and `AttestationOracle` queries to the
//! publisher deployed at the queried address.

use crate::ports::inbound::PublisherApi;
use parking_lot::RwLock;
use shared_types::{
    Address, AttestationOracle, AttestationStamp, Hash, HookRegistrationOracle, ThreadId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Address-indexed set of deployed publishers.
#[derive(Default)]
pub struct PublisherDirectory {
    publishers: RwLock<HashMap<Address, Arc<dyn PublisherApi>>>,
}

impl PublisherDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a publisher under its own address, replacing any previous entry.
    pub fn insert(&self, publisher: Arc<dyn PublisherApi>) {
        let address = publisher.address();
        self.publishers.write().insert(address, publisher);
        info!(publisher = ?address, "[eh-01] publisher listed in directory");
    }

    /// The publisher at `address`.
    pub fn get(&self, address: &Address) -> Option<Arc<dyn PublisherApi>> {
        self.publishers.read().get(address).cloned()
    }

    /// Number of listed publishers.
    pub fn len(&self) -> usize {
        self.publishers.read().len()
    }

    /// True if no publisher is listed.
    pub fn is_empty(&self) -> bool {
        self.publishers.read().is_empty()
    }
}

impl HookRegistrationOracle for PublisherDirectory {
    fn verify_hook_registration(&self, publisher: Address, thread: ThreadId, key: Address) -> bool {
        match self.get(&publisher) {
            Some(p) => p.verify_hook_registration(thread, key),
            None => {
                debug!(publisher = ?publisher, "[eh-01] unknown publisher");
                false
            }
        }
    }
}

impl AttestationOracle for PublisherDirectory {
    fn verify_event_hook(
        &self,
        publisher: Address,
        digest: Hash,
        thread: ThreadId,
        from_offset: u64,
        to_offset: u64,
    ) -> bool {
        self.get(&publisher)
            .is_some_and(|p| p.verify_event_hook(digest, thread, from_offset, to_offset))
    }

    fn attestation_stamp(
        &self,
        publisher: Address,
        digest: Hash,
        thread: ThreadId,
    ) -> Option<AttestationStamp> {
        self.get(&publisher)?
            .attestation(digest, thread)
            .map(|attestation| attestation.stamp())
    }
}
