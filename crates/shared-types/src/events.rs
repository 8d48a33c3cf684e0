//! # Protocol Events
//!
//! The externally observable signals of the protocol. Off-core relayers
//! discover work by reading these from the ledger's event log.

use crate::entities::{Address, BlockHeight, Hash, ThreadId, U256};
use serde::{Deserialize, Serialize};

/// An event emitted by a publisher or the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HookEvent {
    /// A publisher authenticated and fired a hook.
    HookFired {
        /// Payload digest the publisher attested
        digest: Hash,
        /// Thread the hook was fired on
        thread: ThreadId,
    },

    /// A (publisher, thread) key claim was recorded by the registry.
    HookRegistered {
        /// Publisher address
        publisher: Address,
        /// Signing key now recorded for the thread
        key: Address,
        /// Thread
        thread: ThreadId,
    },

    /// The recorded key for a (publisher, thread) was rotated.
    HookUpdated {
        /// Publisher address
        publisher: Address,
        /// Replacement signing key
        key: Address,
        /// Thread
        thread: ThreadId,
    },

    /// A subscription was created.
    SubscriberRegistered {
        /// Publisher address
        publisher: Address,
        /// Subscriber address
        subscriber: Address,
        /// Fee paid per delivery
        fee: U256,
        /// Thread
        thread: ThreadId,
    },

    /// A subscription's terms were changed by its owner.
    SubscriberUpdated {
        /// Publisher address
        publisher: Address,
        /// Subscriber address
        subscriber: Address,
        /// New fee
        fee: U256,
        /// Thread
        thread: ThreadId,
    },
}

impl HookEvent {
    /// Short name used in logs and metrics labels.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HookFired { .. } => "hook_fired",
            Self::HookRegistered { .. } => "hook_registered",
            Self::HookUpdated { .. } => "hook_updated",
            Self::SubscriberRegistered { .. } => "subscriber_registered",
            Self::SubscriberUpdated { .. } => "subscriber_updated",
        }
    }
}

/// An event as recorded in the ledger log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedEvent {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// Component that emitted the event.
    pub emitter: Address,
    /// Height at which the emitting transaction executed.
    pub block_height: BlockHeight,
    /// The event itself.
    pub event: HookEvent,
}
