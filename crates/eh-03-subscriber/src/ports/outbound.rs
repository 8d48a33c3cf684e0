//! # Outbound Ports
//!
//! What the Subscriber needs from outside: publisher attestations for the
//! delegated strategy, and the application that consumes payloads.

use crate::domain::DeliveryReceipt;
use shared_ledger::CallContext;
use shared_types::Hash;

pub use shared_types::{AttestationOracle, AttestationStamp};

/// Application-level consumer of accepted payloads.
///
/// Called after the fee is paid and the nonce advanced, with no subscriber
/// lock held. A handler that re-enters `verify_hook` sees the advanced
/// counter.
pub trait HookHandler: Send + Sync {
    /// Handle an accepted payload.
    fn on_hook(&self, ctx: &CallContext, receipt: &DeliveryReceipt, payload: &[Hash]);
}
