//! # Inbound Ports
//!
//! API trait defining what a Subscriber can do.

use crate::domain::{DeliveryReceipt, HookDelivery, SubscriberError};
use shared_ledger::CallContext;
use shared_types::{Address, ThreadId};

/// Subscriber API - inbound port.
pub trait SubscriberApi: Send + Sync {
    /// The subscriber's own address (holds the fee balance).
    fn address(&self) -> Address;

    /// Accepts deliveries claiming (`publisher`, `thread`) from now on.
    /// Owner only. Seeds the nonce counter; never lowers an existing one.
    fn add_publisher(
        &self,
        ctx: &CallContext,
        publisher: Address,
        thread: ThreadId,
    ) -> Result<(), SubscriberError>;

    /// Verifies a delivery, pays the submitting relayer and hands the
    /// payload to the application.
    ///
    /// Checks run in order: publisher valid, validity window, nonce,
    /// authenticity. The first failure aborts with nothing changed.
    fn verify_hook(
        &self,
        ctx: &CallContext,
        delivery: &HookDelivery,
    ) -> Result<DeliveryReceipt, SubscriberError>;

    /// True iff (`publisher`, `thread`) was added.
    fn is_valid_publisher(&self, publisher: Address, thread: ThreadId) -> bool;

    /// Counter the next delivery for (`publisher`, `thread`) must exceed;
    /// `None` if the scope was never added.
    fn publisher_nonce(&self, publisher: Address, thread: ThreadId) -> Option<u64>;
}
