//! # Inbound Ports
//!
//! API trait defining what the Registry can do.

use crate::domain::{RegistryError, Subscription, SubscriptionTerms};
use shared_ledger::CallContext;
use shared_types::{Address, ThreadId};

/// Registry API - inbound port.
pub trait RegistryApi: Send + Sync {
    /// Records the caller as the key of (`publisher`, `thread`).
    ///
    /// Fails with `HookAlreadyRegistered` if an entry exists, then with
    /// `HookNotValid` if the publisher does not recognise the caller.
    fn register_hook(
        &self,
        ctx: &CallContext,
        publisher: Address,
        thread: ThreadId,
    ) -> Result<(), RegistryError>;

    /// Records a subscription owned by the caller.
    fn register_subscriber(
        &self,
        ctx: &CallContext,
        publisher: Address,
        subscriber: Address,
        thread: ThreadId,
        terms: SubscriptionTerms,
    ) -> Result<(), RegistryError>;

    /// Rotates the recorded key. Only the current key may call.
    fn update_hook(
        &self,
        ctx: &CallContext,
        publisher: Address,
        new_key: Address,
        thread: ThreadId,
    ) -> Result<(), RegistryError>;

    /// Replaces a subscription's terms. Only its owner may call.
    fn update_subscriber(
        &self,
        ctx: &CallContext,
        publisher: Address,
        subscriber: Address,
        thread: ThreadId,
        terms: SubscriptionTerms,
    ) -> Result<(), RegistryError>;

    /// Recorded key of (`publisher`, `thread`); zero if none.
    fn publisher_key(&self, publisher: Address, thread: ThreadId) -> Address;

    /// Subscription of `subscriber` to (`publisher`, `thread`).
    fn subscription(
        &self,
        subscriber: Address,
        publisher: Address,
        thread: ThreadId,
    ) -> Option<Subscription>;

    /// Owner of `subscriber`; zero if it never registered.
    fn owner_of(&self, subscriber: Address) -> Address;
}
