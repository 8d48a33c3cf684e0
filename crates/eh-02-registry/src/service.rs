//! # Registry Service
//!
//! Records claims made by publishers and subscribers. It never inspects
//! their internals; the only outside question it asks is the publisher's
//! `verify_hook_registration`.
//!
//! ## State
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | publishers | `ScopeKey` (publisher, thread) | recorded key |
//! | subscriptions | `SubscriptionKey` (subscriber, publisher, thread) | `Subscription` |
//! | owners | subscriber | first registrant |
//!
//! Entries are created once and changed only through the authorization
//! checked update operations. Nothing is ever deleted.

use crate::domain::{invariant_fee_positive, RegistryError, Subscription, SubscriptionTerms};
use crate::ports::{HookRegistrationOracle, RegistryApi};
use hook_telemetry::REGISTRY_OPERATIONS;
use parking_lot::RwLock;
use shared_ledger::{CallContext, Ledger};
use shared_types::{Address, Categorized, HookEvent, ScopeKey, SubscriptionKey, ThreadId, U256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Default)]
struct RegistryState {
    publishers: HashMap<ScopeKey, Address>,
    subscriptions: HashMap<SubscriptionKey, Subscription>,
    owners: HashMap<Address, Address>,
}

/// The registry.
pub struct Registry {
    address: Address,
    oracle: Arc<dyn HookRegistrationOracle>,
    ledger: Arc<Ledger>,
    state: RwLock<RegistryState>,
}

impl Registry {
    /// Creates a registry at `address`, asking `oracle` to confirm key claims.
    pub fn new(
        address: Address,
        oracle: Arc<dyn HookRegistrationOracle>,
        ledger: Arc<Ledger>,
    ) -> Self {
        info!(registry = ?address, "[eh-02] registry created");
        Self {
            address,
            oracle,
            ledger,
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// The registry's own address (emitter of its events).
    pub fn address(&self) -> Address {
        self.address
    }

    /// Fee of a subscription; zero if absent.
    pub fn fee(&self, subscriber: Address, publisher: Address, thread: ThreadId) -> U256 {
        self.subscription(subscriber, publisher, thread)
            .map_or_else(U256::zero, |s| s.fee())
    }

    /// Every subscription to (`publisher`, `thread`), ordered by subscriber.
    ///
    /// Relayers use this to find where a fired hook can be delivered.
    pub fn subscribers_of(
        &self,
        publisher: Address,
        thread: ThreadId,
    ) -> Vec<(Address, Subscription)> {
        let state = self.state.read();
        let mut subscribers: Vec<(Address, Subscription)> = state
            .subscriptions
            .iter()
            .filter(|(key, _)| key.publisher == publisher && key.thread == thread)
            .map(|(key, sub)| (key.subscriber, *sub))
            .collect();
        subscribers.sort_by_key(|(subscriber, _)| *subscriber);
        subscribers
    }

    fn record<T>(
        &self,
        operation: &'static str,
        result: Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => {
                warn!(operation, error = %err, "[eh-02] registry operation rejected");
                err.category().as_str()
            }
        };
        REGISTRY_OPERATIONS
            .with_label_values(&[operation, outcome])
            .inc();
        result
    }

    fn try_register_hook(
        &self,
        ctx: &CallContext,
        publisher: Address,
        thread: ThreadId,
    ) -> Result<(), RegistryError> {
        let scope = ScopeKey::new(publisher, thread);
        if self.state.read().publishers.contains_key(&scope) {
            return Err(RegistryError::HookAlreadyRegistered { publisher, thread });
        }
        // asked without holding the lock; the publisher may read the registry
        if !self.oracle.verify_hook_registration(publisher, thread, ctx.sender) {
            return Err(RegistryError::HookNotValid {
                publisher,
                thread,
                caller: ctx.sender,
            });
        }
        let mut state = self.state.write();
        if state.publishers.contains_key(&scope) {
            return Err(RegistryError::HookAlreadyRegistered { publisher, thread });
        }
        state.publishers.insert(scope, ctx.sender);
        drop(state);

        self.ledger.emit(
            self.address,
            HookEvent::HookRegistered {
                publisher,
                key: ctx.sender,
                thread,
            },
        );
        info!(
            publisher = ?publisher,
            thread = %thread,
            key = ?ctx.sender,
            "[eh-02] hook registered"
        );
        Ok(())
    }

    fn try_register_subscriber(
        &self,
        ctx: &CallContext,
        key: SubscriptionKey,
        terms: SubscriptionTerms,
    ) -> Result<(), RegistryError> {
        invariant_fee_positive(&terms.fee)?;
        let mut state = self.state.write();
        if state.subscriptions.contains_key(&key) {
            return Err(RegistryError::SubscriberAlreadyRegistered {
                subscriber: key.subscriber,
                publisher: key.publisher,
                thread: key.thread,
            });
        }
        if let Some(owner) = state.owners.get(&key.subscriber) {
            if *owner != ctx.sender {
                return Err(RegistryError::SubscriberOwnedByAnother {
                    subscriber: key.subscriber,
                    owner: *owner,
                });
            }
        }
        state.subscriptions.insert(
            key,
            Subscription {
                terms,
                owner: ctx.sender,
            },
        );
        state.owners.entry(key.subscriber).or_insert(ctx.sender);
        drop(state);

        self.ledger.emit(
            self.address,
            HookEvent::SubscriberRegistered {
                publisher: key.publisher,
                subscriber: key.subscriber,
                fee: terms.fee,
                thread: key.thread,
            },
        );
        info!(
            subscriber = ?key.subscriber,
            publisher = ?key.publisher,
            thread = %key.thread,
            fee = %terms.fee,
            "[eh-02] subscriber registered"
        );
        Ok(())
    }

    fn try_update_hook(
        &self,
        ctx: &CallContext,
        publisher: Address,
        new_key: Address,
        thread: ThreadId,
    ) -> Result<(), RegistryError> {
        let scope = ScopeKey::new(publisher, thread);
        let mut state = self.state.write();
        if state.publishers.get(&scope) != Some(&ctx.sender) {
            return Err(RegistryError::NotAuthorizedToUpdateHook { caller: ctx.sender });
        }
        state.publishers.insert(scope, new_key);
        drop(state);

        self.ledger.emit(
            self.address,
            HookEvent::HookUpdated {
                publisher,
                key: new_key,
                thread,
            },
        );
        info!(
            publisher = ?publisher,
            thread = %thread,
            key = ?new_key,
            "[eh-02] hook key rotated"
        );
        Ok(())
    }

    fn try_update_subscriber(
        &self,
        ctx: &CallContext,
        key: SubscriptionKey,
        terms: SubscriptionTerms,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        let subscription = match state.subscriptions.get_mut(&key) {
            Some(sub) if sub.owner == ctx.sender => sub,
            _ => {
                return Err(RegistryError::NotAuthorizedToUpdateSubscriber {
                    caller: ctx.sender,
                });
            }
        };
        invariant_fee_positive(&terms.fee)?;
        subscription.terms = terms;
        drop(state);

        self.ledger.emit(
            self.address,
            HookEvent::SubscriberUpdated {
                publisher: key.publisher,
                subscriber: key.subscriber,
                fee: terms.fee,
                thread: key.thread,
            },
        );
        info!(subscriber = ?key.subscriber, fee = %terms.fee, "[eh-02] subscriber updated");
        Ok(())
    }
}

impl RegistryApi for Registry {
    #[instrument(skip(self, ctx), fields(caller = ?ctx.sender))]
    fn register_hook(
        &self,
        ctx: &CallContext,
        publisher: Address,
        thread: ThreadId,
    ) -> Result<(), RegistryError> {
        self.record("register_hook", self.try_register_hook(ctx, publisher, thread))
    }

    #[instrument(skip(self, ctx, terms), fields(caller = ?ctx.sender))]
    fn register_subscriber(
        &self,
        ctx: &CallContext,
        publisher: Address,
        subscriber: Address,
        thread: ThreadId,
        terms: SubscriptionTerms,
    ) -> Result<(), RegistryError> {
        let key = SubscriptionKey::new(subscriber, publisher, thread);
        self.record("register_subscriber", self.try_register_subscriber(ctx, key, terms))
    }

    #[instrument(skip(self, ctx), fields(caller = ?ctx.sender))]
    fn update_hook(
        &self,
        ctx: &CallContext,
        publisher: Address,
        new_key: Address,
        thread: ThreadId,
    ) -> Result<(), RegistryError> {
        self.record("update_hook", self.try_update_hook(ctx, publisher, new_key, thread))
    }

    #[instrument(skip(self, ctx, terms), fields(caller = ?ctx.sender))]
    fn update_subscriber(
        &self,
        ctx: &CallContext,
        publisher: Address,
        subscriber: Address,
        thread: ThreadId,
        terms: SubscriptionTerms,
    ) -> Result<(), RegistryError> {
        let key = SubscriptionKey::new(subscriber, publisher, thread);
        self.record("update_subscriber", self.try_update_subscriber(ctx, key, terms))
    }

    fn publisher_key(&self, publisher: Address, thread: ThreadId) -> Address {
        self.state
            .read()
            .publishers
            .get(&ScopeKey::new(publisher, thread))
            .copied()
            .unwrap_or(Address::ZERO)
    }

    fn subscription(
        &self,
        subscriber: Address,
        publisher: Address,
        thread: ThreadId,
    ) -> Option<Subscription> {
        self.state
            .read()
            .subscriptions
            .get(&SubscriptionKey::new(subscriber, publisher, thread))
            .copied()
    }

    fn owner_of(&self, subscriber: Address) -> Address {
        self.state
            .read()
            .owners
            .get(&subscriber)
            .copied()
            .unwrap_or(Address::ZERO)
    }
}
