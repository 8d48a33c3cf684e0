//! # Subscriber Service
//!
//! Accepts hook deliveries from relayers, pays each successful relayer a
//! fixed fee and passes the payload to the application handler.
//!
//! ## Delivery Pipeline
//!
//! ```text
//! HookDelivery from relayer (ctx.sender)
//!   -> (publisher, thread) added?                 PublisherNotValid
//!   -> blockheight <= now < blockheight + window  NotValidYet / Expired
//!   -> nonce > last accepted                      ObsoleteHookDetected
//!   -> authentic?
//!        LocalSignatureCheck        recover(Hook msg) == publisher   SignatureMismatch
//!        DelegatedAttestationCheck  publisher.verify_event_hook(..)  AttestationMissing
//!                                   nonce, blockheight == attested   AttestationMismatch
//!   -> nonce still > last accepted                ObsoleteHookDetected
//!   -> pay fee to relayer                         Settlement
//!   -> nonce = delivered nonce
//!   -> HookHandler::on_hook (lock released)
//! ```
//!
//! The first three checks read a snapshot of the state. No lock is held
//! while the oracle answers, so an oracle that calls back into the
//! subscriber gets an answer instead of a deadlock. The nonce is checked
//! again under the write lock, then the fee is paid and the counter moves.
//! The fee transfer is the only fallible mutation and runs before the
//! nonce update, so a failed payment leaves nothing changed. The handler
//! runs only after the lock is released and the counter has moved, so a
//! handler that re-enters `verify_hook` with the same delivery is rejected
//! as obsolete and no nonce is ever paid twice.

use crate::adapters::NoopHandler;
use crate::domain::{
    invariant_matches_attestation, invariant_nonce_fresh, invariant_owner,
    invariant_within_validity, AuthenticationStrategy, DeliveryReceipt, HookDelivery, NonceScope,
    NonceSeed, SubscriberError,
};
use crate::ports::{HookHandler, SubscriberApi};
use hook_telemetry::{
    time_histogram, DELIVERY_DURATION, HOOK_DELIVERIES, RELAYER_PAYMENTS, SIGNATURE_RECOVERIES,
};
use parking_lot::RwLock;
use shared_crypto::{recover_address, DomainConfig, Eip712Domain, TypedMessage};
use shared_ledger::{CallContext, Ledger};
use shared_types::{Address, Categorized, ScopeKey, ThreadId, U256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default relayer fee: 0.001 of a 10^18-unit coin.
pub const DEFAULT_RELAYER_FEE: u64 = 1_000_000_000_000_000;

/// Default number of blocks a signed delivery stays valid.
pub const DEFAULT_VALIDITY_BLOCKS: u64 = 256;

/// Subscriber configuration.
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Signing domain (bound to the ledger chain id and this subscriber).
    pub domain: DomainConfig,
    /// Fee paid to the relayer of each accepted delivery.
    pub relayer_fee: U256,
    /// Blocks after `blockheight` during which a delivery is accepted.
    pub validity_blocks: u64,
    /// Starting value of a new nonce counter.
    pub nonce_seed: NonceSeed,
    /// Per-scope or shared nonce counter.
    pub nonce_scope: NonceScope,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            domain: DomainConfig::default(),
            relayer_fee: U256::from(DEFAULT_RELAYER_FEE),
            validity_blocks: DEFAULT_VALIDITY_BLOCKS,
            nonce_seed: NonceSeed::default(),
            nonce_scope: NonceScope::default(),
        }
    }
}

impl SubscriberConfig {
    /// Sets the relayer fee.
    #[must_use]
    pub fn with_fee(mut self, fee: U256) -> Self {
        self.relayer_fee = fee;
        self
    }

    /// Sets the validity window length.
    #[must_use]
    pub fn with_validity(mut self, blocks: u64) -> Self {
        self.validity_blocks = blocks;
        self
    }

    /// Single shared counter seeded at the current height.
    #[must_use]
    pub fn single_thread(mut self) -> Self {
        self.nonce_scope = NonceScope::Global;
        self.nonce_seed = NonceSeed::CurrentHeight;
        self
    }
}

/// Subscriber statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberStats {
    /// Deliveries accepted.
    pub accepted: u64,
    /// Deliveries rejected.
    pub rejected: u64,
    /// Total fees paid to relayers.
    pub fees_paid: U256,
}

#[derive(Default)]
struct SubscriberState {
    publishers: HashSet<ScopeKey>,
    nonces: HashMap<ScopeKey, u64>,
    global_nonce: u64,
    stats: SubscriberStats,
}

impl SubscriberState {
    fn last_nonce(&self, scope: NonceScope, key: &ScopeKey) -> u64 {
        match scope {
            NonceScope::PerPublisherThread => self.nonces.get(key).copied().unwrap_or_default(),
            NonceScope::Global => self.global_nonce,
        }
    }

    fn set_nonce(&mut self, scope: NonceScope, key: ScopeKey, nonce: u64) {
        match scope {
            NonceScope::PerPublisherThread => {
                self.nonces.insert(key, nonce);
            }
            NonceScope::Global => self.global_nonce = nonce,
        }
    }
}

/// A subscriber.
pub struct Subscriber {
    address: Address,
    owner: Address,
    strategy: AuthenticationStrategy,
    config: SubscriberConfig,
    ledger: Arc<Ledger>,
    handler: Arc<dyn HookHandler>,
    state: RwLock<SubscriberState>,
}

impl Subscriber {
    /// Creates a subscriber at `address` controlled by `owner`.
    pub fn new(
        address: Address,
        owner: Address,
        strategy: AuthenticationStrategy,
        config: SubscriberConfig,
        ledger: Arc<Ledger>,
    ) -> Self {
        info!(
            subscriber = ?address,
            owner = ?owner,
            strategy = strategy.as_str(),
            fee = %config.relayer_fee,
            validity_blocks = config.validity_blocks,
            "[eh-03] subscriber created"
        );
        Self {
            address,
            owner,
            strategy,
            config,
            ledger,
            handler: Arc::new(NoopHandler),
            state: RwLock::new(SubscriberState::default()),
        }
    }

    /// Replaces the application handler.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn HookHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Owner address.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Authentication strategy.
    pub fn strategy(&self) -> &AuthenticationStrategy {
        &self.strategy
    }

    /// Configuration.
    pub fn config(&self) -> &SubscriberConfig {
        &self.config
    }

    /// The domain keys sign `Hook` messages in.
    pub fn domain(&self) -> Eip712Domain {
        self.config.domain.bind(self.ledger.chain_id(), self.address)
    }

    /// Fee balance.
    pub fn balance(&self) -> U256 {
        self.ledger.balance_of(&self.address)
    }

    /// The shared counter of a `NonceScope::Global` subscriber.
    pub fn current_nonce(&self) -> u64 {
        self.state.read().global_nonce
    }

    /// Current statistics.
    pub fn stats(&self) -> SubscriberStats {
        self.state.read().stats
    }

    fn authenticate(&self, delivery: &HookDelivery) -> Result<(), SubscriberError> {
        match &self.strategy {
            AuthenticationStrategy::LocalSignatureCheck => {
                let Some(signature) = &delivery.signature else {
                    return Err(SubscriberError::SignatureMismatch {
                        expected: delivery.publisher,
                        recovered: None,
                    });
                };
                let digest = delivery.message().signing_digest(&self.domain())?;
                let recovered = recover_address(&digest, signature).map_err(|e| {
                    SIGNATURE_RECOVERIES.with_label_values(&["malformed"]).inc();
                    SubscriberError::MalformedSignature(e)
                })?;
                if recovered != delivery.publisher {
                    SIGNATURE_RECOVERIES.with_label_values(&["mismatch"]).inc();
                    return Err(SubscriberError::SignatureMismatch {
                        expected: delivery.publisher,
                        recovered: Some(recovered),
                    });
                }
                SIGNATURE_RECOVERIES.with_label_values(&["match"]).inc();
                Ok(())
            }
            AuthenticationStrategy::DelegatedAttestationCheck {
                oracle,
                from_offset,
                to_offset,
            } => {
                let digest = delivery.digest();
                let missing = || SubscriberError::PublisherAttestationMissing {
                    publisher: delivery.publisher,
                    digest,
                    thread: delivery.thread,
                };
                if !oracle.verify_event_hook(
                    delivery.publisher,
                    digest,
                    delivery.thread,
                    *from_offset,
                    *to_offset,
                ) {
                    return Err(missing());
                }
                let stamp = oracle
                    .attestation_stamp(delivery.publisher, digest, delivery.thread)
                    .ok_or_else(missing)?;
                invariant_matches_attestation(delivery.nonce, delivery.blockheight, &stamp)
            }
        }
    }

    fn try_verify(
        &self,
        ctx: &CallContext,
        delivery: &HookDelivery,
    ) -> Result<DeliveryReceipt, SubscriberError> {
        let scope = ScopeKey::new(delivery.publisher, delivery.thread);
        let nonce_scope = self.config.nonce_scope;

        {
            let state = self.state.read();
            if !state.publishers.contains(&scope) {
                return Err(SubscriberError::PublisherNotValid {
                    publisher: delivery.publisher,
                    thread: delivery.thread,
                });
            }
            invariant_within_validity(
                delivery.blockheight,
                self.config.validity_blocks,
                ctx.block_height,
            )?;
            invariant_nonce_fresh(delivery.nonce, state.last_nonce(nonce_scope, &scope))?;
        }
        self.authenticate(delivery)?;

        let mut state = self.state.write();
        // the oracle may have re-entered and moved the counter
        invariant_nonce_fresh(delivery.nonce, state.last_nonce(nonce_scope, &scope))?;
        let fee = self.config.relayer_fee;
        self.ledger.transfer(self.address, ctx.sender, fee)?;
        state.set_nonce(nonce_scope, scope, delivery.nonce);
        state.stats.accepted += 1;
        state.stats.fees_paid = state.stats.fees_paid.saturating_add(fee);

        Ok(DeliveryReceipt {
            publisher: delivery.publisher,
            thread: delivery.thread,
            nonce: delivery.nonce,
            digest: delivery.digest(),
            relayer: ctx.sender,
            fee,
            accepted_at: ctx.block_height,
        })
    }

    fn reject(&self, err: SubscriberError) -> SubscriberError {
        self.state.write().stats.rejected += 1;
        HOOK_DELIVERIES
            .with_label_values(&[self.strategy.as_str(), err.category().as_str()])
            .inc();
        if err.category().is_routine() {
            debug!(subscriber = ?self.address, error = %err, "[eh-03] delivery rejected");
        } else {
            warn!(subscriber = ?self.address, error = %err, "[eh-03] delivery rejected");
        }
        err
    }
}

impl SubscriberApi for Subscriber {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self, ctx), fields(subscriber = ?self.address, caller = ?ctx.sender))]
    fn add_publisher(
        &self,
        ctx: &CallContext,
        publisher: Address,
        thread: ThreadId,
    ) -> Result<(), SubscriberError> {
        invariant_owner(&self.owner, &ctx.sender)?;
        let seed = match self.config.nonce_seed {
            NonceSeed::Zero => 0,
            NonceSeed::CurrentHeight => ctx.block_height,
        };
        let scope = ScopeKey::new(publisher, thread);

        let mut state = self.state.write();
        state.publishers.insert(scope);
        let nonce = match self.config.nonce_scope {
            NonceScope::PerPublisherThread => {
                let counter = state.nonces.entry(scope).or_insert(seed);
                *counter = (*counter).max(seed);
                *counter
            }
            NonceScope::Global => {
                state.global_nonce = state.global_nonce.max(seed);
                state.global_nonce
            }
        };
        info!(publisher = ?publisher, thread = %thread, nonce, "[eh-03] publisher added");
        Ok(())
    }

    #[instrument(
        skip(self, ctx, delivery),
        fields(
            subscriber = ?self.address,
            relayer = ?ctx.sender,
            thread = %delivery.thread,
            nonce = delivery.nonce
        )
    )]
    fn verify_hook(
        &self,
        ctx: &CallContext,
        delivery: &HookDelivery,
    ) -> Result<DeliveryReceipt, SubscriberError> {
        let timer = time_histogram!(DELIVERY_DURATION);
        let receipt = self.try_verify(ctx, delivery).map_err(|e| self.reject(e))?;
        drop(timer);

        HOOK_DELIVERIES
            .with_label_values(&[self.strategy.as_str(), "accepted"])
            .inc();
        RELAYER_PAYMENTS
            .with_label_values(&[self.strategy.as_str()])
            .inc();
        info!(
            publisher = ?receipt.publisher,
            digest = ?receipt.digest,
            fee = %receipt.fee,
            "[eh-03] hook accepted, relayer paid"
        );

        self.handler.on_hook(ctx, &receipt, &delivery.payload);
        Ok(receipt)
    }

    fn is_valid_publisher(&self, publisher: Address, thread: ThreadId) -> bool {
        self.state
            .read()
            .publishers
            .contains(&ScopeKey::new(publisher, thread))
    }

    fn publisher_nonce(&self, publisher: Address, thread: ThreadId) -> Option<u64> {
        let scope = ScopeKey::new(publisher, thread);
        let state = self.state.read();
        state
            .publishers
            .contains(&scope)
            .then(|| state.last_nonce(self.config.nonce_scope, &scope))
    }
}
