//! # Fixtures
//!
//! One publisher, one registry and a funded subscriber per test, all on a
//! fresh ledger. Accounts are fixed so assertions can name them.

use eh_01_publisher::{
    FireHookRequest, FiredHook, Publisher, PublisherApi, PublisherConfig, PublisherDirectory,
};
use eh_02_registry::Registry;
use eh_03_subscriber::{
    AuthenticationStrategy, HookDelivery, Subscriber, SubscriberApi, SubscriberConfig,
};
use shared_crypto::Secp256k1KeyPair;
use shared_ledger::{Ledger, LedgerConfig};
use shared_types::{Address, Hash, ThreadId, U256};
use std::sync::Arc;

pub const PUBLISHER: Address = Address([0x50; 20]);
pub const PUBLISHER_OWNER: Address = Address([0xA0; 20]);
pub const REGISTRY: Address = Address([0xEE; 20]);
pub const SUBSCRIBER: Address = Address([0x5B; 20]);
pub const SUBSCRIBER_OWNER: Address = Address([0xB0; 20]);
pub const RELAYER: Address = Address([0x0E; 20]);

/// Fee used by fixture subscribers.
pub const FEE: u64 = 1_000_000;
/// Fixture subscribers start with this many fees in their balance.
pub const FUNDED_DELIVERIES: u64 = 100;
/// Validity window of fixture subscribers.
pub const VALIDITY: u64 = 20;

pub struct World {
    pub ledger: Arc<Ledger>,
    pub directory: Arc<PublisherDirectory>,
    pub publisher: Arc<Publisher>,
    pub registry: Registry,
}

impl World {
    pub fn new(config: PublisherConfig) -> Self {
        let ledger = Arc::new(Ledger::new(LedgerConfig::default()));
        let directory = Arc::new(PublisherDirectory::new());
        let publisher = Arc::new(Publisher::new(
            PUBLISHER,
            PUBLISHER_OWNER,
            config,
            ledger.clone(),
        ));
        directory.insert(publisher.clone());
        let registry = Registry::new(REGISTRY, directory.clone(), ledger.clone());
        Self {
            ledger,
            directory,
            publisher,
            registry,
        }
    }

    /// Emit-only publisher, local signature checks.
    pub fn emit_only() -> Self {
        Self::new(PublisherConfig::default())
    }

    /// Attesting publisher, for delegated checks.
    pub fn retaining() -> Self {
        Self::new(PublisherConfig::retaining())
    }

    pub fn subscriber_config() -> SubscriberConfig {
        SubscriberConfig::default()
            .with_fee(U256::from(FEE))
            .with_validity(VALIDITY)
    }

    /// A funded subscriber at `SUBSCRIBER`.
    pub fn subscriber(
        &self,
        strategy: AuthenticationStrategy,
        config: SubscriberConfig,
    ) -> Subscriber {
        self.ledger
            .deposit(SUBSCRIBER, U256::from(FEE * FUNDED_DELIVERIES))
            .unwrap();
        Subscriber::new(
            SUBSCRIBER,
            SUBSCRIBER_OWNER,
            strategy,
            config,
            self.ledger.clone(),
        )
    }

    pub fn local_subscriber(&self) -> Subscriber {
        self.subscriber(AuthenticationStrategy::LocalSignatureCheck, Self::subscriber_config())
    }

    pub fn delegated_subscriber(&self, from_offset: u64, to_offset: u64) -> Subscriber {
        self.subscriber(
            AuthenticationStrategy::delegated(self.directory.clone(), from_offset, to_offset),
            Self::subscriber_config(),
        )
    }

    /// Authorizes a fresh key for `thread` on the publisher.
    pub fn thread_key(&self, thread: u64) -> Secp256k1KeyPair {
        let key = Secp256k1KeyPair::generate();
        self.ledger
            .transact(PUBLISHER_OWNER, |ctx| {
                self.publisher.add_hook(ctx, ThreadId(thread), key.address())
            })
            .unwrap();
        key
    }

    /// Fires `payload(tag)` on `thread` with the thread's next sequence.
    pub fn fire(&self, key: &Secp256k1KeyPair, tag: u8, thread: u64) -> FiredHook {
        let thread = ThreadId(thread);
        let request = FireHookRequest::sign(
            payload(tag),
            thread,
            self.publisher.next_sequence(thread),
            &self.publisher.domain(),
            key,
        )
        .unwrap();
        self.ledger
            .transact(RELAYER, |ctx| self.publisher.fire_hook(ctx, &request))
            .unwrap()
    }

    pub fn add_publisher(&self, subscriber: &Subscriber, publisher: Address, thread: u64) {
        self.ledger
            .transact(SUBSCRIBER_OWNER, |ctx| {
                subscriber.add_publisher(ctx, publisher, ThreadId(thread))
            })
            .unwrap();
    }

    pub fn relayer_balance(&self) -> U256 {
        self.ledger.balance_of(&RELAYER)
    }
}

pub fn payload(tag: u8) -> Vec<Hash> {
    vec![Hash([tag; 32]), Hash([tag.wrapping_add(1); 32])]
}

/// The delivery a relayer builds from a retained firing.
pub fn attested_delivery(fired: &FiredHook, tag: u8) -> HookDelivery {
    HookDelivery::unsigned(
        PUBLISHER,
        payload(tag),
        fired.thread,
        fired.sequence,
        fired.fired_at,
    )
}

/// A delivery for `subscriber` signed by `key`.
pub fn signed_delivery(
    subscriber: &Subscriber,
    key: &Secp256k1KeyPair,
    thread: u64,
    nonce: u64,
    blockheight: u64,
) -> HookDelivery {
    HookDelivery::sign(
        payload(nonce as u8),
        ThreadId(thread),
        nonce,
        blockheight,
        &subscriber.domain(),
        key,
    )
    .unwrap()
}
