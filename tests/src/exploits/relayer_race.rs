//! # Relayer Races
//!
//! Many relayers submit the same delivery at once. The ledger orders
//! them; the first wins the nonce and the fee, the rest see an obsolete
//! nonce.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use eh_03_subscriber::{AuthenticationStrategy, SubscriberApi, SubscriberError};
    use shared_ledger::LedgerError;
    use shared_types::{Address, Categorized, ErrorCategory, U256};
    use std::sync::Arc;
    use tokio::task::JoinSet;

    const RELAYERS: u8 = 100;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_relayers_one_winner() {
        let world = World::emit_only();
        let key = world.thread_key(1);
        let subscriber = Arc::new(world.local_subscriber());
        world.add_publisher(&subscriber, key.address(), 1);
        let delivery = Arc::new(signed_delivery(&subscriber, &key, 1, 1, 0));

        let mut tasks = JoinSet::new();
        for i in 0..RELAYERS {
            let ledger = world.ledger.clone();
            let subscriber = subscriber.clone();
            let delivery = delivery.clone();
            tasks.spawn(async move {
                let mut id = [0xF0; 20];
                id[19] = i;
                let relayer = Address::new(id);
                let result = ledger.transact(relayer, |ctx| subscriber.verify_hook(ctx, &delivery));
                (relayer, result)
            });
        }

        let mut winners = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (relayer, result) = joined.unwrap();
            match result {
                Ok(_) => winners.push(relayer),
                Err(err) => assert!(matches!(err, SubscriberError::ObsoleteHookDetected { .. })),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(world.ledger.balance_of(&winners[0]), U256::from(FEE));
        assert_eq!(
            subscriber.balance(),
            U256::from(FEE * (FUNDED_DELIVERIES - 1))
        );
        assert_eq!(subscriber.stats().rejected, u64::from(RELAYERS) - 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_distinct_nonces_each_paid_once() {
        let world = World::emit_only();
        let key = world.thread_key(1);
        let subscriber = Arc::new(world.local_subscriber());
        world.add_publisher(&subscriber, key.address(), 1);

        let mut tasks = JoinSet::new();
        for nonce in 1..=20u64 {
            let ledger = world.ledger.clone();
            let subscriber = subscriber.clone();
            let delivery = signed_delivery(&subscriber, &key, 1, nonce, 0);
            tasks.spawn(async move {
                ledger.transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            });
        }

        let mut accepted = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            if let Ok(receipt) = joined.unwrap() {
                accepted.push(receipt.nonce);
            }
        }

        // arrival order decides which survive; whatever was accepted was
        // accepted in increasing nonce order and paid exactly once
        assert!(!accepted.is_empty());
        let paid = U256::from(FEE) * U256::from(accepted.len());
        assert_eq!(world.relayer_balance(), paid);
        let mut sorted = accepted.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), accepted.len());
        assert_eq!(
            subscriber.publisher_nonce(key.address(), shared_types::ThreadId(1)),
            sorted.last().copied()
        );
    }

    #[test]
    fn test_unfunded_subscriber_changes_nothing() {
        let world = World::emit_only();
        let key = world.thread_key(1);
        let subscriber = eh_03_subscriber::Subscriber::new(
            Address::new([0x5D; 20]),
            SUBSCRIBER_OWNER,
            AuthenticationStrategy::LocalSignatureCheck,
            World::subscriber_config(),
            world.ledger.clone(),
        );
        world.add_publisher(&subscriber, key.address(), 1);
        let delivery = signed_delivery(&subscriber, &key, 1, 1, 0);

        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap_err();
        assert!(matches!(
            err,
            SubscriberError::Settlement(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(err.category(), ErrorCategory::Settlement);
        assert_eq!(subscriber.publisher_nonce(key.address(), shared_types::ThreadId(1)), Some(0));
        assert_eq!(world.relayer_balance(), U256::zero());

        // once funded, the same delivery goes through
        world
            .ledger
            .deposit(subscriber.address(), U256::from(FEE))
            .unwrap();
        world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap();
        assert_eq!(world.relayer_balance(), U256::from(FEE));
    }
}
