//! # Integration Test Flows
//!
//! A thread key is authorized on a publisher, registered in the registry,
//! fires hooks, and a relayer delivers them to a subscriber for a fee.
//!
//! ## Flows Tested:
//!
//! 1. **Publisher -> Registry**: registration is confirmed by the publisher
//! 2. **Registry**: subscriber terms, ownership and updates
//! 3. **Publisher -> Subscriber (signature)**: signed delivery, replay, wrong key
//! 4. **Publisher -> Subscriber (attestation)**: fire, attest, deliver within the window
//! 5. **Relayer discovery**: events and registry reads drive a delivery; JSON hand-off
//! 6. **Telemetry**: a flow shows up in the exported metrics

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use eh_02_registry::{RegistryApi, RegistryError, SubscriptionTerms};
    use eh_03_subscriber::{HookDelivery, SubscriberApi, SubscriberError};
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{Address, Categorized, ErrorCategory, HookEvent, ThreadId, U256};

    // =============================================================================
    // REGISTRY
    // =============================================================================

    #[test]
    fn test_register_hook_scenario() {
        let world = World::emit_only();
        let key = world.thread_key(1);

        world
            .ledger
            .transact(key.address(), |ctx| {
                world.registry.register_hook(ctx, PUBLISHER, ThreadId(1))
            })
            .unwrap();
        assert_eq!(world.registry.publisher_key(PUBLISHER, ThreadId(1)), key.address());

        for caller in [key.address(), RELAYER, PUBLISHER_OWNER] {
            let err = world
                .ledger
                .transact(caller, |ctx| {
                    world.registry.register_hook(ctx, PUBLISHER, ThreadId(1))
                })
                .unwrap_err();
            assert!(err.to_string().contains("Hook already registered"));
            assert_eq!(err.category(), ErrorCategory::Conflict);
        }
    }

    #[test]
    fn test_register_hook_requires_publisher_confirmation() {
        let world = World::emit_only();
        let _key = world.thread_key(1);
        let err = world
            .ledger
            .transact(RELAYER, |ctx| {
                world.registry.register_hook(ctx, PUBLISHER, ThreadId(1))
            })
            .unwrap_err();
        assert!(err.to_string().contains("Hook not valid"));

        // unknown publisher address
        let err = world
            .ledger
            .transact(RELAYER, |ctx| {
                world.registry.register_hook(ctx, Address::new([0x77; 20]), ThreadId(1))
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::HookNotValid { .. }));
    }

    #[test]
    fn test_register_subscriber_scenario() {
        let world = World::emit_only();
        let register = |fee: u64| {
            world.ledger.transact(SUBSCRIBER_OWNER, |ctx| {
                world.registry.register_subscriber(
                    ctx,
                    PUBLISHER,
                    SUBSCRIBER,
                    ThreadId(1),
                    SubscriptionTerms::with_fee(U256::from(fee))
                        .gas_bounds(200_000, U256::from(1_000_000_000u64)),
                )
            })
        };

        register(460_000).unwrap();
        let err = register(460_000).unwrap_err();
        assert!(err.to_string().contains("Subscriber already registered"));
        let err = register(0).unwrap_err();
        assert_eq!(err.to_string(), "Fee must be greater than 0");

        let events: Vec<HookEvent> = world
            .ledger
            .events_from(&REGISTRY)
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert_eq!(
            events,
            vec![HookEvent::SubscriberRegistered {
                publisher: PUBLISHER,
                subscriber: SUBSCRIBER,
                fee: U256::from(460_000u64),
                thread: ThreadId(1),
            }]
        );
    }

    #[test]
    fn test_key_rotation_through_registry() {
        let world = World::emit_only();
        let key = world.thread_key(1);
        world
            .ledger
            .transact(key.address(), |ctx| {
                world.registry.register_hook(ctx, PUBLISHER, ThreadId(1))
            })
            .unwrap();

        let next = Secp256k1KeyPair::generate();
        let err = world
            .ledger
            .transact(RELAYER, |ctx| {
                world.registry.update_hook(ctx, PUBLISHER, next.address(), ThreadId(1))
            })
            .unwrap_err();
        assert!(err.to_string().contains("Not authorized to update hook"));

        world
            .ledger
            .transact(key.address(), |ctx| {
                world.registry.update_hook(ctx, PUBLISHER, next.address(), ThreadId(1))
            })
            .unwrap();
        assert_eq!(world.registry.publisher_key(PUBLISHER, ThreadId(1)), next.address());
        assert!(matches!(
            world.ledger.events_from(&REGISTRY).last().map(|e| &e.event),
            Some(HookEvent::HookUpdated { .. })
        ));
    }

    // =============================================================================
    // SIGNATURE-CHECKED DELIVERY
    // =============================================================================

    #[test]
    fn test_subscriber_scenario() {
        let world = World::emit_only();
        let key = world.thread_key(1);
        let subscriber = world.local_subscriber();
        world.add_publisher(&subscriber, key.address(), 1);
        assert_eq!(subscriber.publisher_nonce(key.address(), ThreadId(1)), Some(0));

        let err = world
            .ledger
            .transact(RELAYER, |ctx| {
                subscriber.add_publisher(ctx, key.address(), ThreadId(2))
            })
            .unwrap_err();
        assert!(err.to_string().contains("Caller is not the owner"));

        let delivery = signed_delivery(&subscriber, &key, 1, 2, 0);
        world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap();
        assert_eq!(subscriber.publisher_nonce(key.address(), ThreadId(1)), Some(2));
        assert_eq!(world.relayer_balance(), U256::from(FEE));

        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap_err();
        assert!(err.to_string().contains("Obsolete hook detected"));

        let stranger = Secp256k1KeyPair::generate();
        let mut forged = signed_delivery(&subscriber, &stranger, 1, 3, 0);
        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &forged))
            .unwrap_err();
        assert!(err.to_string().contains("Publisher not valid"));

        forged.publisher = key.address();
        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &forged))
            .unwrap_err();
        assert!(err.to_string().contains("Signature mismatch"));
        assert_eq!(world.relayer_balance(), U256::from(FEE));
    }

    #[test]
    fn test_fee_conservation() {
        let world = World::emit_only();
        let key = world.thread_key(1);
        let subscriber = world.local_subscriber();
        world.add_publisher(&subscriber, key.address(), 1);
        let start = subscriber.balance();

        for nonce in 1..=5u64 {
            let delivery = signed_delivery(&subscriber, &key, 1, nonce, 0);
            world
                .ledger
                .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
                .unwrap();
            let paid = U256::from(FEE * nonce);
            assert_eq!(subscriber.balance() + paid, start);
            assert_eq!(world.relayer_balance(), paid);
        }
    }

    #[test]
    fn test_expired_delivery_after_mining() {
        let world = World::emit_only();
        let key = world.thread_key(1);
        let subscriber = world.local_subscriber();
        world.add_publisher(&subscriber, key.address(), 1);

        let delivery = signed_delivery(&subscriber, &key, 1, 1, world.ledger.height());
        world.ledger.advance_blocks(VALIDITY);
        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap_err();
        assert!(matches!(err, SubscriberError::HookEventHasExpired { .. }));
        assert_eq!(subscriber.publisher_nonce(key.address(), ThreadId(1)), Some(0));
    }

    #[test]
    fn test_signature_bound_to_subscriber_domain() {
        let world = World::emit_only();
        let key = world.thread_key(1);
        let subscriber = world.local_subscriber();
        world.add_publisher(&subscriber, key.address(), 1);

        // signed for the publisher's domain instead of the subscriber's
        let mut delivery = HookDelivery::sign(
            payload(1),
            ThreadId(1),
            1,
            0,
            &world.publisher.domain(),
            &key,
        )
        .unwrap();
        delivery.publisher = key.address();
        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap_err();
        assert!(matches!(err, SubscriberError::SignatureMismatch { .. }));
    }

    // =============================================================================
    // ATTESTATION-CHECKED DELIVERY
    // =============================================================================

    #[test]
    fn test_delegated_delivery_within_attestation_window() {
        let world = World::retaining();
        let key = world.thread_key(1);
        let subscriber = world.delegated_subscriber(1, 5);
        world.add_publisher(&subscriber, PUBLISHER, 1);

        let fired = world.fire(&key, 7, 1);
        let delivery = attested_delivery(&fired, 7);

        // attestation window opens one block after firing
        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap_err();
        assert!(err.to_string().contains("Publisher attestation missing"));

        world.ledger.advance_blocks(1);
        world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap();
        assert_eq!(world.relayer_balance(), U256::from(FEE));
    }

    #[test]
    fn test_delegated_delivery_of_unfired_payload() {
        let world = World::retaining();
        let key = world.thread_key(1);
        let subscriber = world.delegated_subscriber(0, 5);
        world.add_publisher(&subscriber, PUBLISHER, 1);
        world.fire(&key, 7, 1);

        let delivery = HookDelivery::unsigned(PUBLISHER, payload(8), ThreadId(1), 1, 0);
        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap_err();
        assert!(matches!(err, SubscriberError::PublisherAttestationMissing { .. }));

        // an attestation on one thread does not cover another
        world.add_publisher(&subscriber, PUBLISHER, 2);
        let other_thread = HookDelivery::unsigned(PUBLISHER, payload(7), ThreadId(2), 1, 0);
        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &other_thread))
            .unwrap_err();
        assert!(matches!(err, SubscriberError::PublisherAttestationMissing { .. }));
    }

    #[test]
    fn test_delegated_attestation_expires() {
        let world = World::retaining();
        let key = world.thread_key(1);
        let subscriber = world.delegated_subscriber(0, 3);
        world.add_publisher(&subscriber, PUBLISHER, 1);
        let fired = world.fire(&key, 7, 1);

        world.ledger.advance_blocks(4);
        let delivery = attested_delivery(&fired, 7);
        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap_err();
        assert!(matches!(err, SubscriberError::PublisherAttestationMissing { .. }));
    }

    #[test]
    fn test_delegated_attestation_paid_once() {
        let world = World::retaining();
        let key = world.thread_key(1);
        let subscriber = world.delegated_subscriber(0, 5);
        world.add_publisher(&subscriber, PUBLISHER, 1);
        let fired = world.fire(&key, 7, 1);
        assert_eq!(fired.sequence, 1);

        // relayers choose the nonce; only the attested one is paid
        let mut paid = 0;
        for nonce in (1..=5).chain([u64::MAX]) {
            let delivery = HookDelivery::unsigned(PUBLISHER, payload(7), ThreadId(1), nonce, 0);
            let result = world
                .ledger
                .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery));
            match result {
                Ok(_) => paid += 1,
                Err(err) => assert!(matches!(
                    err,
                    SubscriberError::AttestationMismatch { .. }
                        | SubscriberError::ObsoleteHookDetected { .. }
                )),
            }
        }
        assert_eq!(paid, 1);
        assert_eq!(world.relayer_balance(), U256::from(FEE));
        assert_eq!(subscriber.publisher_nonce(PUBLISHER, ThreadId(1)), Some(1));

        // the scope still accepts the next firing
        let next = world.fire(&key, 9, 1);
        let delivery = attested_delivery(&next, 9);
        world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap();
        assert_eq!(world.relayer_balance(), U256::from(FEE * 2));
    }

    #[test]
    fn test_delegated_blockheight_is_the_firing_height() {
        let world = World::retaining();
        let key = world.thread_key(1);
        let subscriber = world.delegated_subscriber(0, 2 * VALIDITY);
        world.add_publisher(&subscriber, PUBLISHER, 1);
        let fired = world.fire(&key, 7, 1);

        // past the subscriber's own window, a fresh height must not revive it
        world.ledger.advance_blocks(VALIDITY);
        let mut delivery = attested_delivery(&fired, 7);
        delivery.blockheight = world.ledger.height();
        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap_err();
        assert_eq!(
            err,
            SubscriberError::AttestationMismatch {
                nonce: 1,
                blockheight: VALIDITY,
                sequence: 1,
                fired_at: 0,
            }
        );

        let honest = attested_delivery(&fired, 7);
        let err = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &honest))
            .unwrap_err();
        assert!(matches!(err, SubscriberError::HookEventHasExpired { .. }));
        assert_eq!(world.relayer_balance(), U256::zero());
    }

    // =============================================================================
    // RELAYER DISCOVERY
    // =============================================================================

    #[test]
    fn test_relayer_discovers_and_delivers() {
        let world = World::emit_only();
        let key = world.thread_key(1);
        world
            .ledger
            .transact(key.address(), |ctx| {
                world.registry.register_hook(ctx, PUBLISHER, ThreadId(1))
            })
            .unwrap();
        let subscriber = world.local_subscriber();
        world.add_publisher(&subscriber, key.address(), 1);
        world
            .ledger
            .transact(SUBSCRIBER_OWNER, |ctx| {
                world.registry.register_subscriber(
                    ctx,
                    PUBLISHER,
                    SUBSCRIBER,
                    ThreadId(1),
                    SubscriptionTerms::with_fee(U256::from(FEE)).relayer(RELAYER),
                )
            })
            .unwrap();

        let cursor = world.ledger.events().len() as u64;
        world.fire(&key, 3, 1);

        // relayer: poll new events, find subscribers, deliver
        for emitted in world.ledger.events_since(cursor) {
            let HookEvent::HookFired { thread, .. } = emitted.event else {
                continue;
            };
            let signer = world.registry.publisher_key(PUBLISHER, thread);
            assert_eq!(signer, key.address());
            for (subscriber_id, subscription) in world.registry.subscribers_of(PUBLISHER, thread) {
                assert_eq!(subscriber_id, SUBSCRIBER);
                assert!(subscription.permits_relayer(&RELAYER));
                let delivery =
                    signed_delivery(&subscriber, &key, thread.0, 1, emitted.block_height);
                world
                    .ledger
                    .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
                    .unwrap();
            }
        }
        assert_eq!(world.relayer_balance(), U256::from(FEE));
    }

    #[test]
    fn test_attested_delivery_over_json() {
        let world = World::retaining();
        let key = world.thread_key(1);
        let subscriber = world.delegated_subscriber(0, 5);
        world.add_publisher(&subscriber, PUBLISHER, 1);
        let fired = world.fire(&key, 4, 1);

        // relayers hand deliveries over as JSON
        let wire = serde_json::to_string(&attested_delivery(&fired, 4)).unwrap();
        let delivery: HookDelivery = serde_json::from_str(&wire).unwrap();
        let receipt = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap();

        assert_eq!(receipt.digest, fired.digest);
        let json = serde_json::to_value(receipt).unwrap();
        assert_eq!(json["nonce"], 1);
        assert_eq!(json["accepted_at"], 0);
    }

    // =============================================================================
    // TELEMETRY
    // =============================================================================

    #[test]
    fn test_flow_is_visible_in_metrics() {
        let config = hook_telemetry::TelemetryConfig::for_component("integration");
        let _guard = hook_telemetry::init_telemetry(config).ok();
        hook_telemetry::register_metrics().unwrap();

        let world = World::emit_only();
        let key = world.thread_key(1);
        let subscriber = world.local_subscriber();
        world.add_publisher(&subscriber, key.address(), 1);
        let delivery = signed_delivery(&subscriber, &key, 1, 1, 0);
        world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            .unwrap();
        let _ = world
            .ledger
            .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery));

        let text = hook_telemetry::encode_metrics().unwrap();
        assert!(text.contains("eh_subscriber_deliveries_total"));
        assert!(text.contains("eh_subscriber_relayer_payments_total"));
        assert!(text.contains("eh_signature_recoveries_total"));
    }
}
