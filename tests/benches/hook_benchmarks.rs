//! # EventHook Benchmarks
//!
//! | Path | Work per iteration |
//! |------|--------------------|
//! | typed-data digest | two struct hashes, one domain separator |
//! | signer recovery | one secp256k1 public key recovery |
//! | fire_hook | digest check, recovery, sequence check, attestation insert |
//! | verify_hook | window, nonce, recovery, fee transfer |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use eh_01_publisher::{FireHookRequest, PublisherApi};
use eh_03_subscriber::{HookDelivery, HookMessage, SubscriberApi};
use eh_tests::fixtures::{payload, signed_delivery, World, RELAYER};
use shared_crypto::{payload_digest, recover_address, DomainConfig, Secp256k1KeyPair, TypedMessage};
use shared_types::{Address, Hash, ThreadId};
use std::time::Duration;

fn bench_typed_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("eh-crypto/typed_data");
    let domain = DomainConfig::default().bind(1337, Address::new([0x5B; 20]));

    for words in [1usize, 8, 64] {
        let payload: Vec<Hash> = (0..words).map(|i| Hash([i as u8; 32])).collect();
        group.throughput(Throughput::Elements(words as u64));
        group.bench_with_input(BenchmarkId::new("hook_digest", words), &payload, |b, payload| {
            b.iter(|| {
                let message = HookMessage {
                    payload: payload_digest(payload),
                    nonce: 7,
                    blockheight: 100,
                    thread: ThreadId(1),
                };
                black_box(message.signing_digest(&domain))
            })
        });
    }
    group.finish();
}

fn bench_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("eh-crypto/recovery");
    group.measurement_time(Duration::from_secs(5));
    let key = Secp256k1KeyPair::generate();
    let digest = Hash([0x42; 32]);
    let signature = key.sign_digest(&digest).expect("signing");

    group.bench_function("sign", |b| b.iter(|| black_box(key.sign_digest(&digest))));
    group.bench_function("recover", |b| {
        b.iter(|| black_box(recover_address(&digest, &signature)))
    });
    group.finish();
}

fn bench_fire_hook(c: &mut Criterion) {
    let mut group = c.benchmark_group("eh-01/fire_hook");
    let world = World::retaining();
    let key = world.thread_key(1);
    let mut tag = 0u64;

    group.bench_function("retain", |b| {
        b.iter_batched(
            || {
                tag += 1;
                let payload = vec![Hash([0u8; 32]), Hash(pad(tag))];
                let domain = world.publisher.domain();
                FireHookRequest::sign(payload, ThreadId(1), tag, &domain, &key).expect("signing")
            },
            |request| {
                world
                    .ledger
                    .transact(RELAYER, |ctx| world.publisher.fire_hook(ctx, &request))
            },
            criterion::BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_verify_hook(c: &mut Criterion) {
    let mut group = c.benchmark_group("eh-03/verify_hook");
    let world = World::emit_only();
    let key = world.thread_key(1);
    let subscriber = world.local_subscriber();
    world.add_publisher(&subscriber, key.address(), 1);
    // keep the subscriber funded for the whole run
    world
        .ledger
        .deposit(subscriber.address(), shared_types::U256::MAX / 2)
        .expect("deposit");
    let mut nonce = 0u64;

    group.bench_function("accepted", |b| {
        b.iter_batched(
            || {
                nonce += 1;
                signed_delivery(&subscriber, &key, 1, nonce, 0)
            },
            |delivery| {
                world
                    .ledger
                    .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, &delivery))
            },
            criterion::BatchSize::SmallInput,
        )
    });

    let stale = signed_delivery(&subscriber, &key, 1, 1, 0);
    group.bench_function("obsolete", |b| {
        b.iter(|| {
            world
                .ledger
                .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, black_box(&stale)))
        })
    });

    let unsigned = HookDelivery::unsigned(key.address(), payload(1), ThreadId(1), u64::MAX, 0);
    group.bench_function("missing_signature", |b| {
        b.iter(|| {
            world
                .ledger
                .transact(RELAYER, |ctx| subscriber.verify_hook(ctx, black_box(&unsigned)))
        })
    });
    group.finish();
}

fn pad(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

criterion_group!(
    benches,
    bench_typed_data,
    bench_recovery,
    bench_fire_hook,
    bench_verify_hook
);
criterion_main!(benches);
