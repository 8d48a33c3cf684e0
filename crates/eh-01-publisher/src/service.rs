//! # Publisher Service
//!
//! Holds the per-thread authorized key table and fires hooks signed by
//! those keys.
//!
//! ## Firing Pipeline
//!
//! ```text
//! payload + digest + thread + sequence + signature
//!   -> digest == keccak(payload)                      DigestMismatch
//!   -> recover signer over FireHook(..)               MalformedSignature
//!   -> signer == authorizedKey[thread]                UnauthorizedSigner
//!   -> sequence > last fired on thread                StaleSequence
//!   -> (Retain) no attestation for (digest, thread)   DuplicateAttestation
//!   -> record sequence and attestation, emit HookFired
//! ```
//!
//! Every check completes before any state is written, so a rejected call
//! leaves no attestation and no event behind. A signature carries its
//! sequence, so it fires at most once under either policy.

use crate::domain::{
    invariant_digest_matches, invariant_owner, invariant_sequence_fresh, invariant_within_window,
    Attestation, AttestationKey, AttestationPolicy, FireHookRequest, FiredHook, PublisherError,
};
use crate::ports::inbound::PublisherApi;
use hook_telemetry::{HOOKS_FIRED, HOOK_FIRE_REJECTIONS, SIGNATURE_RECOVERIES};
use parking_lot::RwLock;
use shared_crypto::{recover_address, DomainConfig, Eip712Domain, TypedMessage};
use shared_ledger::{CallContext, Ledger};
use shared_types::{Address, Categorized, Hash, HookEvent, ThreadId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Publisher configuration.
#[derive(Debug, Clone, Default)]
pub struct PublisherConfig {
    /// Signing domain (bound to the ledger chain id and this publisher).
    pub domain: DomainConfig,
    /// Whether fired hooks are retained as attestations.
    pub attestation_policy: AttestationPolicy,
}

impl PublisherConfig {
    /// Config that retains attestations.
    pub fn retaining() -> Self {
        Self {
            attestation_policy: AttestationPolicy::Retain,
            ..Self::default()
        }
    }
}

/// Publisher statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublisherStats {
    /// Hooks fired.
    pub hooks_fired: u64,
    /// Fire attempts rejected.
    pub rejected: u64,
}

#[derive(Default)]
struct PublisherState {
    /// thread -> authorized key
    hooks: HashMap<ThreadId, Address>,
    /// thread -> last fired sequence
    sequences: HashMap<ThreadId, u64>,
    /// (digest, thread) -> attestation, append-only
    attestations: HashMap<AttestationKey, Attestation>,
    stats: PublisherStats,
}

/// A publisher.
pub struct Publisher {
    address: Address,
    owner: Address,
    config: PublisherConfig,
    ledger: Arc<Ledger>,
    state: RwLock<PublisherState>,
}

impl Publisher {
    /// Creates a publisher at `address` controlled by `owner`.
    pub fn new(
        address: Address,
        owner: Address,
        config: PublisherConfig,
        ledger: Arc<Ledger>,
    ) -> Self {
        info!(
            publisher = ?address,
            owner = ?owner,
            policy = config.attestation_policy.as_str(),
            "[eh-01] publisher created"
        );
        Self {
            address,
            owner,
            config,
            ledger,
            state: RwLock::new(PublisherState::default()),
        }
    }

    /// Owner address.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Attestation policy.
    pub fn policy(&self) -> AttestationPolicy {
        self.config.attestation_policy
    }

    /// The domain thread keys sign `FireHook` messages in.
    pub fn domain(&self) -> Eip712Domain {
        self.config.domain.bind(self.ledger.chain_id(), self.address)
    }

    /// Authorized key of `thread`; zero if none.
    pub fn hook_key(&self, thread: ThreadId) -> Address {
        self.state
            .read()
            .hooks
            .get(&thread)
            .copied()
            .unwrap_or(Address::ZERO)
    }

    /// Last sequence fired on `thread`; zero before the first firing.
    pub fn last_sequence(&self, thread: ThreadId) -> u64 {
        self.state
            .read()
            .sequences
            .get(&thread)
            .copied()
            .unwrap_or_default()
    }

    /// Sequence the next firing on `thread` should sign.
    pub fn next_sequence(&self, thread: ThreadId) -> u64 {
        self.last_sequence(thread).saturating_add(1)
    }

    /// Current statistics.
    pub fn stats(&self) -> PublisherStats {
        self.state.read().stats
    }

    fn reject(&self, err: PublisherError) -> PublisherError {
        self.state.write().stats.rejected += 1;
        HOOK_FIRE_REJECTIONS
            .with_label_values(&[err.category().as_str()])
            .inc();
        warn!(publisher = ?self.address, error = %err, "[eh-01] fireHook rejected");
        err
    }

    fn recover_signer(&self, request: &FireHookRequest) -> Result<Address, PublisherError> {
        let digest = request.message().signing_digest(&self.domain())?;
        recover_address(&digest, &request.signature).map_err(|e| {
            SIGNATURE_RECOVERIES.with_label_values(&["malformed"]).inc();
            PublisherError::MalformedSignature(e)
        })
    }

    fn try_fire(
        &self,
        ctx: &CallContext,
        request: &FireHookRequest,
    ) -> Result<FiredHook, PublisherError> {
        invariant_digest_matches(&request.payload, &request.digest)?;
        let signer = self.recover_signer(request)?;

        let mut state = self.state.write();
        if state.hooks.get(&request.thread) != Some(&signer) {
            SIGNATURE_RECOVERIES.with_label_values(&["mismatch"]).inc();
            return Err(PublisherError::UnauthorizedSigner {
                thread: request.thread,
                recovered: signer,
            });
        }
        SIGNATURE_RECOVERIES.with_label_values(&["match"]).inc();
        let last = state.sequences.get(&request.thread).copied().unwrap_or_default();
        invariant_sequence_fresh(request.thread, request.sequence, last)?;

        let retained = self.config.attestation_policy == AttestationPolicy::Retain;
        if retained {
            let attestation = Attestation {
                digest: request.digest,
                thread: request.thread,
                sequence: request.sequence,
                fired_at: ctx.block_height,
                signer,
            };
            if state.attestations.contains_key(&attestation.key()) {
                return Err(PublisherError::DuplicateAttestation {
                    digest: request.digest,
                    thread: request.thread,
                });
            }
            state.attestations.insert(attestation.key(), attestation);
        }
        state.sequences.insert(request.thread, request.sequence);
        state.stats.hooks_fired += 1;
        drop(state);

        self.ledger.emit(
            self.address,
            HookEvent::HookFired {
                digest: request.digest,
                thread: request.thread,
            },
        );
        HOOKS_FIRED
            .with_label_values(&[self.config.attestation_policy.as_str()])
            .inc();

        Ok(FiredHook {
            digest: request.digest,
            thread: request.thread,
            sequence: request.sequence,
            fired_at: ctx.block_height,
            signer,
            retained,
        })
    }
}

impl PublisherApi for Publisher {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self, ctx), fields(publisher = ?self.address, caller = ?ctx.sender))]
    fn add_hook(
        &self,
        ctx: &CallContext,
        thread: ThreadId,
        key: Address,
    ) -> Result<(), PublisherError> {
        invariant_owner(&self.owner, &ctx.sender)?;
        let previous = self.state.write().hooks.insert(thread, key);
        info!(
            thread = %thread,
            key = ?key,
            rotated = previous.is_some(),
            "[eh-01] hook key set"
        );
        Ok(())
    }

    fn verify_hook_registration(&self, thread: ThreadId, key: Address) -> bool {
        self.state.read().hooks.get(&thread) == Some(&key)
    }

    #[instrument(
        skip(self, ctx, request),
        fields(publisher = ?self.address, thread = %request.thread)
    )]
    fn fire_hook(
        &self,
        ctx: &CallContext,
        request: &FireHookRequest,
    ) -> Result<FiredHook, PublisherError> {
        match self.try_fire(ctx, request) {
            Ok(fired) => {
                info!(
                    digest = ?fired.digest,
                    sequence = fired.sequence,
                    fired_at = fired.fired_at,
                    retained = fired.retained,
                    "[eh-01] hook fired"
                );
                Ok(fired)
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    fn verify_event_hook(
        &self,
        digest: Hash,
        thread: ThreadId,
        from_offset: u64,
        to_offset: u64,
    ) -> bool {
        let Some(attestation) = self.attestation(digest, thread) else {
            debug!(digest = ?digest, thread = %thread, "[eh-01] no attestation");
            return false;
        };
        invariant_within_window(attestation.fired_at, from_offset, to_offset, self.ledger.height())
    }

    fn attestation(&self, digest: Hash, thread: ThreadId) -> Option<Attestation> {
        self.state
            .read()
            .attestations
            .get(&AttestationKey { digest, thread })
            .copied()
    }
}
