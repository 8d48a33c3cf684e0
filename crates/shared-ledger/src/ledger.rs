//! # In-Process Ledger
//!
//! Supplies the four guarantees protocol components rely on:
//!
//! | Guarantee | Mechanism |
//! |-----------|-----------|
//! | Serially ordered transactions | `transact` holds a re-entrant transaction lock |
//! | Monotonic block height | `advance_blocks` / `set_height`, never backwards |
//! | Unconditional balance transfer | `transfer` checks and moves under one write lock |
//! | Observable events | append-only log with per-emitter queries |
//!
//! The transaction lock is re-entrant so that code invoked from inside a
//! transaction (an application handler, say) can call back into a component
//! without deadlocking. Components must therefore finish every check and
//! mutation before invoking external code.

use crate::config::LedgerConfig;
use crate::context::CallContext;
use crate::errors::LedgerError;
use parking_lot::{ReentrantMutex, RwLock};
use shared_types::{Address, BlockHeight, EmittedEvent, HookEvent, U256};
use std::cell::Cell;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Transaction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// Top-level transactions that returned `Ok`.
    pub committed: u64,
    /// Top-level transactions that returned `Err`.
    pub reverted: u64,
}

/// The ledger execution environment.
pub struct Ledger {
    config: LedgerConfig,
    /// Held for the duration of a transaction; the cell tracks nesting depth.
    tx_lock: ReentrantMutex<Cell<u32>>,
    height: RwLock<BlockHeight>,
    balances: RwLock<HashMap<Address, U256>>,
    events: RwLock<Vec<EmittedEvent>>,
    stats: RwLock<LedgerStats>,
}

impl Ledger {
    /// Creates a ledger at its genesis height with no balances.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            height: RwLock::new(config.genesis_height),
            config,
            tx_lock: ReentrantMutex::new(Cell::new(0)),
            balances: RwLock::new(HashMap::new()),
            events: RwLock::new(Vec::new()),
            stats: RwLock::new(LedgerStats::default()),
        }
    }

    /// Ledger configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Chain identifier.
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Current block height.
    pub fn height(&self) -> BlockHeight {
        *self.height.read()
    }

    /// Mines `blocks` empty blocks. Waits for any running transaction.
    pub fn advance_blocks(&self, blocks: u64) -> BlockHeight {
        let _tx = self.tx_lock.lock();
        let mut height = self.height.write();
        *height = height.saturating_add(blocks);
        trace!(height = *height, "advanced blocks");
        *height
    }

    /// Jumps to `height`. Fails if that would move the chain backwards.
    pub fn set_height(&self, height: BlockHeight) -> Result<(), LedgerError> {
        let _tx = self.tx_lock.lock();
        let mut current = self.height.write();
        if height < *current {
            return Err(LedgerError::HeightRegression {
                current: *current,
                requested: height,
            });
        }
        *current = height;
        Ok(())
    }

    // =========================================================================
    // BALANCES
    // =========================================================================

    /// Balance of `account`; zero if it has never been credited.
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances
            .read()
            .get(account)
            .copied()
            .unwrap_or_else(U256::zero)
    }

    /// Credits `amount` to `account` from outside the system.
    pub fn deposit(&self, account: Address, amount: U256) -> Result<U256, LedgerError> {
        let mut balances = self.balances.write();
        let balance = balances.entry(account).or_insert_with(U256::zero);
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { account })?;
        debug!(account = ?account, amount = %amount, "deposit");
        Ok(*balance)
    }

    /// Moves `amount` from `from` to `to`, or nothing at all.
    pub fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        let mut balances = self.balances.write();
        let available = balances.get(&from).copied().unwrap_or_else(U256::zero);
        let debited = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: from,
                required: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let received = balances.get(&to).copied().unwrap_or_else(U256::zero);
        let credited = received
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow { account: to })?;
        balances.insert(from, debited);
        balances.insert(to, credited);
        debug!(from = ?from, to = ?to, amount = %amount, "transfer");
        Ok(())
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Appends an event to the log at the current height.
    pub fn emit(&self, emitter: Address, event: HookEvent) {
        let block_height = self.height();
        let mut events = self.events.write();
        let sequence = events.len() as u64;
        trace!(emitter = ?emitter, event = event.name(), sequence, "event emitted");
        events.push(EmittedEvent {
            sequence,
            emitter,
            block_height,
            event,
        });
    }

    /// Every event in emission order.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.read().clone()
    }

    /// Events emitted by `emitter`.
    pub fn events_from(&self, emitter: &Address) -> Vec<EmittedEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.emitter == *emitter)
            .cloned()
            .collect()
    }

    /// Events with `sequence >= from`, for incremental polling.
    pub fn events_since(&self, from: u64) -> Vec<EmittedEvent> {
        let events = self.events.read();
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(events.len());
        events[start..].to_vec()
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Executes `op` as one serialized transaction submitted by `sender`.
    ///
    /// Transactions on other threads wait until this one returns. A call
    /// from inside `op` on the same thread nests instead of deadlocking and
    /// sees `depth > 0`. Operations are responsible for their own
    /// all-or-nothing behaviour: they must validate before they mutate.
    pub fn transact<T, E, F>(&self, sender: Address, op: F) -> Result<T, E>
    where
        F: FnOnce(&CallContext) -> Result<T, E>,
    {
        let guard = self.tx_lock.lock();
        let depth = guard.get();
        guard.set(depth + 1);

        let ctx = CallContext {
            sender,
            block_height: self.height(),
            chain_id: self.config.chain_id,
            depth,
        };
        let result = op(&ctx);

        guard.set(depth);
        if depth == 0 {
            let mut stats = self.stats.write();
            if result.is_ok() {
                stats.committed += 1;
            } else {
                stats.reverted += 1;
            }
            drop(stats);
            if self.config.automine {
                let mut height = self.height.write();
                *height = height.saturating_add(1);
            }
        }
        result
    }

    /// Transaction counters.
    pub fn stats(&self) -> LedgerStats {
        *self.stats.read()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
