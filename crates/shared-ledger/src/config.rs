//! # Ledger Configuration

use shared_types::BlockHeight;

/// Chain id used by local development chains.
pub const DEFAULT_CHAIN_ID: u64 = 1337;

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Chain identifier bound into every signing domain.
    pub chain_id: u64,
    /// Height of the first block.
    pub genesis_height: BlockHeight,
    /// Mine one block after every top-level transaction.
    pub automine: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            genesis_height: 0,
            automine: false,
        }
    }
}

impl LedgerConfig {
    /// Config for a chain with the given id.
    pub fn with_chain_id(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Self::default()
        }
    }
}
