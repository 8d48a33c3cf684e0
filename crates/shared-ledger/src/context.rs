//! # Call Context
//!
//! What an operation can see about the transaction executing it.

use shared_types::{Address, BlockHeight};

/// Execution context handed to every state-changing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Account that submitted the transaction (receives relayer fees).
    pub sender: Address,
    /// Height at which the transaction executes.
    pub block_height: BlockHeight,
    /// Chain identifier.
    pub chain_id: u64,
    /// Nesting depth; 0 for a top-level transaction.
    pub depth: u32,
}

impl CallContext {
    /// True for a call made from inside another transaction.
    pub fn is_nested(&self) -> bool {
        self.depth > 0
    }
}
