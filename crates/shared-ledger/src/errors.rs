//! # Ledger Errors

use shared_types::{Address, BlockHeight, Categorized, ErrorCategory, U256};
use thiserror::Error;

/// Ledger operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Debit exceeds the account balance. Nothing was transferred.
    #[error("Insufficient balance for {account:?}: required {required}, available {available}")]
    InsufficientBalance {
        /// Debited account
        account: Address,
        /// Amount requested
        required: U256,
        /// Balance at the time of the request
        available: U256,
    },

    /// Credit would overflow a 256-bit balance.
    #[error("Balance overflow for {account:?}")]
    BalanceOverflow {
        /// Credited account
        account: Address,
    },

    /// Block height may only move forward.
    #[error("Height regression: current {current}, requested {requested}")]
    HeightRegression {
        /// Current height
        current: BlockHeight,
        /// Requested height
        requested: BlockHeight,
    },
}

impl Categorized for LedgerError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::InsufficientBalance { .. } | Self::BalanceOverflow { .. } => {
                ErrorCategory::Settlement
            }
            Self::HeightRegression { .. } => ErrorCategory::Validation,
        }
    }
}
