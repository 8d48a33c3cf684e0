//! # Domain Entities
//!
//! Subscription records held by the Registry.

use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};

/// Terms a subscriber offers for deliveries on one (publisher, thread).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubscriptionTerms {
    /// Fee paid to the relayer per accepted delivery. Must be positive.
    pub fee: U256,
    /// Gas ceiling a relayer may spend on one delivery.
    pub max_gas: u64,
    /// Gas price ceiling a relayer may bid.
    pub max_gas_price: U256,
    /// Only this relayer should deliver, if set.
    pub permitted_relayer: Option<Address>,
}

impl SubscriptionTerms {
    /// Terms with the given fee and no gas bounds or relayer constraint.
    pub fn with_fee(fee: U256) -> Self {
        Self {
            fee,
            ..Self::default()
        }
    }

    /// Sets gas bounds.
    #[must_use]
    pub fn gas_bounds(mut self, max_gas: u64, max_gas_price: U256) -> Self {
        self.max_gas = max_gas;
        self.max_gas_price = max_gas_price;
        self
    }

    /// Restricts delivery to one relayer.
    #[must_use]
    pub fn relayer(mut self, relayer: Address) -> Self {
        self.permitted_relayer = Some(relayer);
        self
    }
}

/// A recorded subscription.
///
/// The owner is fixed when the subscription is created and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Current terms
    pub terms: SubscriptionTerms,
    /// Account that registered the subscription
    pub owner: Address,
}

impl Subscription {
    /// Fee per accepted delivery.
    pub fn fee(&self) -> U256 {
        self.terms.fee
    }

    /// Whether `relayer` is allowed to deliver for this subscription.
    pub fn permits_relayer(&self, relayer: &Address) -> bool {
        self.terms
            .permitted_relayer
            .is_none_or(|permitted| permitted == *relayer)
    }
}
