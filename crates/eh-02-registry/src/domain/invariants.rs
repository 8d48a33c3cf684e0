//! # Domain Invariants
//!
//! Business rules for the Registry.

use super::errors::RegistryError;
use shared_types::U256;

/// Invariant: subscription fees are strictly positive.
pub fn invariant_fee_positive(fee: &U256) -> Result<(), RegistryError> {
    if fee.is_zero() {
        return Err(RegistryError::FeeMustBePositive);
    }
    Ok(())
}
