//! # Error Taxonomy
//!
//! Every protocol failure is a synchronous, non-retryable rejection of the
//! current operation. Component error enums map onto these categories so a
//! caller can tell a slow relayer from a forged delivery without matching
//! on every variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a protocol rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Caller identity does not match the recorded controller.
    Authorization,
    /// Attempted creation of an entry that already exists.
    Conflict,
    /// Malformed or unauthorized registration input.
    Validation,
    /// Temporal or ordering claims inconsistent with protocol state.
    Freshness,
    /// The delivery cannot be attributed to the authorized key or publisher.
    Authenticity,
    /// The fee could not be paid.
    Settlement,
}

impl ErrorCategory {
    /// Lowercase label for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Freshness => "freshness",
            Self::Authenticity => "authenticity",
            Self::Settlement => "settlement",
        }
    }

    /// Freshness rejections are routine (slow or duplicate relayers).
    #[must_use]
    pub const fn is_routine(&self) -> bool {
        matches!(self, Self::Freshness)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every component error enum.
pub trait Categorized {
    /// The category this error belongs to.
    fn category(&self) -> ErrorCategory;
}
