//! # Domain Errors
//!
//! Error types for the Registry.

use shared_types::{Address, Categorized, ErrorCategory, ThreadId};
use thiserror::Error;

/// Registry error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// (publisher, thread) already has a recorded key.
    #[error("Hook already registered: publisher {publisher:?}, thread {thread}")]
    HookAlreadyRegistered {
        /// Publisher address
        publisher: Address,
        /// Thread
        thread: ThreadId,
    },

    /// The publisher does not recognise the caller as the thread's key.
    #[error("Hook not valid: {caller:?} is not the key of thread {thread} on {publisher:?}")]
    HookNotValid {
        /// Publisher address
        publisher: Address,
        /// Thread
        thread: ThreadId,
        /// Transaction sender
        caller: Address,
    },

    /// Subscription fee was zero.
    #[error("Fee must be greater than 0")]
    FeeMustBePositive,

    /// (subscriber, publisher, thread) already has a subscription.
    #[error("Subscriber already registered: {subscriber:?} on thread {thread} of {publisher:?}")]
    SubscriberAlreadyRegistered {
        /// Subscriber address
        subscriber: Address,
        /// Publisher address
        publisher: Address,
        /// Thread
        thread: ThreadId,
    },

    /// The subscriber id is owned by a different account.
    #[error("Subscriber {subscriber:?} is owned by {owner:?}")]
    SubscriberOwnedByAnother {
        /// Subscriber address
        subscriber: Address,
        /// Recorded owner
        owner: Address,
    },

    /// Caller is not the thread's recorded key.
    #[error("Not authorized to update hook: {caller:?}")]
    NotAuthorizedToUpdateHook {
        /// Transaction sender
        caller: Address,
    },

    /// Caller is not the subscription's owner.
    #[error("Not authorized to update subscriber: {caller:?}")]
    NotAuthorizedToUpdateSubscriber {
        /// Transaction sender
        caller: Address,
    },
}

impl Categorized for RegistryError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::HookAlreadyRegistered { .. } | Self::SubscriberAlreadyRegistered { .. } => {
                ErrorCategory::Conflict
            }
            Self::HookNotValid { .. } | Self::FeeMustBePositive => ErrorCategory::Validation,
            Self::SubscriberOwnedByAnother { .. }
            | Self::NotAuthorizedToUpdateHook { .. }
            | Self::NotAuthorizedToUpdateSubscriber { .. } => ErrorCategory::Authorization,
        }
    }
}
