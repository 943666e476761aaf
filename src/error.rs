use std::time::Duration;

use thiserror::Error;

use crate::ResourceKind;

/// Why an owner-thread-only operation was refused.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AffinityViolation {
    /// No owner thread has been recorded yet;
    /// see [`Dispatcher::initialize()`](struct.Dispatcher.html#method.initialize).
    Uninitialized,
    /// Called from a thread other than the recorded owner.
    WrongThread,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DispatchError {
    /// The content loader could not resolve the name. This is the failure marker a drain
    /// cycle posts in place of a resource; it never aborts the rest of the batch.
    #[error("{kind} `{name}` could not be loaded: {reason}")]
    NotFound {
        name: String,
        kind: ResourceKind,
        reason: String,
    },
    /// An owner-thread-only operation was attempted where it isn't allowed.
    #[error("`{operation}` violates owner thread affinity: {violation}")]
    ThreadAffinity {
        operation: &'static str,
        violation: AffinityViolation,
    },
    #[error("owner thread is already initialized")]
    AlreadyInitialized,
    #[error("gave up on {kind} `{name}` after waiting {waited:?}")]
    Timeout {
        name: String,
        kind: ResourceKind,
        waited: Duration,
    },
    /// The delivery slot was dropped without a result being posted to it.
    #[error("delivery slot for {kind} `{name}` dropped without a result")]
    Disconnected { name: String, kind: ResourceKind },
}

impl std::fmt::Display for AffinityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AffinityViolation::Uninitialized => f.pad("no owner thread has been initialized"),
            AffinityViolation::WrongThread => f.pad("not called on the owner thread"),
        }
    }
}

impl DispatchError {
    pub(crate) fn not_found(name: &str, kind: ResourceKind, reason: impl ToString) -> Self {
        DispatchError::NotFound {
            name: name.to_owned(),
            kind,
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for the failure marker of an unresolvable name.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DispatchError::NotFound { .. })
    }

    /// Returns `true` if this is a thread affinity violation.
    pub fn is_affinity_violation(&self) -> bool {
        matches!(self, DispatchError::ThreadAffinity { .. })
    }
}
