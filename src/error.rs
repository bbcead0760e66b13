use std::fmt;

use thiserror::Error;

/// Errors reported by queue construction and retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue was destroyed before or while the operation ran.
    #[error("queue has been destroyed")]
    Destroyed,
    /// Node storage could not be reserved; the queue is unchanged.
    #[error("failed to allocate storage for {requested} queue node(s)")]
    AllocFailed {
        /// Number of nodes the queue tried to reserve.
        requested: usize,
    },
}

/// Reasons a non-blocking retrieval declined to hand out an item.
///
/// The caller's ticket has always been returned by the time this is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryDequeueError {
    /// No item is queued.
    #[error("queue is empty")]
    Empty,
    /// Items are queued but owed to consumers that asked earlier.
    #[error("earlier tickets are still waiting to be served")]
    Busy,
    /// The queue has been destroyed.
    #[error("queue has been destroyed")]
    Destroyed,
}

/// An enqueue that did not happen. Carries the payload back to the caller.
#[derive(PartialEq, Eq)]
pub struct EnqueueError<T> {
    item: T,
    kind: QueueError,
}

impl<T> EnqueueError<T> {
    pub(crate) fn new(item: T, kind: QueueError) -> Self {
        Self { item, kind }
    }

    /// Why the enqueue failed.
    pub fn kind(&self) -> QueueError {
        self.kind
    }

    /// Takes the rejected payload back.
    pub fn into_inner(self) -> T {
        self.item
    }
}

impl<T> fmt::Debug for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnqueueError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enqueue rejected: {}", self.kind)
    }
}

impl<T> std::error::Error for EnqueueError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<T> From<EnqueueError<T>> for QueueError {
    fn from(err: EnqueueError<T>) -> Self {
        err.kind
    }
}
