use std::marker::PhantomData;

use crate::error::QueueError;
use crate::queue::TicketQueue;

/// How `len`, `waiting` and `visited` are read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Introspection {
    /// Read a lock-free mirror of the counters.
    ///
    /// Never blocks and never contends with producers or consumers, but a
    /// read racing a mutation may observe the value from just before it.
    #[default]
    Approximate,
    /// Take the queue lock for every read.
    Exact,
}

/// Resolved configuration of a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Nodes reserved at construction.
    pub capacity: usize,
    /// Counter read policy.
    pub introspection: Introspection,
    /// Label used in trace events and `Debug` output.
    pub name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            introspection: Introspection::Approximate,
            name: String::from("turnstile"),
        }
    }
}

/// Builder for [`TicketQueue`].
///
/// ```rust
/// use turnstile::{Introspection, TicketQueue};
///
/// let queue = TicketQueue::<u64>::builder()
///     .capacity(256)
///     .introspection(Introspection::Exact)
///     .name("jobs")
///     .build()
///     .unwrap();
/// assert_eq!(queue.name(), "jobs");
/// ```
#[derive(Debug)]
pub struct QueueBuilder<T> {
    config: QueueConfig,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for QueueBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueueBuilder<T> {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: QueueConfig::default(),
            _marker: PhantomData,
        }
    }

    /// Reserves room for `capacity` nodes up front.
    ///
    /// The queue stays unbounded; this only moves allocation to construction.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets how the counters are read.
    pub fn introspection(mut self, introspection: Introspection) -> Self {
        self.config.introspection = introspection;
        self
    }

    /// Sets the label attached to trace events.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Builds the queue.
    ///
    /// # Errors
    /// [`QueueError::AllocFailed`] if the requested nodes cannot be reserved.
    pub fn build(self) -> Result<TicketQueue<T>, QueueError> {
        TicketQueue::with_config(self.config)
    }
}
