use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};
use portable_atomic::AtomicU64;

use crate::chain::Chain;
use crate::config::{Introspection, QueueBuilder, QueueConfig};
use crate::error::{EnqueueError, QueueError, TryDequeueError};
use crate::ticket::{Dispenser, Ticket};
use crate::trace::{debug, trace, warn};
use crate::utils::CacheAligned;

/// Everything guarded by the queue lock.
struct State<T> {
    chain: Chain<T>,
    tickets: Dispenser,
    /// Threads inside the wait loop.
    waiting: usize,
    /// Successful retrievals over the queue's lifetime.
    visited: u64,
    destroyed: bool,
}

impl<T> State<T> {
    fn new(chain: Chain<T>) -> Self {
        Self {
            chain,
            tickets: Dispenser::new(),
            waiting: 0,
            visited: 0,
            destroyed: false,
        }
    }

    /// Takes the head item for `ticket` if it is being served and an item exists.
    fn take(&mut self, ticket: Ticket) -> Option<T> {
        if !self.tickets.is_serving(ticket) {
            return None;
        }
        let item = self.chain.pop_front()?;
        self.tickets.advance(ticket);
        self.visited += 1;
        Some(item)
    }
}

/// Lock-free copy of the observable counters, refreshed under the lock.
#[derive(Default)]
struct Counters {
    len: AtomicUsize,
    waiting: AtomicUsize,
    visited: AtomicU64,
}

/// Point-in-time view of a queue, taken under its lock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Items currently queued.
    pub len: usize,
    /// Threads blocked in [`TicketQueue::dequeue`].
    pub waiting: usize,
    /// Successful retrievals so far.
    pub visited: u64,
    /// Ticket currently eligible to retrieve.
    pub serving_ticket: u64,
    /// Ticket the next retrieval attempt will draw.
    pub next_ticket: u64,
}

impl QueueStats {
    /// Tickets drawn by retrievers that have not been served yet.
    pub fn outstanding_tickets(&self) -> u64 {
        self.next_ticket - self.serving_ticket
    }
}

/// An unbounded FIFO queue that serves consumers strictly in arrival order.
///
/// Every retrieval attempt draws a ticket under the queue lock. Only the
/// ticket currently being served may take the head item, so a consumer that
/// asked first is served first no matter how the scheduler orders wake-ups.
/// Failed non-blocking attempts return their ticket before releasing the lock.
///
/// Share it between threads with an `Arc`.
pub struct TicketQueue<T> {
    state: Mutex<State<T>>,
    /// Signalled when an item arrives or a ticket is served.
    ready: Condvar,
    counters: CacheAligned<Counters>,
    config: QueueConfig,
}

impl<T> Default for TicketQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TicketQueue<T> {
    /// Creates an empty queue. Allocates nothing until the first enqueue.
    pub fn new() -> Self {
        Self::from_parts(Chain::new(), QueueConfig::default())
    }

    /// Creates an empty queue with room for `capacity` items.
    ///
    /// # Errors
    /// [`QueueError::AllocFailed`] if the node storage cannot be reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self, QueueError> {
        Self::with_config(QueueConfig {
            capacity,
            ..QueueConfig::default()
        })
    }

    /// Returns a builder for a configured queue.
    pub fn builder() -> QueueBuilder<T> {
        QueueBuilder::new()
    }

    pub(crate) fn with_config(config: QueueConfig) -> Result<Self, QueueError> {
        let chain = Chain::try_with_capacity(config.capacity).map_err(|_| {
            warn!(
                queue = %config.name,
                requested = config.capacity,
                "failed to reserve queue nodes"
            );
            QueueError::AllocFailed {
                requested: config.capacity,
            }
        })?;
        Ok(Self::from_parts(chain, config))
    }

    fn from_parts(chain: Chain<T>, config: QueueConfig) -> Self {
        debug!(
            queue = %config.name,
            capacity = chain.capacity(),
            introspection = ?config.introspection,
            "queue constructed"
        );
        Self {
            state: Mutex::new(State::new(chain)),
            ready: Condvar::new(),
            counters: CacheAligned::new(Counters::default()),
            config,
        }
    }

    /// Appends `item` at the tail and wakes a blocked consumer.
    ///
    /// Never blocks on capacity: the queue is unbounded.
    ///
    /// # Errors
    /// Hands `item` back inside the error if the queue has been destroyed
    /// ([`QueueError::Destroyed`]) or a node could not be allocated
    /// ([`QueueError::AllocFailed`]). The queue is unchanged in both cases.
    pub fn enqueue(&self, item: T) -> Result<(), EnqueueError<T>> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(EnqueueError::new(item, QueueError::Destroyed));
        }

        if let Err(item) = state.chain.push_back(item) {
            warn!(queue = %self.config.name, len = state.chain.len(), "node allocation failed");
            return Err(EnqueueError::new(item, QueueError::AllocFailed { requested: 1 }));
        }
        self.publish(&state);

        // A lone waiter is the only thread a wake-up can reach. With more
        // than one parked, a single wake may land on a ticket that is not
        // being served and strand the one that is.
        if state.waiting > 1 {
            self.ready.notify_all();
        } else {
            self.ready.notify_one();
        }
        Ok(())
    }

    /// Removes the head item, waiting until the queue is non-empty and every
    /// consumer that asked earlier has been served.
    ///
    /// # Errors
    /// [`QueueError::Destroyed`] if the queue is destroyed before or while
    /// the caller waits.
    pub fn dequeue(&self) -> Result<T, QueueError> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(QueueError::Destroyed);
        }

        let ticket = state.tickets.draw();
        trace!(queue = %self.config.name, ticket = ticket.number(), "ticket drawn");

        loop {
            if let Some(item) = state.take(ticket) {
                trace!(queue = %self.config.name, ticket = ticket.number(), "ticket served");
                self.publish(&state);
                self.ready.notify_all();
                return Ok(item);
            }

            state.waiting += 1;
            self.publish(&state);
            trace!(
                queue = %self.config.name,
                ticket = ticket.number(),
                serving = state.tickets.serving(),
                "waiting for turn"
            );
            self.ready.wait(&mut state);
            state.waiting -= 1;
            self.publish(&state);

            if state.destroyed {
                return Err(QueueError::Destroyed);
            }
        }
    }

    /// Removes the head item if it is available to the caller right now.
    ///
    /// Never blocks. On failure the caller's ticket is returned, so declined
    /// attempts never hold up blocked consumers.
    ///
    /// # Errors
    /// - [`TryDequeueError::Empty`] if nothing is queued.
    /// - [`TryDequeueError::Busy`] if items are queued but owed to earlier callers.
    /// - [`TryDequeueError::Destroyed`] if the queue has been destroyed.
    pub fn try_dequeue(&self) -> Result<T, TryDequeueError> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(TryDequeueError::Destroyed);
        }

        let ticket = state.tickets.draw();
        if let Some(item) = state.take(ticket) {
            self.publish(&state);
            self.ready.notify_all();
            return Ok(item);
        }

        state.tickets.rollback(ticket);
        trace!(queue = %self.config.name, ticket = ticket.number(), "ticket rolled back");

        if state.chain.is_empty() {
            Err(TryDequeueError::Empty)
        } else {
            Err(TryDequeueError::Busy)
        }
    }

    /// Tears the queue down and hands every undelivered item back, oldest first.
    ///
    /// Releases all node storage and wakes blocked consumers, which return
    /// [`QueueError::Destroyed`]. Afterwards every operation behaves as on a
    /// queue that was never built. Calling it again returns an empty vector.
    pub fn destroy(&self) -> Vec<T> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Vec::new();
        }

        state.destroyed = true;
        let items = state.chain.drain();
        debug!(
            queue = %self.config.name,
            undelivered = items.len(),
            waiting = state.waiting,
            "queue destroyed"
        );
        self.publish(&state);
        self.ready.notify_all();
        items
    }

    /// Returns `true` once [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    /// Number of queued items. Zero once destroyed.
    pub fn len(&self) -> usize {
        match self.config.introspection {
            Introspection::Approximate => self.counters.len.load(Ordering::Relaxed),
            Introspection::Exact => self.stats().len,
        }
    }

    /// Returns `true` if no items are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of threads blocked in [`dequeue`](Self::dequeue). Zero once destroyed.
    pub fn waiting(&self) -> usize {
        match self.config.introspection {
            Introspection::Approximate => self.counters.waiting.load(Ordering::Relaxed),
            Introspection::Exact => self.stats().waiting,
        }
    }

    /// Number of successful retrievals so far. Zero once destroyed.
    pub fn visited(&self) -> u64 {
        match self.config.introspection {
            Introspection::Approximate => self.counters.visited.load(Ordering::Relaxed),
            Introspection::Exact => self.stats().visited,
        }
    }

    /// Consistent snapshot of all counters, taken under the lock regardless
    /// of the introspection policy.
    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        if state.destroyed {
            return QueueStats::default();
        }
        QueueStats {
            len: state.chain.len(),
            waiting: state.waiting,
            visited: state.visited,
            serving_ticket: state.tickets.serving(),
            next_ticket: state.tickets.next(),
        }
    }

    /// The configuration this queue was built with.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// The queue's label.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Refreshes the lock-free counter mirror. Must be called with the lock held.
    fn publish(&self, state: &State<T>) {
        let (len, waiting, visited) = if state.destroyed {
            (0, 0, 0)
        } else {
            (state.chain.len(), state.waiting, state.visited)
        };
        self.counters.len.store(len, Ordering::Relaxed);
        self.counters.waiting.store(waiting, Ordering::Relaxed);
        self.counters.visited.store(visited, Ordering::Relaxed);
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        let state = self.state.lock();
        state.chain.check_invariants();
        assert!(state.tickets.serving() <= state.tickets.next());
        assert_eq!(state.tickets.serving(), state.visited);
        assert!(state.tickets.outstanding() as usize >= state.waiting);
    }
}

impl<T> fmt::Debug for TicketQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketQueue")
            .field("name", &self.config.name)
            .field("len", &self.counters.len.load(Ordering::Relaxed))
            .field("waiting", &self.counters.waiting.load(Ordering::Relaxed))
            .field("visited", &self.counters.visited.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
