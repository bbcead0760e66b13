//! Ticket-fair FIFO hand-off queue.
//!
//! `turnstile` provides [`TicketQueue`], an unbounded multi-producer
//! multi-consumer queue whose consumers are served in the exact order they
//! asked for an item, not merely in the order items arrived.
//!
//! # How it works
//!
//! - **Backing store**: a singly linked chain of nodes with O(1) push-at-tail
//!   and pop-at-head. Nodes live in an arena and are recycled through a free
//!   list.
//! - **Tickets**: every retrieval attempt draws a number from a counter under
//!   the queue lock. A second counter names the ticket currently allowed to
//!   take the head item.
//! - **Waiting**: blocked consumers sleep on a condition variable and re-check
//!   "non-empty and my turn" on every wake-up, so spurious and broadcast
//!   wake-ups never let anyone jump the line. A served consumer wakes all the
//!   others so the next ticket can proceed.
//! - **Non-blocking retrieval** hands its ticket back when it cannot be
//!   served, so declined attempts never stall later consumers.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use turnstile::TicketQueue;
//!
//! let queue = Arc::new(TicketQueue::new());
//!
//! let consumer = {
//!     let queue = queue.clone();
//!     thread::spawn(move || queue.dequeue().unwrap())
//! };
//!
//! queue.enqueue("job").unwrap();
//! assert_eq!(consumer.join().unwrap(), "job");
//! assert_eq!(queue.visited(), 1);
//!
//! // Whatever is still queued comes back to the caller on teardown.
//! queue.enqueue("left over").unwrap();
//! assert_eq!(queue.destroy(), vec!["left over"]);
//! assert!(queue.enqueue("late").is_err());
//! ```
//!
//! # Logging
//!
//! With the `tracing` feature the queue emits `tracing` events for ticket
//! hand-off and lifecycle changes; [`init_tracing`] installs a subscriber.
//! Without the feature the events compile away.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod config;
mod error;
mod queue;
mod ticket;
mod trace;
mod utils;

pub use config::{Introspection, QueueBuilder, QueueConfig};
pub use error::{EnqueueError, QueueError, TryDequeueError};
pub use queue::{QueueStats, TicketQueue};
pub use trace::init_tracing;
