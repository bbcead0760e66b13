//! Ticketing authority.
//!
//! Two counters put a strict total order on retrieval attempts, independent of
//! whether data is available: `next` is handed to the next caller, `serving`
//! is the only ticket allowed to take the head item. All mutation happens
//! under the queue lock, which is what makes rollback exact.

/// A drawn place in line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Ticket(u64);

impl Ticket {
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn number(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub(crate) struct Dispenser {
    next: u64,
    serving: u64,
}

impl Dispenser {
    pub(crate) const fn new() -> Self {
        Self {
            next: 0,
            serving: 0,
        }
    }

    /// Hands out the next ticket in line.
    pub(crate) fn draw(&mut self) -> Ticket {
        let ticket = Ticket(self.next);
        self.next += 1;
        ticket
    }

    /// Returns a ticket that will never be presented.
    ///
    /// Only the most recently drawn ticket can be returned, and it must be
    /// returned before the lock that drew it is released.
    pub(crate) fn rollback(&mut self, ticket: Ticket) {
        debug_assert_eq!(
            ticket.0 + 1,
            self.next,
            "only the most recent ticket can be rolled back"
        );
        self.next -= 1;
    }

    pub(crate) fn is_serving(&self, ticket: Ticket) -> bool {
        self.serving == ticket.0
    }

    /// Moves service on to the next ticket after `ticket` has been served.
    pub(crate) fn advance(&mut self, ticket: Ticket) {
        debug_assert!(self.is_serving(ticket));
        self.serving += 1;
        debug_assert!(self.serving <= self.next);
    }

    pub(crate) fn serving(&self) -> u64 {
        self.serving
    }

    pub(crate) fn next(&self) -> u64 {
        self.next
    }

    /// Tickets drawn and not yet served.
    #[cfg(test)]
    pub(crate) fn outstanding(&self) -> u64 {
        self.next - self.serving
    }
}
