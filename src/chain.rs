//! Backing store: a singly linked chain of nodes living in an index arena.
//!
//! Nodes are addressed by their slot in `nodes`. Unlinked slots are threaded
//! through the same `next` field to form a free list, so steady-state
//! enqueue/dequeue traffic recycles slots instead of allocating.

use std::collections::TryReserveError;

/// One arena slot. `item` is `Some` exactly while the slot is linked in the chain.
struct Node<T> {
    item: Option<T>,
    next: Option<usize>,
}

pub(crate) struct Chain<T> {
    nodes: Vec<Node<T>>,
    /// Head of the free list.
    free: Option<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Chain<T> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: None,
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty chain with room for `capacity` nodes.
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut chain = Self::new();
        chain.nodes.try_reserve_exact(capacity)?;
        Ok(chain)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes the arena can hold without growing.
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Links `item` at the tail.
    ///
    /// If the arena has to grow and the allocation fails, the item is handed
    /// back and the chain is left untouched.
    pub(crate) fn push_back(&mut self, item: T) -> Result<(), T> {
        let slot = match self.free {
            Some(slot) => {
                self.free = self.nodes[slot].next;
                self.nodes[slot] = Node {
                    item: Some(item),
                    next: None,
                };
                slot
            }
            None => {
                if self.nodes.len() == self.nodes.capacity()
                    && self.nodes.try_reserve(1).is_err()
                {
                    return Err(item);
                }
                self.nodes.push(Node {
                    item: Some(item),
                    next: None,
                });
                self.nodes.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
        Ok(())
    }

    /// Unlinks the head node and returns its item. The slot goes to the free list.
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        let slot = self.head?;
        let node = &mut self.nodes[slot];
        let item = node.item.take();
        self.head = node.next;
        node.next = self.free;
        self.free = Some(slot);

        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        item
    }

    /// Unlinks every node in FIFO order and releases all node storage.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        let mut items = Vec::with_capacity(self.len);
        while let Some(item) = self.pop_front() {
            items.push(item);
        }
        *self = Self::new();
        items
    }

    /// Walks the chain and checks the structural invariants.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.len == 0, self.head.is_none());
        assert_eq!(self.len == 0, self.tail.is_none());

        let mut walked = 0;
        let mut last = None;
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            assert!(self.nodes[slot].item.is_some(), "linked slot {slot} is empty");
            walked += 1;
            last = Some(slot);
            cursor = self.nodes[slot].next;
        }
        assert_eq!(walked, self.len);
        assert_eq!(last, self.tail);

        let mut free = 0;
        let mut cursor = self.free;
        while let Some(slot) = cursor {
            assert!(self.nodes[slot].item.is_none(), "free slot {slot} holds an item");
            free += 1;
            cursor = self.nodes[slot].next;
        }
        assert_eq!(walked + free, self.nodes.len());
    }
}
