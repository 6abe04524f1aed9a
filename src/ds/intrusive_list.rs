//! Intrusive doubly linked list backed by `SlotArena`.
//!
//! Stores list nodes in a `SlotArena` and links them by `SlotId`. Every node
//! carries the sequence number it was appended with; nodes are only ever
//! appended at the tail, so sequence numbers strictly increase from head to
//! tail. That ordering is what lets a cursor resume after the node it last
//! visited has been unlinked.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬──────────────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next, seq }                      │
//!   ├────────┼──────────────────────────────────────────────────────┤
//!   │ id_1   │ { value: A, prev: None, next: Some(id_2), seq: 4 }   │
//!   │ id_2   │ { value: B, prev: Some(id_1), next: id_3, seq: 9 }   │
//!   │ id_3   │ { value: C, prev: Some(id_2), next: None, seq: 12 }  │
//!   └────────┴──────────────────────────────────────────────────────┘
//!
//!   head ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail
//! ```
//!
//! ## Cursor resumption
//!
//! [`IntrusiveList::next_after`] and [`IntrusiveList::prev_before`] take the
//! [`Position`] last returned. If that node is still linked the step follows
//! its link in O(1). If it was unlinked meanwhile, the step scans for the
//! first node whose sequence number lies past the remembered one, which is
//! exactly where the removed node used to be.
//!
//! ## Performance
//! - `push_back_with_seq`: O(1)
//! - `remove`: O(1)
//! - `next_after` / `prev_before`: O(1), O(n) after a concurrent unlink
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
    seq: u64,
}

/// Location of a node as seen by a cursor: its handle plus its sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub id: SlotId,
    pub seq: u64,
}

#[derive(Debug)]
/// Intrusive list that stores nodes in a `SlotArena` and links them via `SlotId`.
pub struct IntrusiveList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of nodes in the list.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns the value for a node id, if present.
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    /// Returns the sequence number recorded for `id`, if present.
    pub fn seq(&self, id: SlotId) -> Option<u64> {
        self.arena.get(id).map(|node| node.seq)
    }

    /// Appends a node at the back and returns its `SlotId`.
    ///
    /// `seq` must be greater than the sequence number of the current tail.
    pub fn push_back_with_seq(&mut self, value: T, seq: u64) -> SlotId {
        debug_assert!(
            self.tail
                .and_then(|tail| self.seq(tail))
                .is_none_or(|tail_seq| tail_seq < seq),
            "sequence numbers must increase towards the tail"
        );
        let id = self.arena.insert(Node {
            value,
            prev: self.tail,
            next: None,
            seq,
        });
        if let Some(tail) = self.tail {
            if let Some(node) = self.arena.get_mut(tail) {
                node.next = Some(id);
            }
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        id
    }

    /// Removes the node `id` from the list and returns its value.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.detach(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Returns the node after `last`, or the head when `last` is `None`.
    ///
    /// Tolerates `last` having been removed since it was returned.
    pub fn next_after(&self, last: Option<Position>) -> Option<(Position, &T)> {
        let next = match last {
            None => self.head,
            Some(pos) => match self.arena.get(pos.id) {
                Some(node) if node.seq == pos.seq => node.next,
                _ => self.first_after_seq(pos.seq),
            },
        };
        next.and_then(|id| self.entry(id))
    }

    /// Returns the node before `last`, or the tail when `last` is `None`.
    ///
    /// Tolerates `last` having been removed since it was returned.
    pub fn prev_before(&self, last: Option<Position>) -> Option<(Position, &T)> {
        let prev = match last {
            None => self.tail,
            Some(pos) => match self.arena.get(pos.id) {
                Some(node) if node.seq == pos.seq => node.prev,
                _ => self.last_before_seq(pos.seq),
            },
        };
        prev.and_then(|id| self.entry(id))
    }

    /// Clears the list and frees all nodes.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    /// Walks the list and checks link symmetry, length and sequence order.
    pub fn validate(&self) -> Result<(), InvariantError> {
        if self.head.is_none() || self.tail.is_none() {
            if self.head.is_some() || self.tail.is_some() || !self.is_empty() {
                return Err(InvariantError::new(
                    "list head/tail disagree about emptiness",
                ));
            }
            return Ok(());
        }

        let mut count = 0usize;
        let mut current = self.head;
        let mut prev: Option<SlotId> = None;
        let mut prev_seq: Option<u64> = None;

        while let Some(id) = current {
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new("list links to a freed node"))?;
            if node.prev != prev {
                return Err(InvariantError::new("list prev link is not symmetric"));
            }
            if prev_seq.is_some_and(|seq| seq >= node.seq) {
                return Err(InvariantError::new(
                    "list sequence numbers are not increasing",
                ));
            }
            if node.next.is_none() && self.tail != Some(id) {
                return Err(InvariantError::new("list tail does not match last node"));
            }

            prev = Some(id);
            prev_seq = Some(node.seq);
            current = node.next;
            count += 1;
            if count > self.len() {
                return Err(InvariantError::new("list contains a cycle"));
            }
        }

        if count != self.len() {
            return Err(InvariantError::new(format!(
                "list walk visited {} nodes but arena holds {}",
                count,
                self.len()
            )));
        }
        Ok(())
    }

    fn entry(&self, id: SlotId) -> Option<(Position, &T)> {
        self.arena
            .get(id)
            .map(|node| (Position { id, seq: node.seq }, &node.value))
    }

    fn first_after_seq(&self, seq: u64) -> Option<SlotId> {
        let mut current = self.head;
        while let Some(id) = current {
            let node = self.arena.get(id)?;
            if node.seq > seq {
                return Some(id);
            }
            current = node.next;
        }
        None
    }

    fn last_before_seq(&self, seq: u64) -> Option<SlotId> {
        let mut current = self.tail;
        while let Some(id) = current {
            let node = self.arena.get(id)?;
            if node.seq < seq {
                return Some(id);
            }
            current = node.prev;
        }
        None
    }

    fn detach(&mut self, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.arena.get(id)?;
            (node.prev, node.next)
        };

        if let Some(prev_id) = prev {
            if let Some(prev_node) = self.arena.get_mut(prev_id) {
                prev_node.next = next;
            }
        } else {
            self.head = next;
        }

        if let Some(next_id) = next {
            if let Some(next_node) = self.arena.get_mut(next_id) {
                next_node.prev = prev;
            }
        } else {
            self.tail = prev;
        }

        Some(())
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}
