//! Ordering queues: insertion-ordered lists of live keys.
//!
//! ## Architecture
//!
//! ```text
//!   OrderQueues<K>
//!   ┌─────────────────────────────────────────────────────────────┐
//!   │ seq: AtomicU64   (global append counter)                    │
//!   │ selector: ShardSelector  (key hash → queue, Multi only)     │
//!   │                                                             │
//!   │ queues[0]: RwLock<IntrusiveList<Arc<K>>>                    │
//!   │   head ─► [a:1] ◄──► [c:3] ◄──► [d:7] ◄── tail              │
//!   │ queues[1]: RwLock<IntrusiveList<Arc<K>>>                    │
//!   │   head ─► [b:2] ◄──► [e:9] ◄── tail                         │
//!   └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sequence numbers are drawn while the target queue's write lock is held,
//! so within one queue they increase strictly from head to tail. Across
//! queues they give an approximate global insertion order, which the merging
//! iterator uses to interleave shards.
//!
//! Queues never take a segment lock. The store always acquires the segment
//! lock first, which fixes the lock order at segment → queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::ds::{IntrusiveList, Position, ShardSelector, SlotId};
use crate::error::InvariantError;
use crate::store::config::QueuePolicy;

/// Seed for queue selection; differs from the segment selector's seed.
const QUEUE_SEED: u64 = 0x51_7C_C1_B7_27_22_0A_95;

/// Where an entry lives: which queue, and which node inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QueueLink {
    pub(crate) queue: usize,
    pub(crate) node: SlotId,
}

/// Traversal direction of a queue cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Ascending,
    Descending,
}

/// A key read out of a queue, with enough context to find it again.
#[derive(Debug, Clone)]
pub(crate) struct QueuedKey<K> {
    pub(crate) link: QueueLink,
    pub(crate) seq: u64,
    pub(crate) key: Arc<K>,
}

#[derive(Debug)]
pub(crate) struct OrderQueues<K> {
    queues: Box<[RwLock<IntrusiveList<Arc<K>>>]>,
    selector: ShardSelector,
    seq: AtomicU64,
}

impl<K> OrderQueues<K> {
    /// Node storage grows on demand; nothing is preallocated.
    pub(crate) fn new(policy: QueuePolicy) -> Self {
        let count = policy.queue_count().max(1);
        let queues = (0..count).map(|_| RwLock::new(IntrusiveList::new())).collect();
        Self {
            queues,
            selector: ShardSelector::new(count, QUEUE_SEED),
            seq: AtomicU64::new(0),
        }
    }

    pub(crate) fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Sequence number the next append will receive.
    ///
    /// Every node linked before this call has a smaller sequence number.
    pub(crate) fn seq_bound(&self) -> u64 {
        self.seq.load(Ordering::Acquire)
    }

    /// Picks the queue a key with this hash is appended to.
    #[inline]
    pub(crate) fn queue_for(&self, hash: u64) -> usize {
        self.selector.shard_for_hash(hash)
    }

    /// Appends `key` at the tail of `queue`.
    pub(crate) fn push_back(&self, queue: usize, key: Arc<K>) -> QueueLink {
        let mut list = self.queues[queue].write();
        let seq = self.seq.fetch_add(1, Ordering::AcqRel);
        let node = list.push_back_with_seq(key, seq);
        QueueLink { queue, node }
    }

    /// Unlinks the node at `link`, returning its key if it was still linked.
    pub(crate) fn unlink(&self, link: QueueLink) -> Option<Arc<K>> {
        self.queues[link.queue].write().remove(link.node)
    }

    /// Removes every node from every queue.
    pub(crate) fn clear(&self) {
        for queue in self.queues.iter() {
            queue.write().clear();
        }
    }

    /// Total number of linked nodes, summed queue by queue.
    pub(crate) fn linked_len(&self) -> usize {
        self.queues.iter().map(|queue| queue.read().len()).sum()
    }

    /// Advances a cursor on one queue by one step.
    pub(crate) fn step(
        &self,
        queue: usize,
        direction: Direction,
        last: Option<Position>,
    ) -> Option<QueuedKey<K>> {
        let list = self.queues[queue].read();
        let (pos, key) = match direction {
            Direction::Ascending => list.next_after(last)?,
            Direction::Descending => list.prev_before(last)?,
        };
        Some(QueuedKey {
            link: QueueLink {
                queue,
                node: pos.id,
            },
            seq: pos.seq,
            key: Arc::clone(key),
        })
    }

    /// Oldest (`Ascending`) or newest (`Descending`) key across all queues.
    pub(crate) fn edge(&self, direction: Direction) -> Option<QueuedKey<K>> {
        let heads = (0..self.queues.len()).filter_map(|queue| self.step(queue, direction, None));
        match direction {
            Direction::Ascending => heads.min_by_key(|head| head.seq),
            Direction::Descending => heads.max_by_key(|head| head.seq),
        }
    }

    /// Returns the key linked at `link`, if that node is still live.
    pub(crate) fn key_at(&self, link: QueueLink) -> Option<Arc<K>> {
        self.queues
            .get(link.queue)?
            .read()
            .get(link.node)
            .map(Arc::clone)
    }

    /// Validates the link structure of every queue.
    pub(crate) fn validate(&self) -> Result<(), InvariantError> {
        for (idx, queue) in self.queues.iter().enumerate() {
            queue
                .read()
                .validate()
                .map_err(|err| InvariantError::new(format!("queue {}: {}", idx, err)))?;
        }
        Ok(())
    }
}
