//! Weakly consistent traversal over the ordering queues.
//!
//! An iterator keeps one cursor per queue and never holds a lock between
//! steps: each step read-locks a single queue, copies out the next key and
//! its [`Position`], and releases the lock. Under `Multi` the per-queue
//! cursors are merged by sequence number.
//!
//! ## Guarantees
//!
//! - Never panics or loops under concurrent mutation.
//! - Every key is yielded at most once per traversal. A key removed and
//!   re-added during traversal gets a fresh sequence number and is never
//!   yielded again at its old position.
//! - Keys added after the iterator was created are not yielded. Their
//!   sequence numbers lie at or past the bound captured at creation, which
//!   also makes every traversal finite.
//! - Keys removed after the iterator was created may or may not be yielded.
//!
//! ## Cost
//!
//! A step is O(1) while the node the cursor stands on stays linked. If it
//! was unlinked meanwhile, the cursor rescans its queue from the head (or
//! the tail, descending), which is O(n). A full traversal under heavy churn
//! can therefore cost O(n²).

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::ds::Position;
use crate::store::queue::{Direction, OrderQueues, QueuedKey};

#[derive(Debug)]
struct Cursor<K> {
    last: Option<Position>,
    pending: Option<QueuedKey<K>>,
    exhausted: bool,
}

impl<K> Cursor<K> {
    fn new() -> Self {
        Self {
            last: None,
            pending: None,
            exhausted: false,
        }
    }
}

/// Iterator over the keys of a [`ConcurrentOrderedStore`](crate::store::ordered::ConcurrentOrderedStore).
///
/// Created by `iter()` (oldest first) and `iter_rev()` (newest first).
#[derive(Debug)]
pub struct Iter<'a, K> {
    queues: &'a OrderQueues<K>,
    direction: Direction,
    seq_bound: u64,
    cursors: Vec<Cursor<K>>,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(queues: &'a OrderQueues<K>, direction: Direction) -> Self {
        let cursors = (0..queues.queue_count()).map(|_| Cursor::new()).collect();
        Self {
            queues,
            direction,
            seq_bound: queues.seq_bound(),
            cursors,
        }
    }

    fn refill(&mut self, queue: usize) {
        let cursor = &mut self.cursors[queue];
        while cursor.pending.is_none() && !cursor.exhausted {
            match self.queues.step(queue, self.direction, cursor.last) {
                Some(item) => {
                    cursor.last = Some(Position {
                        id: item.link.node,
                        seq: item.seq,
                    });
                    if item.seq < self.seq_bound {
                        cursor.pending = Some(item);
                    } else if self.direction == Direction::Ascending {
                        // Everything further along was appended after us.
                        cursor.exhausted = true;
                    }
                },
                None => cursor.exhausted = true,
            }
        }
    }
}

impl<K> Iterator for Iter<'_, K> {
    type Item = Arc<K>;

    fn next(&mut self) -> Option<Self::Item> {
        for queue in 0..self.cursors.len() {
            self.refill(queue);
        }

        let pending = self
            .cursors
            .iter()
            .enumerate()
            .filter_map(|(idx, cursor)| cursor.pending.as_ref().map(|item| (idx, item.seq)));
        let chosen = match self.direction {
            Direction::Ascending => pending.min_by_key(|&(_, seq)| seq),
            Direction::Descending => pending.max_by_key(|&(_, seq)| seq),
        };

        let (idx, _) = chosen?;
        self.cursors[idx].pending.take().map(|item| item.key)
    }
}

impl<K> FusedIterator for Iter<'_, K> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::config::QueuePolicy;

    fn keys<K: Copy>(iter: Iter<'_, K>) -> Vec<K> {
        iter.map(|k| *k).collect()
    }

    #[test]
    fn single_queue_both_directions() {
        let queues = OrderQueues::new(QueuePolicy::Single);
        for key in [1, 2, 3] {
            queues.push_back(0, Arc::new(key));
        }
        assert_eq!(keys(Iter::new(&queues, Direction::Ascending)), vec![1, 2, 3]);
        assert_eq!(keys(Iter::new(&queues, Direction::Descending)), vec![3, 2, 1]);
    }

    #[test]
    fn multi_queue_merges_by_sequence() {
        let queues = OrderQueues::new(QueuePolicy::Multi(3));
        for (queue, key) in [(0, 10), (2, 20), (1, 30), (0, 40), (2, 50)] {
            queues.push_back(queue, Arc::new(key));
        }
        assert_eq!(
            keys(Iter::new(&queues, Direction::Ascending)),
            vec![10, 20, 30, 40, 50]
        );
        assert_eq!(
            keys(Iter::new(&queues, Direction::Descending)),
            vec![50, 40, 30, 20, 10]
        );
    }

    #[test]
    fn keys_appended_after_creation_are_skipped() {
        let queues = OrderQueues::new(QueuePolicy::Single);
        queues.push_back(0, Arc::new(1));
        queues.push_back(0, Arc::new(2));

        let mut asc = Iter::new(&queues, Direction::Ascending);
        let mut desc = Iter::new(&queues, Direction::Descending);
        queues.push_back(0, Arc::new(3));

        assert_eq!(asc.next().map(|k| *k), Some(1));
        assert_eq!(asc.next().map(|k| *k), Some(2));
        assert_eq!(asc.next(), None);
        assert_eq!(asc.next(), None);

        assert_eq!(desc.next().map(|k| *k), Some(2));
        assert_eq!(desc.next().map(|k| *k), Some(1));
        assert_eq!(desc.next(), None);
    }

    #[test]
    fn removal_under_cursor_resumes_in_place() {
        let queues = OrderQueues::new(QueuePolicy::Single);
        let links: Vec<_> = [1, 2, 3, 4]
            .into_iter()
            .map(|key| queues.push_back(0, Arc::new(key)))
            .collect();

        let mut iter = Iter::new(&queues, Direction::Ascending);
        assert_eq!(iter.next().map(|k| *k), Some(1));
        assert_eq!(iter.next().map(|k| *k), Some(2));

        // Remove the node the cursor stands on and the one after it.
        queues.unlink(links[1]);
        queues.unlink(links[2]);
        assert_eq!(iter.next().map(|k| *k), Some(4));
        assert_eq!(iter.next(), None);
    }
}
