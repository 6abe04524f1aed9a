//! One lock stripe of the store's hash index.
//!
//! A segment is a chained bucket table mapping keys to their queue links. The
//! store wraps each segment in its own `RwLock`, so writers on different
//! segments never contend.
//!
//! ## Growth
//!
//! ```text
//!   threshold = buckets × load_factor
//!
//!   insert ─► count > threshold ? ─► double buckets, rehash by stored hash
//! ```
//!
//! Rehashing only moves [`IndexEntry`] values between buckets. Queue links are
//! copied verbatim, so resizing never changes iteration order.

use std::borrow::Borrow;
use std::sync::Arc;

use crate::store::queue::QueueLink;

/// Largest bucket count a single segment grows to.
pub const MAX_SEGMENT_BUCKETS: usize = 1 << 30;

/// A live key in the hash index.
#[derive(Debug)]
pub(crate) struct IndexEntry<K> {
    pub(crate) hash: u64,
    pub(crate) key: Arc<K>,
    pub(crate) link: QueueLink,
}

impl<K> IndexEntry<K> {
    #[inline]
    fn matches<Q>(&self, hash: u64, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.hash == hash && key.eq(Borrow::<Q>::borrow(&*self.key))
    }
}

#[derive(Debug)]
pub(crate) struct Segment<K> {
    buckets: Vec<Vec<IndexEntry<K>>>,
    count: usize,
    threshold: usize,
    load_factor: f32,
}

impl<K> Segment<K> {
    /// Creates a segment sized to hold `capacity` entries before growing.
    pub(crate) fn new(capacity: usize, load_factor: f32) -> Self {
        let buckets = capacity.clamp(1, MAX_SEGMENT_BUCKETS).next_power_of_two();
        let mut table = Vec::with_capacity(buckets);
        table.resize_with(buckets, Vec::new);
        Self {
            buckets: table,
            count: 0,
            threshold: threshold_for(buckets, load_factor),
            load_factor,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }

    pub(crate) fn find<Q>(&self, hash: u64, key: &Q) -> Option<&IndexEntry<K>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.buckets[self.bucket_index(hash)]
            .iter()
            .find(|entry| entry.matches(hash, key))
    }

    /// Adds an entry the caller has checked to be absent.
    ///
    /// Returns `true` when the insertion pushed the segment over its
    /// threshold and the table was doubled.
    pub(crate) fn insert(&mut self, entry: IndexEntry<K>) -> bool {
        let idx = self.bucket_index(entry.hash);
        self.buckets[idx].push(entry);
        self.count += 1;
        if self.count > self.threshold && self.buckets.len() < MAX_SEGMENT_BUCKETS {
            self.rehash();
            true
        } else {
            false
        }
    }

    pub(crate) fn remove<Q>(&mut self, hash: u64, key: &Q) -> Option<IndexEntry<K>>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let idx = self.bucket_index(hash);
        let bucket = &mut self.buckets[idx];
        let pos = bucket
            .iter()
            .position(|entry| entry.matches(hash, key))?;
        self.count -= 1;
        Some(bucket.swap_remove(pos))
    }

    /// Removes the entry for `key` only if it still points at `link`.
    ///
    /// Used when a caller picked a victim from a queue without holding the
    /// segment lock: the key may have been removed and re-added since.
    pub(crate) fn remove_linked(
        &mut self,
        hash: u64,
        key: &K,
        link: QueueLink,
    ) -> Option<IndexEntry<K>>
    where
        K: Eq,
    {
        let idx = self.bucket_index(hash);
        let bucket = &mut self.buckets[idx];
        let pos = bucket
            .iter()
            .position(|entry| entry.link == link && entry.hash == hash && *entry.key == *key)?;
        self.count -= 1;
        Some(bucket.swap_remove(pos))
    }

    /// Removes every entry, handing each to `f`.
    pub(crate) fn drain_with(&mut self, mut f: impl FnMut(IndexEntry<K>)) {
        for bucket in &mut self.buckets {
            for entry in bucket.drain(..) {
                f(entry);
            }
        }
        self.count = 0;
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &IndexEntry<K>> {
        self.buckets.iter().flatten()
    }

    fn rehash(&mut self) {
        let new_len = (self.buckets.len() * 2).min(MAX_SEGMENT_BUCKETS);
        let mut table: Vec<Vec<IndexEntry<K>>> = Vec::with_capacity(new_len);
        table.resize_with(new_len, Vec::new);
        let mask = new_len - 1;
        for bucket in self.buckets.drain(..) {
            for entry in bucket {
                table[(entry.hash as usize) & mask].push(entry);
            }
        }
        self.buckets = table;
        self.threshold = threshold_for(new_len, self.load_factor);
    }
}

fn threshold_for(buckets: usize, load_factor: f32) -> usize {
    let threshold = buckets as f64 * f64::from(load_factor);
    if threshold >= usize::MAX as f64 {
        usize::MAX
    } else {
        threshold as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::SlotArena;

    fn link(arena: &mut SlotArena<()>) -> QueueLink {
        QueueLink {
            queue: 0,
            node: arena.insert(()),
        }
    }

    fn entry(key: u64, arena: &mut SlotArena<()>) -> IndexEntry<u64> {
        IndexEntry {
            hash: key,
            key: Arc::new(key),
            link: link(arena),
        }
    }

    #[test]
    fn new_segment_rounds_buckets_to_power_of_two() {
        assert_eq!(Segment::<u64>::new(0, 0.75).bucket_count(), 1);
        assert_eq!(Segment::<u64>::new(5, 0.75).bucket_count(), 8);
        assert_eq!(Segment::<u64>::new(16, 0.75).bucket_count(), 16);
    }

    #[test]
    fn insert_find_remove() {
        let mut arena = SlotArena::new();
        let mut segment = Segment::new(4, 0.75);
        segment.insert(entry(1, &mut arena));
        segment.insert(entry(2, &mut arena));

        assert_eq!(segment.len(), 2);
        assert_eq!(segment.find(1, &1).map(|e| *e.key), Some(1));
        assert!(segment.find(3, &3).is_none());

        let removed = segment.remove(1, &1).unwrap();
        assert_eq!(*removed.key, 1);
        assert_eq!(segment.len(), 1);
        assert!(segment.remove(1, &1).is_none());
    }

    #[test]
    fn grows_when_threshold_exceeded() {
        let mut arena = SlotArena::new();
        let mut segment = Segment::new(4, 0.75);
        assert_eq!(segment.bucket_count(), 4);

        // threshold = 3; the fourth insert triggers the doubling.
        assert!(!segment.insert(entry(1, &mut arena)));
        assert!(!segment.insert(entry(2, &mut arena)));
        assert!(!segment.insert(entry(3, &mut arena)));
        assert!(segment.insert(entry(4, &mut arena)));
        assert_eq!(segment.bucket_count(), 8);

        for key in 1..=4u64 {
            assert!(segment.find(key, &key).is_some());
        }
    }

    #[test]
    fn rehash_preserves_links() {
        let mut arena = SlotArena::new();
        let mut segment = Segment::new(1, 1.0);
        let mut expected = Vec::new();
        for key in 0..64u64 {
            let e = entry(key, &mut arena);
            expected.push((key, e.link));
            segment.insert(e);
        }
        assert!(segment.bucket_count() >= 64);
        for (key, link) in expected {
            assert_eq!(segment.find(key, &key).map(|e| e.link), Some(link));
        }
    }

    #[test]
    fn remove_linked_requires_matching_link() {
        let mut arena = SlotArena::new();
        let mut segment = Segment::new(4, 0.75);
        let e = entry(7, &mut arena);
        let current = e.link;
        segment.insert(e);

        let stale = link(&mut arena);
        assert!(segment.remove_linked(7, &7, stale).is_none());
        assert_eq!(segment.len(), 1);
        assert!(segment.remove_linked(7, &7, current).is_some());
        assert_eq!(segment.len(), 0);
    }

    #[test]
    fn drain_with_visits_every_entry() {
        let mut arena = SlotArena::new();
        let mut segment = Segment::new(2, 0.75);
        for key in 0..10u64 {
            segment.insert(entry(key, &mut arena));
        }
        let mut drained = Vec::new();
        segment.drain_with(|e| drained.push(*e.key));
        drained.sort_unstable();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
        assert_eq!(segment.len(), 0);
        assert_eq!(segment.entries().count(), 0);
    }
}
