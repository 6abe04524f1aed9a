//! # Concurrent Ordered Store
//!
//! A hash-indexed, thread-safe key container whose traversal order follows
//! insertion order. It is the engine behind
//! [`ConcurrentLinkedSet`](crate::set::ConcurrentLinkedSet).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                    ConcurrentOrderedStore<K, S>                      │
//!   │                                                                      │
//!   │   hash(key) ──► ShardSelector ──► segment i                          │
//!   │                                                                      │
//!   │   segments: [CachePadded<RwLock<Segment<K>>>; 2^p]                   │
//!   │   ┌───────────┬───────────┬───────────┬───────────┐                  │
//!   │   │ Segment 0 │ Segment 1 │ Segment 2 │ Segment 3 │                  │
//!   │   │ key → link│ key → link│ key → link│ key → link│                  │
//!   │   └─────┬─────┴─────┬─────┴─────┬─────┴─────┬─────┘                  │
//!   │         │ QueueLink { queue, node }         │                        │
//!   │         ▼                                   ▼                        │
//!   │   OrderQueues<K>                                                     │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │ Single:  head ─► [a] ◄──► [b] ◄──► [c] ◄── tail              │   │
//!   │   │ Multi(n): n such lists, key → queue by hash                  │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//!
//! Every mutation of a key runs under the write lock of that key's segment.
//! Linking into a queue (or unlinking) happens inside that critical section,
//! so no thread can observe a key in the index without its queue node or the
//! other way round through the store's API. Two racing `add_if_absent` calls
//! for one key serialize on the segment lock: the first inserts, the second
//! finds the first one's entry.
//!
//! Locks are always taken in the order segment → queue. Iterators and
//! `first`/`last` only ever hold a single queue read lock at a time.
//!
//! ## Sizing
//!
//! | Parameter           | Effect                                              |
//! |---------------------|-----------------------------------------------------|
//! | `concurrency_level` | segment count, rounded up to a power of two         |
//! | `initial_capacity`  | initial buckets per segment (`capacity / segments`) |
//! |                     | hints above `MAX_INITIAL_CAPACITY` are clamped      |
//! | `load_factor`       | a segment doubles once `len > buckets × factor`     |
//!
//! Resizing rehashes one segment's buckets and never touches the queues.
//!
//! ## Example Usage
//!
//! ```
//! use linkset::store::ConcurrentOrderedStore;
//!
//! let store: ConcurrentOrderedStore<&str> = ConcurrentOrderedStore::new();
//! assert!(store.add_if_absent("a"));
//! assert!(store.add_if_absent("b"));
//! assert!(!store.add_if_absent("a"));
//!
//! let forward: Vec<_> = store.iter().map(|k| *k).collect();
//! assert_eq!(forward, vec!["a", "b"]);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;
use log::{debug, trace};
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;

use crate::ds::ShardSelector;
use crate::error::{InvalidArgument, InvariantError};
use crate::store::config::{MAX_INITIAL_CAPACITY, QueuePolicy, StoreConfig};
use crate::store::iter::Iter;
#[cfg(feature = "metrics")]
use crate::store::metrics::{StoreCounters, StoreMetrics};
use crate::store::queue::{Direction, OrderQueues};
use crate::store::segment::{IndexEntry, Segment};

/// Upper bound on the number of index segments.
pub const MAX_SEGMENTS: usize = 1 << 16;

/// Concurrent, insertion-ordered key store.
///
/// Keys are stored as `Arc<K>`: the instance that won an insertion race is
/// the one every later lookup, traversal and duplicate add returns.
pub struct ConcurrentOrderedStore<K, S = FxBuildHasher> {
    segments: Box<[CachePadded<RwLock<Segment<K>>>]>,
    segment_selector: ShardSelector,
    queues: OrderQueues<K>,
    policy: QueuePolicy,
    max_capacity: Option<usize>,
    len: AtomicUsize,
    hasher: S,
    #[cfg(feature = "metrics")]
    counters: StoreCounters,
}

impl<K> ConcurrentOrderedStore<K, FxBuildHasher>
where
    K: Eq + Hash,
{
    /// Creates an empty store with the default configuration.
    pub fn new() -> Self {
        Self::from_validated(StoreConfig::default(), FxBuildHasher)
    }

    /// Creates an empty store sized for `initial_capacity` entries.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::from_validated(
            StoreConfig::with_initial_capacity(initial_capacity),
            FxBuildHasher,
        )
    }

    /// Creates an empty store from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if [`StoreConfig::validate`] rejects the
    /// configuration.
    pub fn with_config(config: StoreConfig) -> Result<Self, InvalidArgument> {
        Self::with_config_and_hasher(config, FxBuildHasher)
    }
}

impl<K, S> ConcurrentOrderedStore<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates an empty store with a custom hasher.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if the configuration is invalid.
    pub fn with_config_and_hasher(config: StoreConfig, hasher: S) -> Result<Self, InvalidArgument> {
        config.validate()?;
        Ok(Self::from_validated(config, hasher))
    }

    fn from_validated(config: StoreConfig, hasher: S) -> Self {
        let segment_count = config
            .concurrency_level
            .clamp(1, MAX_SEGMENTS)
            .next_power_of_two();
        let capacity = config.initial_capacity.min(MAX_INITIAL_CAPACITY);
        let per_segment = capacity.div_ceil(segment_count);
        let segments = (0..segment_count)
            .map(|_| CachePadded::new(RwLock::new(Segment::new(per_segment, config.load_factor))))
            .collect();

        debug!(
            "ordered store: {} segments x {} buckets, policy {:?}, max_capacity {:?}",
            segment_count, per_segment, config.policy, config.max_capacity
        );

        Self {
            segments,
            segment_selector: ShardSelector::new(segment_count, 0),
            queues: OrderQueues::new(config.policy),
            policy: config.policy,
            max_capacity: config.max_capacity,
            len: AtomicUsize::new(0),
            hasher,
            #[cfg(feature = "metrics")]
            counters: StoreCounters::default(),
        }
    }

    #[inline]
    fn hash_of<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        let hash = self.hasher.hash_one(key);
        hash ^ (hash >> 32)
    }

    #[inline]
    fn segment_for(&self, hash: u64) -> &RwLock<Segment<K>> {
        &self.segments[self.segment_selector.shard_for_hash(hash)]
    }

    /// Inserts `key` if no equal key is present. Returns `true` if inserted.
    ///
    /// Atomic per key: of several racing calls with equal keys exactly one
    /// returns `true`.
    pub fn add_if_absent(&self, key: K) -> bool {
        self.add_arc_if_absent(Arc::new(key))
    }

    /// Inserts an already shared key if no equal key is present.
    pub fn add_arc_if_absent(&self, key: Arc<K>) -> bool {
        self.insert_if_absent(key).is_none()
    }

    /// Inserts `key` if no equal key is present.
    ///
    /// Returns the key already stored when there was one, or `None` when this
    /// call performed the insertion.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use linkset::store::ConcurrentOrderedStore;
    ///
    /// let store: ConcurrentOrderedStore<String> = ConcurrentOrderedStore::new();
    /// assert!(store.add_if_absent_returning_previous("k".to_string()).is_none());
    /// let kept = store.add_if_absent_returning_previous("k".to_string()).unwrap();
    /// assert!(Arc::ptr_eq(&kept, &store.get("k").unwrap()));
    /// ```
    pub fn add_if_absent_returning_previous(&self, key: K) -> Option<Arc<K>> {
        self.insert_if_absent(Arc::new(key))
    }

    /// `Arc` variant of [`add_if_absent_returning_previous`](Self::add_if_absent_returning_previous).
    pub fn add_arc_if_absent_returning_previous(&self, key: Arc<K>) -> Option<Arc<K>> {
        self.insert_if_absent(key)
    }

    fn insert_if_absent(&self, key: Arc<K>) -> Option<Arc<K>> {
        let hash = self.hash_of(&*key);
        {
            let mut segment = self.segment_for(hash).write();
            if let Some(existing) = segment.find(hash, &*key) {
                #[cfg(feature = "metrics")]
                self.counters.inc_duplicate();
                return Some(Arc::clone(&existing.key));
            }

            let link = self.queues.push_back(self.queues.queue_for(hash), Arc::clone(&key));
            let resized = segment.insert(IndexEntry { hash, key, link });
            self.len.fetch_add(1, Ordering::AcqRel);

            #[cfg(feature = "metrics")]
            self.counters.inc_insert();
            if resized {
                #[cfg(feature = "metrics")]
                self.counters.inc_resize();
                trace!(
                    "segment resized to {} buckets ({} entries)",
                    segment.bucket_count(),
                    segment.len()
                );
            }
        }
        self.evict_overflow();
        None
    }

    /// Removes `key`. Returns `false` if it was not present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes `key` and returns the stored instance.
    pub fn take<Q>(&self, key: &Q) -> Option<Arc<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        let mut segment = self.segment_for(hash).write();
        let entry = segment.remove(hash, key)?;
        self.queues.unlink(entry.link);
        self.len.fetch_sub(1, Ordering::AcqRel);
        drop(segment);

        #[cfg(feature = "metrics")]
        self.counters.inc_remove();
        Some(entry.key)
    }

    /// Returns `true` if an equal key is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        self.segment_for(hash).read().find(hash, key).is_some()
    }

    /// Returns the stored instance equal to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        self.segment_for(hash)
            .read()
            .find(hash, key)
            .map(|entry| Arc::clone(&entry.key))
    }

    /// Removes and returns the oldest key.
    pub fn poll_first(&self) -> Option<Arc<K>> {
        let key = self.poll(Direction::Ascending)?;
        #[cfg(feature = "metrics")]
        self.counters.inc_remove();
        Some(key)
    }

    /// Removes and returns the newest key.
    pub fn poll_last(&self) -> Option<Arc<K>> {
        let key = self.poll(Direction::Descending)?;
        #[cfg(feature = "metrics")]
        self.counters.inc_remove();
        Some(key)
    }

    fn poll(&self, direction: Direction) -> Option<Arc<K>> {
        loop {
            let victim = self.queues.edge(direction)?;
            let hash = self.hash_of(&*victim.key);
            let mut segment = self.segment_for(hash).write();
            if let Some(entry) = segment.remove_linked(hash, &victim.key, victim.link) {
                self.queues.unlink(entry.link);
                self.len.fetch_sub(1, Ordering::AcqRel);
                return Some(entry.key);
            }
            // Lost a race with a concurrent removal; look again.
        }
    }

    fn evict_overflow(&self) {
        let Some(max) = self.max_capacity else {
            return;
        };
        while self.len.load(Ordering::Acquire) > max {
            if self.poll(Direction::Ascending).is_none() {
                break;
            }
            #[cfg(feature = "metrics")]
            self.counters.inc_eviction();
            trace!("evicted oldest entry to stay within max_capacity {}", max);
        }
    }

    /// Removes every key.
    ///
    /// Holds all segment write locks for the duration, so concurrent
    /// mutators observe either the full contents or none of them.
    pub fn clear(&self) {
        let mut guards: Vec<_> = self.segments.iter().map(|segment| segment.write()).collect();
        for guard in guards.iter_mut() {
            guard.drain_with(drop);
        }
        self.queues.clear();
        self.len.store(0, Ordering::Release);
    }

    /// Verifies that the index and the queues describe the same entries.
    ///
    /// Locks every segment for reading, so the check sees a snapshot that no
    /// mutator can change halfway.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let guards: Vec<_> = self.segments.iter().map(|segment| segment.read()).collect();

        let mut indexed = 0usize;
        for (seg_idx, segment) in guards.iter().enumerate() {
            for entry in segment.entries() {
                indexed += 1;
                if self.segment_selector.shard_for_hash(entry.hash) != seg_idx {
                    return Err(InvariantError::new(format!(
                        "entry stored in segment {} belongs elsewhere",
                        seg_idx
                    )));
                }
                if entry.link.queue != self.queues.queue_for(entry.hash) {
                    return Err(InvariantError::new(format!(
                        "entry linked into queue {} instead of its hashed queue",
                        entry.link.queue
                    )));
                }
                match self.queues.key_at(entry.link) {
                    Some(linked) if Arc::ptr_eq(&linked, &entry.key) => {},
                    Some(_) => {
                        return Err(InvariantError::new(
                            "queue node holds a different key than its index entry",
                        ));
                    },
                    None => {
                        return Err(InvariantError::new("index entry points at a freed queue node"));
                    },
                }
            }
            if segment.len() != segment.entries().count() {
                return Err(InvariantError::new(format!(
                    "segment {} count is out of sync",
                    seg_idx
                )));
            }
        }

        let len = self.len.load(Ordering::Acquire);
        if indexed != len {
            return Err(InvariantError::new(format!(
                "index holds {} entries but len is {}",
                indexed, len
            )));
        }
        let linked = self.queues.linked_len();
        if linked != indexed {
            return Err(InvariantError::new(format!(
                "queues link {} entries but index holds {}",
                linked, indexed
            )));
        }
        self.queues.validate()
    }
}

impl<K, S> ConcurrentOrderedStore<K, S> {
    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Returns `true` if no key is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue layout chosen at construction.
    pub fn policy(&self) -> QueuePolicy {
        self.policy
    }

    /// Bound enforced by oldest-first eviction, if any.
    pub fn max_capacity(&self) -> Option<usize> {
        self.max_capacity
    }

    /// Number of lock stripes in the hash index.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total bucket count across all segments.
    pub fn bucket_count(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| segment.read().bucket_count())
            .sum()
    }

    /// Number of ordering queues.
    pub fn queue_count(&self) -> usize {
        self.queues.queue_count()
    }

    /// Keys from oldest to newest (merged across queues under `Multi`).
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.queues, Direction::Ascending)
    }

    /// Keys from newest to oldest (merged across queues under `Multi`).
    pub fn iter_rev(&self) -> Iter<'_, K> {
        Iter::new(&self.queues, Direction::Descending)
    }

    /// Oldest key, without removing it.
    pub fn first(&self) -> Option<Arc<K>> {
        self.queues.edge(Direction::Ascending).map(|item| item.key)
    }

    /// Newest key, without removing it.
    pub fn last(&self) -> Option<Arc<K>> {
        self.queues.edge(Direction::Descending).map(|item| item.key)
    }

    /// Snapshot of operation counters.
    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> StoreMetrics {
        self.counters.snapshot()
    }
}

impl<K> Default for ConcurrentOrderedStore<K, FxBuildHasher>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> fmt::Debug for ConcurrentOrderedStore<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentOrderedStore")
            .field("len", &self.len())
            .field("policy", &self.policy)
            .field("segments", &self.segments.len())
            .field("max_capacity", &self.max_capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn multi(queues: usize) -> StoreConfig {
        StoreConfig {
            policy: QueuePolicy::Multi(queues),
            ..StoreConfig::default()
        }
    }

    #[test]
    fn add_if_absent_inserts_once() {
        let store = ConcurrentOrderedStore::new();
        assert!(store.add_if_absent(1));
        assert!(!store.add_if_absent(1));
        assert_eq!(store.len(), 1);
        assert!(store.contains(&1));
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn returning_previous_yields_retained_instance() {
        let store: ConcurrentOrderedStore<String> = ConcurrentOrderedStore::new();
        assert!(store.add_if_absent_returning_previous("x".to_string()).is_none());

        let first = store.get("x").unwrap();
        let previous = store
            .add_if_absent_returning_previous("x".to_string())
            .unwrap();
        assert!(Arc::ptr_eq(&first, &previous));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn arc_variants_keep_caller_instance() {
        let store: ConcurrentOrderedStore<String> = ConcurrentOrderedStore::new();
        let shared = Arc::new("shared".to_string());
        assert!(store.add_arc_if_absent(Arc::clone(&shared)));
        assert!(Arc::ptr_eq(&store.get("shared").unwrap(), &shared));

        let other = Arc::new("shared".to_string());
        let kept = store.add_arc_if_absent_returning_previous(other).unwrap();
        assert!(Arc::ptr_eq(&kept, &shared));
    }

    #[test]
    fn remove_is_idempotent() {
        let store = ConcurrentOrderedStore::new();
        store.add_if_absent("a");
        assert!(store.remove(&"a"));
        assert!(!store.remove(&"a"));
        assert!(!store.remove(&"never"));
        assert_eq!(store.len(), 0);
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn single_queue_preserves_order_both_ways() {
        let store = ConcurrentOrderedStore::new();
        for key in ["a", "b", "c"] {
            store.add_if_absent(key);
        }
        let forward: Vec<_> = store.iter().map(|k| *k).collect();
        let backward: Vec<_> = store.iter_rev().map(|k| *k).collect();
        assert_eq!(forward, vec!["a", "b", "c"]);
        assert_eq!(backward, vec!["c", "b", "a"]);
    }

    #[test]
    fn readd_after_remove_moves_to_tail() {
        let store = ConcurrentOrderedStore::new();
        for key in [1, 2, 3] {
            store.add_if_absent(key);
        }
        store.remove(&1);
        store.add_if_absent(1);
        let order: Vec<_> = store.iter().map(|k| *k).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn multi_queue_iteration_yields_every_key_once() {
        let store = ConcurrentOrderedStore::with_config(multi(4)).unwrap();
        for key in 0..200u32 {
            store.add_if_absent(key);
        }
        assert_eq!(store.queue_count(), 4);

        let forward: Vec<_> = store.iter().map(|k| *k).collect();
        let unique: HashSet<_> = forward.iter().copied().collect();
        assert_eq!(forward.len(), 200);
        assert_eq!(unique.len(), 200);

        // Single-threaded inserts draw increasing sequence numbers, so the
        // merge reproduces insertion order exactly.
        assert_eq!(forward, (0..200).collect::<Vec<_>>());
        let backward: Vec<_> = store.iter_rev().map(|k| *k).collect();
        assert_eq!(backward, (0..200).rev().collect::<Vec<_>>());
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn growth_preserves_order() {
        let config = StoreConfig {
            initial_capacity: 1,
            load_factor: 0.5,
            concurrency_level: 1,
            ..StoreConfig::default()
        };
        let store = ConcurrentOrderedStore::with_config(config).unwrap();
        assert_eq!(store.segment_count(), 1);
        assert_eq!(store.bucket_count(), 1);

        for key in 0..1_000u32 {
            store.add_if_absent(key);
        }
        assert!(store.bucket_count() >= 2_000);
        let order: Vec<_> = store.iter().map(|k| *k).collect();
        assert_eq!(order, (0..1_000).collect::<Vec<_>>());
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn huge_capacity_hint_is_clamped() {
        let store = ConcurrentOrderedStore::with_capacity(usize::MAX);
        assert!(store.bucket_count() <= MAX_INITIAL_CAPACITY);
        assert!(store.add_if_absent(1u32));
        assert!(store.contains(&1));
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn segment_count_rounds_concurrency_level() {
        let config = StoreConfig {
            concurrency_level: 5,
            ..StoreConfig::default()
        };
        let store: ConcurrentOrderedStore<u64> = ConcurrentOrderedStore::with_config(config).unwrap();
        assert_eq!(store.segment_count(), 8);
    }

    #[test]
    fn invalid_config_rejected() {
        let zero_load = StoreConfig {
            load_factor: 0.0,
            ..StoreConfig::default()
        };
        assert!(ConcurrentOrderedStore::<u64>::with_config(zero_load).is_err());

        let zero_level = StoreConfig {
            concurrency_level: 0,
            ..StoreConfig::default()
        };
        assert!(ConcurrentOrderedStore::<u64>::with_config(zero_level).is_err());
    }

    #[test]
    fn first_last_and_poll() {
        let store = ConcurrentOrderedStore::new();
        assert!(store.first().is_none());
        assert!(store.poll_first().is_none());

        for key in [10, 20, 30] {
            store.add_if_absent(key);
        }
        assert_eq!(store.first().map(|k| *k), Some(10));
        assert_eq!(store.last().map(|k| *k), Some(30));

        assert_eq!(store.poll_first().map(|k| *k), Some(10));
        assert_eq!(store.poll_last().map(|k| *k), Some(30));
        assert_eq!(store.len(), 1);
        assert!(!store.contains(&10));
        assert!(!store.contains(&30));
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn max_capacity_evicts_oldest() {
        let config = StoreConfig {
            max_capacity: Some(3),
            ..StoreConfig::default()
        };
        let store = ConcurrentOrderedStore::with_config(config).unwrap();
        for key in 1..=5 {
            store.add_if_absent(key);
        }
        assert_eq!(store.len(), 3);
        let order: Vec<_> = store.iter().map(|k| *k).collect();
        assert_eq!(order, vec![3, 4, 5]);
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn clear_empties_index_and_queues() {
        let store = ConcurrentOrderedStore::with_config(multi(3)).unwrap();
        for key in 0..50 {
            store.add_if_absent(key);
        }
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.iter().count(), 0);
        assert!(!store.contains(&7));
        assert!(store.check_invariants().is_ok());

        assert!(store.add_if_absent(7));
        assert_eq!(store.iter().map(|k| *k).collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn borrowed_lookups() {
        let store: ConcurrentOrderedStore<String> = ConcurrentOrderedStore::new();
        store.add_if_absent("alpha".to_string());
        assert!(store.contains("alpha"));
        assert_eq!(store.get("alpha").as_deref().map(String::as_str), Some("alpha"));
        assert_eq!(store.take("alpha").as_deref().map(String::as_str), Some("alpha"));
        assert!(!store.contains("alpha"));
    }

    #[test]
    fn debug_output_is_summary() {
        let store = ConcurrentOrderedStore::new();
        store.add_if_absent(1);
        let dbg = format!("{:?}", store);
        assert!(dbg.contains("ConcurrentOrderedStore"));
        assert!(dbg.contains("len: 1"));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_count_operations() {
        let store = ConcurrentOrderedStore::new();
        store.add_if_absent(1);
        store.add_if_absent(1);
        store.add_if_absent(2);
        store.remove(&1);
        let metrics = store.metrics();
        assert_eq!(metrics.inserts, 2);
        assert_eq!(metrics.duplicates, 1);
        assert_eq!(metrics.removes, 1);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(u8),
            Remove(u8),
            PollFirst,
            PollLast,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => any::<u8>().prop_map(Op::Add),
                2 => any::<u8>().prop_map(Op::Remove),
                1 => Just(Op::PollFirst),
                1 => Just(Op::PollLast),
            ]
        }

        proptest! {
            #[test]
            fn prop_matches_vec_model(ops in prop::collection::vec(op(), 0..200)) {
                let store = ConcurrentOrderedStore::with_config(StoreConfig {
                    initial_capacity: 2,
                    concurrency_level: 2,
                    ..StoreConfig::default()
                })
                .unwrap();
                let mut model: Vec<u8> = Vec::new();

                for op in ops {
                    match op {
                        Op::Add(k) => {
                            let inserted = store.add_if_absent(k);
                            prop_assert_eq!(inserted, !model.contains(&k));
                            if inserted {
                                model.push(k);
                            }
                        },
                        Op::Remove(k) => {
                            let removed = store.remove(&k);
                            let pos = model.iter().position(|&m| m == k);
                            prop_assert_eq!(removed, pos.is_some());
                            if let Some(pos) = pos {
                                model.remove(pos);
                            }
                        },
                        Op::PollFirst => {
                            let polled = store.poll_first().map(|k| *k);
                            let expected = if model.is_empty() { None } else { Some(model.remove(0)) };
                            prop_assert_eq!(polled, expected);
                        },
                        Op::PollLast => {
                            prop_assert_eq!(store.poll_last().map(|k| *k), model.pop());
                        },
                    }
                }

                prop_assert_eq!(store.len(), model.len());
                let forward: Vec<u8> = store.iter().map(|k| *k).collect();
                prop_assert_eq!(&forward, &model);
                let mut backward: Vec<u8> = store.iter_rev().map(|k| *k).collect();
                backward.reverse();
                prop_assert_eq!(&backward, &model);
                prop_assert!(store.check_invariants().is_ok());
            }
        }
    }
}
