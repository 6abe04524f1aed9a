//! # Concurrent Linked Set
//!
//! A thread-safe hash set that remembers insertion order, built on
//! [`ConcurrentOrderedStore`]. Every method takes `&self`; share the set
//! between threads with `Arc<ConcurrentLinkedSet<T>>`.
//!
//! ## Add semantics
//!
//! [`add`](ConcurrentLinkedSet::add) never replaces. If an equal element is
//! already present the new one is dropped and the stored instance stays. Use
//! [`addx`](ConcurrentLinkedSet::addx) to get hold of the instance that won,
//! e.g. to canonicalize values shared by many threads.
//!
//! ## Rendering
//!
//! `Debug` output depends on the queue policy. Under
//! [`QueuePolicy::Single`] it lists every element in insertion order. Under
//! [`QueuePolicy::Multi`] there is no cheap exact global order, so the
//! element listing is omitted and only the length is shown.
//!
//! ```
//! use linkset::set::ConcurrentLinkedSet;
//!
//! let set = ConcurrentLinkedSet::new();
//! set.add("x");
//! set.add("y");
//! assert_eq!(format!("{:?}", set), r#"ConcurrentLinkedSet { len: 2, elements: ["x", "y"] }"#);
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use linkset::set::ConcurrentLinkedSet;
//!
//! let set = Arc::new(ConcurrentLinkedSet::new());
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let set = Arc::clone(&set);
//!         thread::spawn(move || {
//!             for i in 0..100u32 {
//!                 set.add(i % 50);
//!             }
//!         })
//!     })
//!     .collect();
//! for h in handles {
//!     h.join().unwrap();
//! }
//! assert_eq!(set.len(), 50);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use rustc_hash::FxBuildHasher;

use crate::error::{InvalidArgument, InvariantError};
use crate::store::config::{QueuePolicy, StoreConfig};
use crate::store::iter::Iter;
#[cfg(feature = "metrics")]
use crate::store::metrics::StoreMetrics;
use crate::store::ordered::ConcurrentOrderedStore;

/// Concurrent, insertion-ordered hash set.
pub struct ConcurrentLinkedSet<T, S = FxBuildHasher> {
    store: ConcurrentOrderedStore<T, S>,
}

impl<T> ConcurrentLinkedSet<T, FxBuildHasher>
where
    T: Eq + Hash,
{
    /// Creates an empty set with default capacity, load factor and
    /// concurrency level, and a single ordering queue.
    pub fn new() -> Self {
        Self {
            store: ConcurrentOrderedStore::new(),
        }
    }

    /// Creates an empty set sized for `initial_capacity` elements.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self {
            store: ConcurrentOrderedStore::with_capacity(initial_capacity),
        }
    }

    /// Creates an empty set with explicit sizing parameters.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if `load_factor` is not a positive finite
    /// number or `concurrency_level` is zero.
    pub fn with_params(
        initial_capacity: usize,
        load_factor: f32,
        concurrency_level: usize,
    ) -> Result<Self, InvalidArgument> {
        Self::with_config(StoreConfig {
            initial_capacity,
            load_factor,
            concurrency_level,
            ..StoreConfig::default()
        })
    }

    /// Creates an empty set from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if the configuration is invalid.
    pub fn with_config(config: StoreConfig) -> Result<Self, InvalidArgument> {
        Ok(Self {
            store: ConcurrentOrderedStore::with_config(config)?,
        })
    }

    /// Creates a set holding `elements`, deduplicated, in first-seen order.
    ///
    /// The set is sized for twice the number of elements (at least 11) so
    /// that early additions do not immediately trigger resizing.
    ///
    /// ```
    /// use linkset::set::ConcurrentLinkedSet;
    ///
    /// let set = ConcurrentLinkedSet::from_elements(vec![3, 1, 3, 2, 1]);
    /// assert_eq!(set.iter().map(|e| *e).collect::<Vec<_>>(), vec![3, 1, 2]);
    /// ```
    pub fn from_elements<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let elements: Vec<T> = elements.into_iter().collect();
        let set = Self::with_capacity(StoreConfig::bulk_capacity(elements.len()));
        set.add_all(elements);
        set
    }
}

impl<T, S> ConcurrentLinkedSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    /// Creates an empty set with a custom hasher.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if the configuration is invalid.
    pub fn with_config_and_hasher(config: StoreConfig, hasher: S) -> Result<Self, InvalidArgument> {
        Ok(Self {
            store: ConcurrentOrderedStore::with_config_and_hasher(config, hasher)?,
        })
    }

    /// Adds `element` unless an equal element is already present.
    ///
    /// Unlike a replacing insert, an equal element already in the set is
    /// kept and `element` is dropped. Returns `true` if `element` was added.
    pub fn add(&self, element: T) -> bool {
        self.store.add_if_absent(element)
    }

    /// Adds an already shared element unless an equal one is present.
    pub fn add_arc(&self, element: Arc<T>) -> bool {
        self.store.add_arc_if_absent(element)
    }

    /// Adds `element` unless an equal element is present.
    ///
    /// Returns the element already in the set, or `None` if `element` was
    /// added.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use linkset::set::ConcurrentLinkedSet;
    ///
    /// let set = ConcurrentLinkedSet::new();
    /// assert!(set.addx(String::from("id-7")).is_none());
    /// let canonical = set.addx(String::from("id-7")).unwrap();
    /// assert!(Arc::ptr_eq(&canonical, &set.get("id-7").unwrap()));
    /// ```
    pub fn addx(&self, element: T) -> Option<Arc<T>> {
        self.store.add_if_absent_returning_previous(element)
    }

    /// `Arc` variant of [`addx`](Self::addx).
    pub fn addx_arc(&self, element: Arc<T>) -> Option<Arc<T>> {
        self.store.add_arc_if_absent_returning_previous(element)
    }

    /// Adds every element; returns `true` if at least one was new.
    pub fn add_all<I>(&self, elements: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        elements
            .into_iter()
            .fold(false, |changed, element| self.add(element) | changed)
    }

    /// Removes `element`. Returns `false` if it was not present.
    pub fn remove<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.remove(element)
    }

    /// Removes `element` and returns the stored instance.
    pub fn take<Q>(&self, element: &Q) -> Option<Arc<T>>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.take(element)
    }

    /// Removes every listed element; returns `true` if any was present.
    pub fn remove_all<'q, Q, I>(&self, elements: I) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized + 'q,
        I: IntoIterator<Item = &'q Q>,
    {
        elements
            .into_iter()
            .fold(false, |changed, element| self.remove(element) | changed)
    }

    /// Removes every element for which `keep` returns `false`.
    ///
    /// Elements added concurrently with this call may or may not be visited.
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) {
        for element in self.store.iter() {
            if !keep(&element) {
                self.store.remove(&*element);
            }
        }
    }

    /// Returns `true` if an equal element is present.
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.contains(element)
    }

    /// Returns the stored instance equal to `element`.
    pub fn get<Q>(&self, element: &Q) -> Option<Arc<T>>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.get(element)
    }

    /// Removes and returns the oldest element.
    pub fn poll_first(&self) -> Option<Arc<T>> {
        self.store.poll_first()
    }

    /// Removes and returns the newest element.
    pub fn poll_last(&self) -> Option<Arc<T>> {
        self.store.poll_last()
    }

    /// Removes every element.
    pub fn clear(&self) {
        self.store.clear()
    }

    /// Verifies internal consistency; intended for tests and debugging.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.store.check_invariants()
    }
}

impl<T, S> ConcurrentLinkedSet<T, S> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Queue layout chosen at construction.
    pub fn policy(&self) -> QueuePolicy {
        self.store.policy()
    }

    /// Elements from oldest to newest.
    pub fn iter(&self) -> Iter<'_, T> {
        self.store.iter()
    }

    /// Elements from newest to oldest.
    pub fn descending_iter(&self) -> Iter<'_, T> {
        self.store.iter_rev()
    }

    /// Oldest element, without removing it.
    pub fn first(&self) -> Option<Arc<T>> {
        self.store.first()
    }

    /// Newest element, without removing it.
    pub fn last(&self) -> Option<Arc<T>> {
        self.store.last()
    }

    /// Snapshot of operation counters.
    #[cfg(feature = "metrics")]
    pub fn metrics(&self) -> StoreMetrics {
        self.store.metrics()
    }
}

impl<T> Default for ConcurrentLinkedSet<T, FxBuildHasher>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> fmt::Debug for ConcurrentLinkedSet<T, S>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ConcurrentLinkedSet");
        out.field("len", &self.len());
        match self.policy() {
            QueuePolicy::Single => {
                let elements: Vec<Arc<T>> = self.iter().collect();
                out.field("elements", &elements).finish()
            },
            QueuePolicy::Multi(_) => out.finish_non_exhaustive(),
        }
    }
}

impl<T, S> PartialEq for ConcurrentLinkedSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    /// Set equality: same size and every element of `self` is in `other`.
    /// Order is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|element| other.contains(&*element))
    }
}

impl<T, S> Eq for ConcurrentLinkedSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
}

impl<T> FromIterator<T> for ConcurrentLinkedSet<T, FxBuildHasher>
where
    T: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_elements(iter)
    }
}

impl<T, S> Extend<T> for ConcurrentLinkedSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<'a, T, S> IntoIterator for &'a ConcurrentLinkedSet<T, S> {
    type Item = Arc<T>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
