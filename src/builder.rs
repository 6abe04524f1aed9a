//! Fluent builder for [`ConcurrentLinkedSet`].
//!
//! Collects sizing and queue-policy options and validates them once, at
//! build time, so a bad parameter surfaces as an [`InvalidArgument`] rather
//! than a panic.
//!
//! ## Example
//!
//! ```rust
//! use linkset::builder::LinkedSetBuilder;
//! use linkset::store::QueuePolicy;
//!
//! let set = LinkedSetBuilder::new()
//!     .initial_capacity(1_024)
//!     .concurrency_level(8)
//!     .policy(QueuePolicy::Multi(4))
//!     .try_build::<u64>()
//!     .unwrap();
//! set.add(7);
//! assert!(set.contains(&7));
//! ```

use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

use crate::error::InvalidArgument;
use crate::set::ConcurrentLinkedSet;
use crate::store::config::{QueuePolicy, StoreConfig};

/// Builder for creating set instances.
#[derive(Debug, Clone, Default)]
pub struct LinkedSetBuilder {
    config: StoreConfig,
}

impl LinkedSetBuilder {
    /// Create a builder with default sizing and a single ordering queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expected number of elements; sizes the index up front.
    pub fn initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.config.initial_capacity = initial_capacity;
        self
    }

    /// Per-segment fill ratio that triggers a table doubling.
    pub fn load_factor(mut self, load_factor: f32) -> Self {
        self.config.load_factor = load_factor;
        self
    }

    /// Expected number of concurrently writing threads.
    pub fn concurrency_level(mut self, concurrency_level: usize) -> Self {
        self.config.concurrency_level = concurrency_level;
        self
    }

    /// Ordering queue layout.
    pub fn policy(mut self, policy: QueuePolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Bound the set's size; the oldest elements are evicted beyond it.
    pub fn max_capacity(mut self, max_capacity: usize) -> Self {
        self.config.max_capacity = Some(max_capacity);
        self
    }

    /// The configuration collected so far.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Build a set with the default hasher.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if any collected option is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use linkset::builder::LinkedSetBuilder;
    ///
    /// assert!(LinkedSetBuilder::new().load_factor(0.0).try_build::<u32>().is_err());
    /// ```
    pub fn try_build<T>(self) -> Result<ConcurrentLinkedSet<T, FxBuildHasher>, InvalidArgument>
    where
        T: Eq + Hash,
    {
        ConcurrentLinkedSet::with_config(self.config)
    }

    /// Build a set hashing with `hasher`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if any collected option is invalid.
    pub fn try_build_with_hasher<T, S>(
        self,
        hasher: S,
    ) -> Result<ConcurrentLinkedSet<T, S>, InvalidArgument>
    where
        T: Eq + Hash,
        S: BuildHasher,
    {
        ConcurrentLinkedSet::with_config_and_hasher(self.config, hasher)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::RandomState;

    use super::*;

    #[test]
    fn test_defaults_match_store_config() {
        let builder = LinkedSetBuilder::new();
        assert_eq!(builder.config(), &StoreConfig::default());
        let set = builder.try_build::<u32>().unwrap();
        assert_eq!(set.policy(), QueuePolicy::Single);
    }

    #[test]
    fn test_all_policies_basic_ops() {
        for policy in [QueuePolicy::Single, QueuePolicy::Multi(1), QueuePolicy::Multi(8)] {
            let set = LinkedSetBuilder::new()
                .policy(policy)
                .try_build::<u64>()
                .unwrap();

            assert!(set.add(1), "{:?}: first add", policy);
            assert!(!set.add(1), "{:?}: duplicate add", policy);
            assert!(set.add(2));
            assert!(set.contains(&1));
            assert_eq!(set.len(), 2);

            assert!(set.remove(&1));
            assert!(!set.contains(&1));
            assert_eq!(set.len(), 1);

            set.clear();
            assert!(set.is_empty(), "{:?}: clear", policy);
            assert!(set.check_invariants().is_ok());
        }
    }

    #[test]
    fn test_capacity_enforcement() {
        let set = LinkedSetBuilder::new()
            .max_capacity(10)
            .try_build::<u64>()
            .unwrap();
        for i in 0..20 {
            set.add(i);
        }
        assert_eq!(set.len(), 10);
        assert_eq!(set.first().map(|e| *e), Some(10));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let err = LinkedSetBuilder::new()
            .concurrency_level(0)
            .try_build::<u64>()
            .unwrap_err();
        assert!(err.message().contains("concurrency_level"));

        assert!(
            LinkedSetBuilder::new()
                .policy(QueuePolicy::Multi(0))
                .try_build::<u64>()
                .is_err()
        );
        assert!(
            LinkedSetBuilder::new()
                .max_capacity(0)
                .try_build::<u64>()
                .is_err()
        );
    }

    #[test]
    fn test_custom_hasher() {
        let set = LinkedSetBuilder::new()
            .initial_capacity(4)
            .try_build_with_hasher::<&str, _>(RandomState::new())
            .unwrap();
        set.add("a");
        set.add("b");
        assert_eq!(set.iter().map(|e| *e).collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
