//! Shared sharding helpers for consistent shard selection.
//!
//! The store hashes every key once; the resulting 64-bit hash is then mapped
//! to an index segment and, under a multi-queue policy, to an ordering queue.
//! Both mappings go through a [`ShardSelector`]. Giving the two selectors
//! different seeds keeps queue placement independent from segment placement,
//! so keys that contend on one segment still spread across queues.
//!
//! ## Architecture
//!
//! ```text
//!   key ──hash──► 0x9f3a_51c0_7e12_44d8
//!                        │
//!          ┌─────────────┴──────────────┐
//!          ▼                            ▼
//!   ShardSelector { 16, seed: 0 }   ShardSelector { 4, seed: Q }
//!          │                            │
//!          ▼                            ▼
//!     segment 11                    queue 2
//! ```
//!
//! Properties
//! ──────────
//! • Deterministic: same (hash, seed, shards) always yields the same shard
//! • Uses the high bits of the mixed hash; buckets inside a segment use the
//!   low bits, so the two choices do not correlate
//!
//! ## Example Usage
//!
//! ```
//! use linkset::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_hash(0xdead_beef);
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_hash(0xdead_beef), shard);
//! ```

/// Odd multiplier from the golden ratio (Fibonacci hashing).
const MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic shard selector over precomputed key hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards with the given `seed`.
    ///
    /// The shard count is clamped to at least 1.
    ///
    /// ```
    /// use linkset::ds::ShardSelector;
    ///
    /// assert_eq!(ShardSelector::new(16, 0).shard_count(), 16);
    /// assert_eq!(ShardSelector::new(0, 0).shard_count(), 1);
    /// ```
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key hash to a shard index in `[0, shards)`.
    #[inline]
    pub fn shard_for_hash(&self, hash: u64) -> usize {
        if self.shards == 1 {
            return 0;
        }
        let mixed = (hash ^ self.seed).wrapping_mul(MIX);
        ((mixed >> 32) as usize) % self.shards
    }
}

impl Default for ShardSelector {
    /// Creates a single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}
