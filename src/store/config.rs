//! Construction parameters for [`ConcurrentOrderedStore`](crate::store::ordered::ConcurrentOrderedStore).
//!
//! | Parameter           | Default  | Constraint                    |
//! |---------------------|----------|-------------------------------|
//! | `initial_capacity`  | 16       | any; clamped to 2^20          |
//! | `load_factor`       | 0.75     | finite, > 0                   |
//! | `concurrency_level` | 16       | > 0                           |
//! | `policy`            | `Single` | `Multi(n)` needs 0 < n ≤ 1024 |
//! | `max_capacity`      | `None`   | `Some(n)` requires n > 0      |

use crate::error::InvalidArgument;

pub const DEFAULT_INITIAL_CAPACITY: usize = 16;
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;
pub const DEFAULT_CONCURRENCY_LEVEL: usize = 16;

/// Largest capacity hint honored up front. Tables grow past it on demand.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 20;

/// Largest queue count accepted for [`QueuePolicy::Multi`].
pub const MAX_QUEUES: usize = 1 << 10;

/// Smallest capacity used by bulk construction.
pub const MIN_BULK_CAPACITY: usize = 11;

/// How entries are distributed over ordering queues.
///
/// Chosen at construction and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuePolicy {
    /// One queue shared by every entry. Iteration follows the exact global
    /// insertion order, at the price of one lock for all order updates.
    #[default]
    Single,
    /// Entries are spread across `n` queues by key hash. Order updates on
    /// different queues do not contend, but a global traversal is only an
    /// approximate insertion order.
    Multi(usize),
}

impl QueuePolicy {
    /// Number of ordering queues this policy maintains.
    pub fn queue_count(self) -> usize {
        match self {
            QueuePolicy::Single => 1,
            QueuePolicy::Multi(n) => n,
        }
    }
}

/// Sizing and ordering configuration for a store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreConfig {
    /// Number of entries to size the hash index for up front.
    pub initial_capacity: usize,
    /// Average entries per bucket above which a segment doubles its table.
    pub load_factor: f32,
    /// Expected number of concurrently updating threads; sizes lock striping.
    pub concurrency_level: usize,
    /// Ordering queue layout.
    pub policy: QueuePolicy,
    /// Optional bound; the oldest entries are evicted once it is exceeded.
    pub max_capacity: Option<usize>,
}

impl StoreConfig {
    /// Default configuration sized for `initial_capacity` entries.
    pub fn with_initial_capacity(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            ..Self::default()
        }
    }

    /// Capacity for bulk construction from `len` elements: twice the input,
    /// but never below [`MIN_BULK_CAPACITY`].
    pub fn bulk_capacity(len: usize) -> usize {
        len.saturating_mul(2).max(MIN_BULK_CAPACITY)
    }

    /// Checks every parameter, returning the first violation.
    ///
    /// ```
    /// use linkset::store::config::{QueuePolicy, StoreConfig};
    ///
    /// assert!(StoreConfig::default().validate().is_ok());
    ///
    /// let bad = StoreConfig { policy: QueuePolicy::Multi(0), ..StoreConfig::default() };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(InvalidArgument::new(format!(
                "load_factor must be finite and > 0, got {}",
                self.load_factor
            )));
        }
        if self.concurrency_level == 0 {
            return Err(InvalidArgument::new("concurrency_level must be > 0"));
        }
        if let QueuePolicy::Multi(n) = self.policy {
            if n == 0 || n > MAX_QUEUES {
                return Err(InvalidArgument::new(format!(
                    "QueuePolicy::Multi queue count must be in 1..={}, got {}",
                    MAX_QUEUES, n
                )));
            }
        }
        if self.max_capacity == Some(0) {
            return Err(InvalidArgument::new("max_capacity must be > 0 when set"));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            concurrency_level: DEFAULT_CONCURRENCY_LEVEL,
            policy: QueuePolicy::Single,
            max_capacity: None,
        }
    }
}
