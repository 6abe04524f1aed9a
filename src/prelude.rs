//! Convenience re-exports for the common entry points.
//!
//! ```
//! use linkset::prelude::*;
//!
//! let set = LinkedSetBuilder::new()
//!     .policy(QueuePolicy::Multi(2))
//!     .try_build::<u32>()
//!     .unwrap();
//! set.add(1);
//! assert_eq!(set.len(), 1);
//! ```

pub use crate::builder::LinkedSetBuilder;
pub use crate::error::{InvalidArgument, InvariantError};
pub use crate::set::ConcurrentLinkedSet;
pub use crate::store::config::{QueuePolicy, StoreConfig};
pub use crate::store::iter::Iter;
#[cfg(feature = "metrics")]
pub use crate::store::metrics::StoreMetrics;
pub use crate::store::ordered::ConcurrentOrderedStore;
