//! Concurrent ordered key storage.
//!
//! [`ConcurrentOrderedStore`] pairs a lock-striped hash index with one or
//! more insertion-ordered queues. [`ConcurrentLinkedSet`](crate::set::ConcurrentLinkedSet)
//! is a thin facade over it; use the store directly when you need the
//! structural accessors (`segment_count`, `bucket_count`, `queue_count`).
//!
//! | Module     | Contents                                          |
//! |------------|---------------------------------------------------|
//! | `config`   | [`StoreConfig`], [`QueuePolicy`], default sizing  |
//! | `ordered`  | the store itself                                  |
//! | `iter`     | weakly consistent [`Iter`]                        |
//! | `metrics`  | operation counters (`metrics` feature)            |

pub mod config;
pub mod iter;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod ordered;
mod queue;
mod segment;

pub use config::{QueuePolicy, StoreConfig};
pub use iter::Iter;
#[cfg(feature = "metrics")]
pub use metrics::StoreMetrics;
pub use ordered::ConcurrentOrderedStore;
