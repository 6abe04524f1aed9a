//! linkset: a concurrent, insertion-ordered hash set.
//!
//! [`ConcurrentLinkedSet`] behaves like a hash set that remembers the order
//! in which elements were first added. It is safe to share between threads
//! without external locking: membership changes are atomic per element and
//! iteration is weakly consistent (it never fails because of concurrent
//! modification and never yields an element twice).
//!
//! ## Layout
//!
//! - [`set`]: the public facade.
//! - [`store`]: the concurrent ordered key store the facade delegates to.
//! - [`ds`]: single-threaded building blocks (generational arena,
//!   sequence-stamped intrusive list, hash shard selector).
//! - [`builder`]: fluent construction with validation.
//! - [`error`]: error types.
//!
//! ## Example
//!
//! ```
//! use linkset::prelude::*;
//!
//! let set = ConcurrentLinkedSet::new();
//! assert!(set.add("b"));
//! assert!(set.add("a"));
//! assert!(!set.add("b"));
//!
//! let ordered: Vec<_> = set.iter().map(|e| *e).collect();
//! assert_eq!(ordered, vec!["b", "a"]);
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod prelude;
pub mod set;
pub mod store;

pub use crate::builder::LinkedSetBuilder;
pub use crate::error::{InvalidArgument, InvariantError};
pub use crate::set::ConcurrentLinkedSet;
pub use crate::store::{ConcurrentOrderedStore, QueuePolicy, StoreConfig};
