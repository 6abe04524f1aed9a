//! Error types for the linkset library.
//!
//! ## Key Components
//!
//! - [`InvalidArgument`]: Returned when construction parameters are invalid
//!   (e.g. non-positive load factor, zero concurrency level).
//! - [`InvariantError`]: Returned by `check_invariants` when the hash index
//!   and the ordering queues disagree.
//!
//! An element that is already present is never an error: `add` reports it
//! through its `bool` return value.
//!
//! ## Example Usage
//!
//! ```
//! use linkset::error::InvalidArgument;
//! use linkset::set::ConcurrentLinkedSet;
//!
//! let set: Result<ConcurrentLinkedSet<u64>, InvalidArgument> =
//!     ConcurrentLinkedSet::with_params(16, 0.75, 4);
//! assert!(set.is_ok());
//!
//! // Invalid load factor is caught without panicking
//! let bad = ConcurrentLinkedSet::<u64>::with_params(16, 0.0, 4);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvalidArgument
// ---------------------------------------------------------------------------

/// Error returned when construction parameters are invalid.
///
/// Produced by [`StoreConfig::validate`](crate::store::config::StoreConfig::validate)
/// and every fallible constructor built on it. Carries a human-readable
/// description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use linkset::set::ConcurrentLinkedSet;
///
/// let err = ConcurrentLinkedSet::<u64>::with_params(16, 0.75, 0).unwrap_err();
/// assert!(err.to_string().contains("concurrency_level"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidArgument(String);

impl InvalidArgument {
    /// Creates a new `InvalidArgument` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidArgument {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal store invariants are violated.
///
/// Produced by
/// [`ConcurrentOrderedStore::check_invariants`](crate::store::ordered::ConcurrentOrderedStore::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvalidArgument --------------------------------------------------

    #[test]
    fn invalid_argument_display_shows_message() {
        let err = InvalidArgument::new("load_factor must be > 0");
        assert_eq!(err.to_string(), "load_factor must be > 0");
    }

    #[test]
    fn invalid_argument_message_accessor() {
        let err = InvalidArgument::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invalid_argument_clone_and_eq() {
        let a = InvalidArgument::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_argument_implements_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<InvalidArgument>();
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("queue length mismatch");
        assert_eq!(err.to_string(), "queue length mismatch");
    }

    #[test]
    fn invariant_debug_includes_message() {
        let err = InvariantError::new("dangling link");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("dangling link"));
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }
}
