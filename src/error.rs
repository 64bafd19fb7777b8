//! Typed error kinds raised by the engine itself.
//!
//! Terminals return [`anyhow::Result`]; engine-originated failures are wrapped
//! [`StreamError`] values, so callers can tell them apart from errors raised by
//! their own functions:
//!
//! ```
//! use ironstream::{ParStream, StreamError};
//!
//! let err = ParStream::from_vec(vec![1, 3, 5])
//!     .first(|x: &i32| x % 2 == 0)
//!     .unwrap_err();
//! assert!(matches!(err.downcast_ref::<StreamError>(), Some(StreamError::NotFound)));
//! ```

use thiserror::Error;

/// Failures produced by the engine (as opposed to user-supplied functions).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A search terminal (`first`) found no matching element.
    #[error("no element satisfies the predicate")]
    NotFound,

    /// A terminal that needs at least one element ran over an empty stream.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl StreamError {
    pub(crate) fn empty(op: &str) -> Self {
        Self::InvalidOperation(format!("`{op}` requires at least one element"))
    }
}
