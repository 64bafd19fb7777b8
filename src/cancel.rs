//! Cooperative cancellation shared by the partition tasks of one terminal call.
//!
//! A [`Cancellation`] holds a set-once stop flag and a write-once slot for the
//! first error any task observed. Tasks poll [`Cancellation::is_cancelled`]
//! between elements; nothing on the per-element path takes a lock.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Stop flag plus first-error slot, scoped to a single terminal invocation.
#[derive(Debug, Default)]
pub struct Cancellation {
    flag: AtomicBool,
    error: OnceLock<anyhow::Error>,
}

impl Cancellation {
    /// A fresh, un-raised signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Raising an already raised flag is a no-op.
    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Record `err` if no error was recorded yet, then raise the flag.
    ///
    /// Later errors are dropped: only the first observed one reaches the caller.
    pub fn fail(&self, err: anyhow::Error) {
        if let Err(late) = self.error.set(err) {
            debug!(error = %late, "dropping error observed after the first failure");
        }
        self.cancel();
    }

    /// Consume the signal, returning the first recorded error, if any.
    pub fn into_error(self) -> Option<anyhow::Error> {
        self.error.into_inner()
    }

    /// Guard that raises the flag if the current thread unwinds while it is alive.
    pub(crate) fn on_unwind(&self) -> CancelOnUnwind<'_> {
        CancelOnUnwind(self)
    }
}

/// See [`Cancellation::on_unwind`].
pub(crate) struct CancelOnUnwind<'a>(&'a Cancellation);

impl Drop for CancelOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.cancel();
        }
    }
}
