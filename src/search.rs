//! Short-circuiting search terminals.
//!
//! `any`, `all` and `find_any` stop as soon as the answer is known: the task that
//! decides it raises the terminal's cancellation flag, and every other partition
//! abandons its slice at the next element boundary.
//!
//! `first` and `try_first` use a lowest-partition-wins policy instead. A partition
//! keeps searching until it finds a match or learns that a lower-indexed
//! partition already has one; the reported element is the match from the lowest
//! such partition, which is the first match in source order.

use crate::ParStream;
use crate::error::StreamError;
use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};

impl<T: Send + 'static> ParStream<T> {
    /// First element (in source order) satisfying `pred`.
    ///
    /// Fails with [`StreamError::NotFound`] when no element matches.
    pub fn first<P>(&self, pred: P) -> Result<T>
    where
        P: Fn(&T) -> bool + Sync,
    {
        self.try_first(pred)?
            .ok_or_else(|| StreamError::NotFound.into())
    }

    /// Like [`first`](Self::first), returning `None` when nothing matches.
    pub fn try_first<P>(&self, pred: P) -> Result<Option<T>>
    where
        P: Fn(&T) -> bool + Sync,
    {
        let winner = AtomicUsize::new(usize::MAX);
        let hits = self
            .runner()
            .fork_join("first", self.source_len(), |part, cancel| {
                let mut hit = None;
                self.drive(part, cancel, &mut |x| {
                    if winner.load(Ordering::Acquire) < part.index {
                        return Ok(false);
                    }
                    if pred(&x) {
                        winner.fetch_min(part.index, Ordering::AcqRel);
                        hit = Some(x);
                        return Ok(false);
                    }
                    Ok(true)
                })?;
                Ok(hit)
            })?;
        Ok(hits.into_iter().flatten().next())
    }

    /// Some element satisfying `pred`, whichever partition finds one first.
    pub fn find_any<P>(&self, pred: P) -> Result<Option<T>>
    where
        P: Fn(&T) -> bool + Sync,
    {
        let hits = self
            .runner()
            .fork_join("find_any", self.source_len(), |part, cancel| {
                let mut hit = None;
                self.drive(part, cancel, &mut |x| {
                    if pred(&x) {
                        cancel.cancel();
                        hit = Some(x);
                        return Ok(false);
                    }
                    Ok(true)
                })?;
                Ok(hit)
            })?;
        Ok(hits.into_iter().flatten().next())
    }

    /// `true` if some element satisfies `pred`.
    pub fn any<P>(&self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Sync,
    {
        let found = self
            .runner()
            .fork_join("any", self.source_len(), |part, cancel| {
                let mut found = false;
                self.drive(part, cancel, &mut |x| {
                    if pred(&x) {
                        found = true;
                        cancel.cancel();
                        return Ok(false);
                    }
                    Ok(true)
                })?;
                Ok(found)
            })?;
        Ok(found.into_iter().any(|f| f))
    }

    /// `true` if every element satisfies `pred` (vacuously true when empty).
    pub fn all<P>(&self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool + Sync,
    {
        let verdicts = self
            .runner()
            .fork_join("all", self.source_len(), |part, cancel| {
                let mut holds = true;
                self.drive(part, cancel, &mut |x| {
                    if !pred(&x) {
                        holds = false;
                        cancel.cancel();
                        return Ok(false);
                    }
                    Ok(true)
                })?;
                Ok(holds)
            })?;
        Ok(verdicts.into_iter().all(|v| v))
    }
}
