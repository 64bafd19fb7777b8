//! Partitioned, lazily fused parallel streams.
//!
//! A [`ParStream<T>`] is a source handle plus a deferred, fused chain of
//! per-element steps. Combinators such as [`ParStream::map`] wrap the chain's
//! continuation and return a new descriptor immediately; nothing runs until a
//! terminal (`to_vec`, `fold`, `order_by`, `any`, ...) is called. A terminal
//! asks its [`Runner`] to split the source into contiguous partitions and runs
//! the whole fused chain once per partition, in source order within each slice.
//!
//! ```
//! use ironstream::ParStream;
//!
//! # fn main() -> anyhow::Result<()> {
//! let squares_of_evens = ParStream::from_vec((1..=10).collect::<Vec<i64>>())
//!     .map(|x| x * x)
//!     .filter(|x| x % 2 == 0);
//!
//! assert_eq!(squares_of_evens.to_vec()?, vec![4, 16, 36, 64, 100]);
//! assert_eq!(squares_of_evens.sum()?, 220);
//! # Ok(())
//! # }
//! ```
//!
//! # Ordering
//! Partition outputs are concatenated in partition order, so [`ParStream::to_vec`]
//! preserves source order for any chain of `map`, `filter`, `flat_map`, `choose`,
//! `try_map` and `try_filter`.

use crate::cancel::Cancellation;
use crate::partition::Partition;
use crate::runner::{ExecMode, Runner};
use crate::stream::Stream;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Downstream consumer inside a partition task. `Ok(false)` stops the producer.
pub(crate) type Sink<'a, T> = dyn FnMut(T) -> Result<bool> + 'a;

/// The fused chain: drive a sink over one partition of the source.
/// Returns `Ok(false)` when the sink or the cancellation flag stopped it.
type Chain<T> = dyn Fn(Partition, &Cancellation, &mut Sink<'_, T>) -> Result<bool> + Send + Sync;

pub struct ParStream<T> {
    len: usize,
    chain: Arc<Chain<T>>,
    runner: Runner,
}

impl<T> Clone for ParStream<T> {
    fn clone(&self) -> Self {
        Self {
            len: self.len,
            chain: Arc::clone(&self.chain),
            runner: self.runner,
        }
    }
}

/* ===================== construction ===================== */

impl<T: Clone + Send + Sync + 'static> ParStream<T> {
    /// Wrap a random-access source. `Vec<T>`, `Box<[T]>`, `&[T]` and `Arc<[T]>`
    /// all convert; an `Arc<[T]>` is shared as-is without copying.
    ///
    /// Terminals hand each partition's elements to the chain by `clone`, so for
    /// large or expensive `T` prefer an `Arc<[T]>` of cheap handles (`Arc<U>`,
    /// indices) over owned values.
    pub fn from_indexable<S: Into<Arc<[T]>>>(source: S) -> Self {
        let items: Arc<[T]> = source.into();
        let len = items.len();
        Self::from_chain(len, Runner::default(), move |part, cancel, sink| {
            for x in &items[part.range()] {
                if cancel.is_cancelled() || !sink(x.clone())? {
                    return Ok(false);
                }
            }
            Ok(true)
        })
    }

    /// Take ownership of `items`.
    ///
    /// The elements are moved (not cloned) into a fresh `Arc<[T]>` buffer, which
    /// costs one allocation and copy. Use [`from_indexable`](Self::from_indexable)
    /// with an `Arc<[T]>` to share an existing buffer between streams instead.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_indexable(items)
    }

    /// Clone every element of `items` into a new shared buffer up front.
    pub fn from_slice(items: &[T]) -> Self {
        Self::from_indexable(items)
    }

    /// Drain an arbitrary iterable into a buffer first.
    ///
    /// Partitioning needs random access, so this pays one full materialization
    /// up front.
    pub fn from_iterable<I: IntoIterator<Item = T>>(source: I) -> Self {
        let buf: Vec<T> = source.into_iter().collect();
        debug!(len = buf.len(), "buffered iterable source for partitioning");
        Self::from_vec(buf)
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<T>> for ParStream<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Clone + Send + Sync + 'static> FromIterator<T> for ParStream<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iterable(iter)
    }
}

/* ===================== configuration ===================== */

impl<T> ParStream<T> {
    /// Number of elements in the underlying source (before any filtering).
    pub fn source_len(&self) -> usize {
        self.len
    }

    pub fn runner(&self) -> Runner {
        self.runner
    }

    #[must_use]
    pub fn with_runner(mut self, runner: Runner) -> Self {
        self.runner = runner;
        self
    }

    /// Run terminals as one partition on the calling thread.
    #[must_use]
    pub fn sequential(self) -> Self {
        self.with_runner(Runner::sequential())
    }

    #[must_use]
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        let threads = match self.runner.mode {
            ExecMode::Parallel { threads, .. } => threads,
            ExecMode::Sequential => None,
        };
        self.runner.mode = ExecMode::Parallel {
            threads,
            partitions: Some(partitions),
        };
        self
    }

    /// Run partition tasks on a dedicated pool of `threads` workers.
    ///
    /// The pool is built by the first terminal that asks for this worker count
    /// and reused by every later one.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        let partitions = match self.runner.mode {
            ExecMode::Parallel { partitions, .. } => partitions,
            ExecMode::Sequential => None,
        };
        self.runner.mode = ExecMode::Parallel {
            threads: Some(threads),
            partitions,
        };
        self
    }
}

/* ===================== fused combinators ===================== */

impl<T: 'static> ParStream<T> {
    fn from_chain<F>(len: usize, runner: Runner, chain: F) -> Self
    where
        F: Fn(Partition, &Cancellation, &mut Sink<'_, T>) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            len,
            chain: Arc::new(chain),
            runner,
        }
    }

    #[inline]
    pub(crate) fn drive(
        &self,
        part: Partition,
        cancel: &Cancellation,
        sink: &mut Sink<'_, T>,
    ) -> Result<bool> {
        (self.chain)(part, cancel, sink)
    }

    pub fn map<O, F>(self, f: F) -> ParStream<O>
    where
        O: 'static,
        F: Fn(T) -> O + Send + Sync + 'static,
    {
        let up = self.chain;
        ParStream::from_chain(self.len, self.runner, move |part, cancel, sink| {
            up(part, cancel, &mut |x| sink(f(x)))
        })
    }

    pub fn filter<P>(self, pred: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let up = self.chain;
        Self::from_chain(self.len, self.runner, move |part, cancel, sink| {
            up(part, cancel, &mut |x| if pred(&x) { sink(x) } else { Ok(true) })
        })
    }

    /// Splice the elements of a sequential inner [`Stream`] per element.
    ///
    /// Each inner stream is driven to completion before the next outer element,
    /// unless downstream stops (or the terminal is cancelled), which ends both
    /// loops at once.
    pub fn flat_map<O, F>(self, f: F) -> ParStream<O>
    where
        O: 'static,
        F: Fn(T) -> Stream<O> + Send + Sync + 'static,
    {
        let up = self.chain;
        ParStream::from_chain(self.len, self.runner, move |part, cancel, sink| {
            up(part, cancel, &mut |x| {
                let mut failure = None;
                let completed = f(x).run(&mut |y| {
                    if cancel.is_cancelled() {
                        return false;
                    }
                    match sink(y) {
                        Ok(more) => more,
                        Err(err) => {
                            failure = Some(err);
                            false
                        }
                    }
                });
                match failure {
                    Some(err) => Err(err),
                    None => Ok(completed),
                }
            })
        })
    }

    /// Fused `filter` + `map`: keep the `Some` results.
    pub fn choose<O, F>(self, f: F) -> ParStream<O>
    where
        O: 'static,
        F: Fn(T) -> Option<O> + Send + Sync + 'static,
    {
        let up = self.chain;
        ParStream::from_chain(self.len, self.runner, move |part, cancel, sink| {
            up(part, cancel, &mut |x| match f(x) {
                Some(y) => sink(y),
                None => Ok(true),
            })
        })
    }

    /// Like [`map`](Self::map), for functions that can fail.
    ///
    /// The first error stops every partition and is returned by the terminal.
    pub fn try_map<O, F>(self, f: F) -> ParStream<O>
    where
        O: 'static,
        F: Fn(T) -> Result<O> + Send + Sync + 'static,
    {
        let up = self.chain;
        ParStream::from_chain(self.len, self.runner, move |part, cancel, sink| {
            up(part, cancel, &mut |x| sink(f(x)?))
        })
    }

    pub fn try_filter<P>(self, pred: P) -> Self
    where
        P: Fn(&T) -> Result<bool> + Send + Sync + 'static,
    {
        let up = self.chain;
        Self::from_chain(self.len, self.runner, move |part, cancel, sink| {
            up(part, cancel, &mut |x| if pred(&x)? { sink(x) } else { Ok(true) })
        })
    }

    /// Observe each element as it flows past.
    pub fn inspect<F>(self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let up = self.chain;
        Self::from_chain(self.len, self.runner, move |part, cancel, sink| {
            up(part, cancel, &mut |x| {
                f(&x);
                sink(x)
            })
        })
    }
}

/* ===================== collecting terminals ===================== */

impl<T: Send + 'static> ParStream<T> {
    /// Run the chain and collect every element, in source order.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let parts = self.runner.fork_join("to_vec", self.len, |part, cancel| {
            let mut out = Vec::with_capacity(part.len());
            self.drive(part, cancel, &mut |x| {
                out.push(x);
                Ok(true)
            })?;
            Ok(out)
        })?;
        Ok(parts.into_iter().flatten().collect())
    }

    /// Run `f` on every element, concurrently across partitions.
    pub fn for_each<F>(&self, f: F) -> Result<()>
    where
        F: Fn(T) + Send + Sync,
    {
        self.runner.fork_join("for_each", self.len, |part, cancel| {
            self.drive(part, cancel, &mut |x| {
                f(x);
                Ok(true)
            })?;
            Ok(())
        })?;
        Ok(())
    }
}

impl<T: Clone + Send + Sync + 'static> ParStream<T> {
    /// Materialize the results into a re-runnable sequential [`Stream`].
    pub fn to_stream(&self) -> Result<Stream<T>> {
        Ok(Stream::from_vec(self.to_vec()?))
    }
}
