//! Sequential, push-based streams.
//!
//! A [`Stream<T>`] is a reusable description of "how to drive a continuation over
//! some `T` values". The continuation is a plain `FnMut(T) -> bool`: returning
//! `false` tells the producer to stop, and no further element is delivered after
//! that.
//!
//! Combinators wrap the continuation instead of allocating intermediate buffers,
//! so a `map → filter → flat_map` chain runs as one loop over the source. Nothing
//! executes until a terminal such as [`Stream::to_vec`] or [`Stream::fold`] is
//! called, and each terminal re-runs the whole chain from the source.
//!
//! ```
//! use ironstream::Stream;
//!
//! let s = Stream::range(1..11)
//!     .map(|x: i64| x * x)
//!     .filter(|x: &i64| x % 2 == 0);
//! assert_eq!(s.to_vec(), vec![4, 16, 36, 64, 100]);
//! assert_eq!(s.sum(), 220);
//! ```
//!
//! `Stream` is also what [`ParStream::flat_map`](crate::ParStream::flat_map)
//! expects its function to return.

use std::ops::{Add, Range};
use std::sync::Arc;

/// A downstream consumer: return `false` to stop the producer.
pub type Continuation<'a, T> = dyn FnMut(T) -> bool + 'a;

/// Drive a continuation; returns `false` iff the continuation asked to stop.
type Run<T> = dyn Fn(&mut Continuation<'_, T>) -> bool + Send + Sync;

/// Lazy, single-threaded, re-runnable producer of `T` values.
pub struct Stream<T> {
    run: Arc<Run<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T: 'static> Stream<T> {
    fn from_run<F>(run: F) -> Self
    where
        F: Fn(&mut Continuation<'_, T>) -> bool + Send + Sync + 'static,
    {
        Self { run: Arc::new(run) }
    }

    /// A stream with no elements.
    pub fn empty() -> Self {
        Self::from_run(|_k: &mut Continuation<'_, T>| true)
    }

    /// Re-run `factory` on every consumption and push what its iterator yields.
    pub fn from_fn<I, F>(factory: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn() -> I + Send + Sync + 'static,
    {
        Self::from_run(move |k: &mut Continuation<'_, T>| {
            for x in factory() {
                if !k(x) {
                    return false;
                }
            }
            true
        })
    }

    /// Drive `k` over every element until it returns `false`.
    ///
    /// Returns `false` when the consumer stopped the stream, `true` when the
    /// source ran out first.
    pub fn run(&self, k: &mut Continuation<'_, T>) -> bool {
        (self.run)(k)
    }

    pub fn map<O, F>(self, f: F) -> Stream<O>
    where
        O: 'static,
        F: Fn(T) -> O + Send + Sync + 'static,
    {
        let up = self.run;
        Stream::from_run(move |k: &mut Continuation<'_, O>| up(&mut |x| k(f(x))))
    }

    pub fn filter<P>(self, pred: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let up = self.run;
        Self::from_run(move |k: &mut Continuation<'_, T>| {
            up(&mut |x| if pred(&x) { k(x) } else { true })
        })
    }

    /// Replace each element by an inner stream and splice its elements in.
    ///
    /// A stop from downstream ends the inner and the outer loop at once.
    pub fn flat_map<O, F>(self, f: F) -> Stream<O>
    where
        O: 'static,
        F: Fn(T) -> Stream<O> + Send + Sync + 'static,
    {
        let up = self.run;
        Stream::from_run(move |k: &mut Continuation<'_, O>| up(&mut |x| f(x).run(&mut *k)))
    }

    /// Deliver at most `n` elements, then stop the upstream producer.
    ///
    /// Reaching the quota is not a downstream stop: inside a `flat_map`, the outer
    /// loop keeps going.
    pub fn take(self, n: usize) -> Self {
        let up = self.run;
        Self::from_run(move |k: &mut Continuation<'_, T>| {
            if n == 0 {
                return true;
            }
            let mut delivered = 0;
            let mut stopped = false;
            up(&mut |x| {
                delivered += 1;
                if !k(x) {
                    stopped = true;
                    return false;
                }
                delivered < n
            });
            !stopped
        })
    }

    /// Deliver elements while `pred` holds.
    pub fn take_while<P>(self, pred: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let up = self.run;
        Self::from_run(move |k: &mut Continuation<'_, T>| {
            let mut stopped = false;
            up(&mut |x| {
                if !pred(&x) {
                    return false;
                }
                if !k(x) {
                    stopped = true;
                    return false;
                }
                true
            });
            !stopped
        })
    }

    pub fn for_each<F: FnMut(T)>(&self, mut f: F) {
        self.run(&mut |x| {
            f(x);
            true
        });
    }

    pub fn fold<A, F>(&self, init: A, mut folder: F) -> A
    where
        F: FnMut(A, T) -> A,
    {
        let mut acc = Some(init);
        self.run(&mut |x| {
            acc = acc.take().map(|a| folder(a, x));
            true
        });
        // `acc` is only ever `None` while `folder` is running.
        acc.unwrap_or_else(|| unreachable!("fold accumulator is restored after every step"))
    }

    pub fn sum(&self) -> T
    where
        T: Add<Output = T> + Default,
    {
        self.fold(T::default(), |a, x| a + x)
    }

    pub fn count(&self) -> usize {
        self.fold(0, |n, _| n + 1)
    }

    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::new();
        self.for_each(|x| out.push(x));
        out
    }

    /// First element matching `pred`; stops the producer on the match.
    pub fn find<P: FnMut(&T) -> bool>(&self, mut pred: P) -> Option<T> {
        let mut found = None;
        self.run(&mut |x| {
            if pred(&x) {
                found = Some(x);
                false
            } else {
                true
            }
        });
        found
    }

    pub fn any<P: FnMut(&T) -> bool>(&self, mut pred: P) -> bool {
        !self.run(&mut |x| !pred(&x))
    }

    pub fn all<P: FnMut(&T) -> bool>(&self, mut pred: P) -> bool {
        self.run(&mut |x| pred(&x))
    }
}

impl<T: Clone + Send + Sync + 'static> Stream<T> {
    /// Stream over an owned vector; the buffer is shared across runs.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::from_shared(Arc::from(items))
    }

    pub fn from_slice(items: &[T]) -> Self {
        Self::from_shared(Arc::from(items))
    }

    pub(crate) fn from_shared(items: Arc<[T]>) -> Self {
        Self::from_run(move |k: &mut Continuation<'_, T>| {
            for x in items.iter() {
                if !k(x.clone()) {
                    return false;
                }
            }
            true
        })
    }

    pub fn once(item: T) -> Self {
        Self::from_run(move |k: &mut Continuation<'_, T>| k(item.clone()))
    }
}

impl<T> Stream<T>
where
    T: Clone + Send + Sync + 'static,
    Range<T>: Iterator<Item = T>,
{
    /// Half-open numeric range, re-iterated on every run.
    pub fn range(r: Range<T>) -> Self {
        Self::from_fn(move || r.clone())
    }
}

impl<T: Clone + Send + Sync + 'static> From<Vec<T>> for Stream<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}
