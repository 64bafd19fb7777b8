//! Parallel reductions: fold, combine, sum, count and friends.
//!
//! Every reduction follows the same two-phase shape. Each partition starts from
//! a fresh seed and folds its own elements in source order; the calling thread
//! then merges the partition accumulators pairwise, in partition order. The
//! merge function must be associative for results to be independent of the
//! partition count.

use crate::ParStream;
use crate::combiners::{AverageF64, CombineFn, Count, Max, Min, Sum};
use crate::error::StreamError;
use anyhow::{Result, anyhow};
use std::ops::Add;

impl<T: Send + 'static> ParStream<T> {
    /// Generic parallel fold.
    ///
    /// - `state` builds one seed per partition;
    /// - `folder` updates a partition's accumulator with one element;
    /// - `combiner` merges two partition accumulators and must be associative.
    ///
    /// ```
    /// use ironstream::ParStream;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let longest = ParStream::from_vec(vec!["a", "abc", "ab"])
    ///     .fold(|| 0usize, |m, s| m.max(s.len()), usize::max)?;
    /// assert_eq!(longest, 3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn fold<A, S, F, C>(&self, state: S, folder: F, combiner: C) -> Result<A>
    where
        A: Send,
        S: Fn() -> A + Sync,
        F: Fn(A, T) -> A + Sync,
        C: Fn(A, A) -> A,
    {
        let accs = self.runner().fork_join("fold", self.source_len(), |part, cancel| {
            let mut acc = Some(state());
            self.drive(part, cancel, &mut |x| {
                acc = acc.take().map(|a| folder(a, x));
                Ok(true)
            })?;
            acc.ok_or_else(|| anyhow!("fold: accumulator lost in partition {}", part.index))
        })?;
        accs.into_iter()
            .reduce(combiner)
            .ok_or_else(|| anyhow!("fold: no partition produced an accumulator"))
    }

    /// Reduce with a [`CombineFn`].
    pub fn combine<C, A, O>(&self, comb: C) -> Result<O>
    where
        C: CombineFn<T, A, O>,
        A: Send,
    {
        let acc = self.fold(
            || comb.create(),
            |mut acc, x| {
                comb.add_input(&mut acc, x);
                acc
            },
            |mut a, b| {
                comb.merge(&mut a, b);
                a
            },
        )?;
        Ok(comb.finish(acc))
    }

    /// Sum of all elements; `T::default()` for an empty stream.
    pub fn sum(&self) -> Result<T>
    where
        T: Add<Output = T> + Default,
    {
        self.combine(Sum::<T>::new())
    }

    pub fn count(&self) -> Result<usize> {
        self.combine(Count)
    }

    /// Fold without a seed. Fails with [`StreamError::InvalidOperation`] when empty.
    pub fn reduce<F>(&self, f: F) -> Result<T>
    where
        F: Fn(T, T) -> T + Sync,
    {
        let merge = |a: Option<T>, b: Option<T>| match (a, b) {
            (Some(a), Some(b)) => Some(f(a, b)),
            (a, None) => a,
            (None, b) => b,
        };
        self.fold(|| None, |acc, x| merge(acc, Some(x)), &merge)?
            .ok_or_else(|| StreamError::empty("reduce").into())
    }

    pub fn min(&self) -> Result<T>
    where
        T: Ord,
    {
        self.combine(Min::<T>::new())?
            .ok_or_else(|| StreamError::empty("min").into())
    }

    pub fn max(&self) -> Result<T>
    where
        T: Ord,
    {
        self.combine(Max::<T>::new())?
            .ok_or_else(|| StreamError::empty("max").into())
    }

    /// Element with the smallest key; the earliest one on ties.
    pub fn min_by_key<K, F>(&self, key: F) -> Result<T>
    where
        K: Ord + Send,
        F: Fn(&T) -> K + Sync,
    {
        self.extreme_by_key("min_by_key", key, |candidate, current| candidate < current)
    }

    /// Element with the largest key; the latest one on ties.
    pub fn max_by_key<K, F>(&self, key: F) -> Result<T>
    where
        K: Ord + Send,
        F: Fn(&T) -> K + Sync,
    {
        self.extreme_by_key("max_by_key", key, |candidate, current| candidate >= current)
    }

    /// Arithmetic mean as `f64`. Fails with [`StreamError::InvalidOperation`] when empty.
    pub fn average(&self) -> Result<f64>
    where
        T: Into<f64>,
    {
        self.combine(AverageF64)?
            .ok_or_else(|| StreamError::empty("average").into())
    }

    /// `replaces(candidate, current)` decides whether a later element wins.
    fn extreme_by_key<K, F, W>(&self, op: &str, key: F, replaces: W) -> Result<T>
    where
        K: Ord + Send,
        F: Fn(&T) -> K + Sync,
        W: Fn(&K, &K) -> bool + Sync,
    {
        let pick = |a: Option<(K, T)>, b: Option<(K, T)>| match (a, b) {
            (Some(a), Some(b)) => Some(if replaces(&b.0, &a.0) { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        };
        self.fold(
            || None,
            |acc, x| {
                let k = key(&x);
                pick(acc, Some((k, x)))
            },
            &pick,
        )?
        .map(|(_, x)| x)
        .ok_or_else(|| StreamError::empty(op).into())
    }
}
