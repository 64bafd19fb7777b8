//! Ordering engine: per-partition sort followed by a k-way merge.
//!
//! Sorting is a barrier. Every partition materializes `(key, element)` pairs and
//! sorts them locally; the calling thread then merges the sorted runs through a
//! min-heap into one globally ordered buffer, which becomes the source of a new
//! [`ParStream`].
//!
//! # Ties
//! Local sorts are stable and the merge breaks key ties by the lowest partition
//! index. Partitions are contiguous slices of the source, so elements with equal
//! keys keep their source order.

use crate::ParStream;
use anyhow::Result;
use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

impl<T: Clone + Send + Sync + 'static> ParStream<T> {
    /// Order elements by ascending `key`.
    ///
    /// Runs the chain immediately and returns a materialized stream carrying the
    /// same runner, so further combinators and terminals can follow.
    ///
    /// ```
    /// use ironstream::ParStream;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let words = ParStream::from_vec(vec!["pear", "fig", "banana", "kiwi"])
    ///     .with_partitions(2)
    ///     .order_by(|w| w.len())?
    ///     .to_vec()?;
    /// assert_eq!(words, vec!["fig", "pear", "kiwi", "banana"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn order_by<K, F>(&self, key: F) -> Result<ParStream<T>>
    where
        K: Ord + Send,
        F: Fn(&T) -> K + Send + Sync,
    {
        let runs = self
            .runner()
            .fork_join("order_by", self.source_len(), |part, cancel| {
                let mut run: Vec<(K, T)> = Vec::with_capacity(part.len());
                self.drive(part, cancel, &mut |x| {
                    run.push((key(&x), x));
                    Ok(true)
                })?;
                run.sort_by(|a, b| a.0.cmp(&b.0));
                Ok(run)
            })?;
        Ok(ParStream::from_vec(merge_sorted_runs(runs)).with_runner(self.runner()))
    }

    /// Order elements by descending `key`.
    pub fn order_by_descending<K, F>(&self, key: F) -> Result<ParStream<T>>
    where
        K: Ord + Send,
        F: Fn(&T) -> K + Send + Sync,
    {
        self.order_by(|x| Reverse(key(x)))
    }

    /// Order by an `f64` key under IEEE total order, with NaN sorting last.
    pub fn order_by_float<F>(&self, key: F) -> Result<ParStream<T>>
    where
        F: Fn(&T) -> f64 + Send + Sync,
    {
        self.order_by(|x| OrderedFloat(key(x)))
    }
}

/// Heap entry: the key at the head of one sorted run.
struct Head<K> {
    key: K,
    run: usize,
}

impl<K: Ord> Ord for Head<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.run.cmp(&other.run))
    }
}

impl<K: Ord> PartialOrd for Head<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> PartialEq for Head<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for Head<K> {}

/// Merge runs that are each sorted by key into one sorted vector.
///
/// Equal keys are emitted in run order.
pub(crate) fn merge_sorted_runs<K: Ord, T>(runs: Vec<Vec<(K, T)>>) -> Vec<T> {
    let total = runs.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(total);

    if runs.len() == 1 {
        out.extend(runs.into_iter().flatten().map(|(_, x)| x));
        return out;
    }

    let mut cursors: Vec<_> = runs.into_iter().map(Vec::into_iter).collect();
    let mut pending: Vec<Option<T>> = cursors.iter().map(|_| None).collect();
    let mut heap = BinaryHeap::with_capacity(cursors.len());

    for (run, cursor) in cursors.iter_mut().enumerate() {
        if let Some((key, x)) = cursor.next() {
            pending[run] = Some(x);
            heap.push(Reverse(Head { key, run }));
        }
    }

    while let Some(Reverse(Head { run, .. })) = heap.pop() {
        out.extend(pending[run].take());
        if let Some((key, x)) = cursors[run].next() {
            pending[run] = Some(x);
            heap.push(Reverse(Head { key, run }));
        }
    }
    out
}
