//! Grouping engine: per-partition hash grouping plus an ordered merge.
//!
//! Each partition builds its own key table, appending elements in the order it
//! sees them. The calling thread then folds the partition tables together in
//! partition order, so a key's elements end up in source order and keys are
//! listed in order of first appearance.

use crate::ParStream;
use anyhow::Result;
use std::collections::HashMap;
use std::hash::Hash;

/// Insertion-ordered key table: `index` maps a key to its slot in `slots`.
pub(crate) struct KeyedSlots<K, A> {
    index: HashMap<K, usize>,
    slots: Vec<(K, A)>,
}

impl<K: Eq + Hash + Clone, A: Default> KeyedSlots<K, A> {
    pub(crate) fn new() -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
        }
    }

    pub(crate) fn slot(&mut self, key: K) -> &mut A {
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.slots.len();
                self.index.insert(key.clone(), i);
                self.slots.push((key, A::default()));
                i
            }
        };
        &mut self.slots[i].1
    }

    /// Fold a later partition's table into this one.
    pub(crate) fn absorb<M: Fn(&mut A, A)>(&mut self, other: Self, merge: M) {
        for (key, acc) in other.slots {
            merge(self.slot(key), acc);
        }
    }

    pub(crate) fn into_vec(self) -> Vec<(K, A)> {
        self.slots
    }
}

/// Run one task per partition, each filling a [`KeyedSlots`], then merge the
/// tables in partition order.
fn group_into<T, K, A, F, P, M>(
    stream: &ParStream<T>,
    op: &'static str,
    key: F,
    add: P,
    merge: M,
) -> Result<Vec<(K, A)>>
where
    T: Send + 'static,
    K: Eq + Hash + Clone + Send,
    A: Default + Send,
    F: Fn(&T) -> K + Sync,
    P: Fn(&mut A, T) + Sync,
    M: Fn(&mut A, A),
{
    let tables = stream
        .runner()
        .fork_join(op, stream.source_len(), |part, cancel| {
            let mut table = KeyedSlots::new();
            stream.drive(part, cancel, &mut |x| {
                add(table.slot(key(&x)), x);
                Ok(true)
            })?;
            Ok(table)
        })?;

    let mut tables = tables.into_iter();
    let mut merged = tables.next().unwrap_or_else(KeyedSlots::new);
    for table in tables {
        merged.absorb(table, &merge);
    }
    Ok(merged.into_vec())
}

impl<T: Clone + Send + Sync + 'static> ParStream<T> {
    /// Group elements by `key`.
    ///
    /// Each group is fully materialized, so it can be read any number of times.
    /// Within a group elements keep their source order, and groups are listed
    /// by first appearance of their key.
    ///
    /// ```
    /// use ironstream::ParStream;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let groups = ParStream::from_vec((1..=6).collect::<Vec<u32>>())
    ///     .group_by(|x| x % 3)?
    ///     .to_vec()?;
    /// assert_eq!(groups, vec![(1, vec![1, 4]), (2, vec![2, 5]), (0, vec![3, 6])]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn group_by<K, F>(&self, key: F) -> Result<ParStream<(K, Vec<T>)>>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        F: Fn(&T) -> K + Sync,
    {
        let groups = group_into(
            self,
            "group_by",
            key,
            |group: &mut Vec<T>, x| group.push(x),
            |group: &mut Vec<T>, later: Vec<T>| group.extend(later),
        )?;
        Ok(ParStream::from_vec(groups).with_runner(self.runner()))
    }
}

impl<T: Send + 'static> ParStream<T> {
    /// Number of elements per key, listed by first appearance of each key.
    pub fn count_by<K, F>(&self, key: F) -> Result<Vec<(K, usize)>>
    where
        K: Eq + Hash + Clone + Send,
        F: Fn(&T) -> K + Sync,
    {
        group_into(
            self,
            "count_by",
            key,
            |n: &mut usize, _| *n += 1,
            |n: &mut usize, later: usize| *n += later,
        )
    }
}
