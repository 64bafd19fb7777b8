//! Sum, Count, Min and Max.

use super::CombineFn;
use std::marker::PhantomData;
use std::mem::take;
use std::ops::Add;

/// Total of all values; `T::default()` when there are none.
///
/// Overflow behaves like `+` on `T`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sum<T>(PhantomData<fn(T) -> T>);

impl<T> Sum<T> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, T, T> for Sum<T>
where
    T: Add<Output = T> + Default + 'static,
{
    fn create(&self) -> T {
        T::default()
    }

    fn add_input(&self, total: &mut T, v: T) {
        *total = take(total) + v;
    }

    fn merge(&self, total: &mut T, later: T) {
        self.add_input(total, later);
    }

    fn finish(&self, total: T) -> T {
        total
    }
}

/// Number of values, whatever their type.
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<V> CombineFn<V, usize, usize> for Count {
    fn create(&self) -> usize {
        0
    }

    fn add_input(&self, n: &mut usize, _v: V) {
        *n += 1;
    }

    fn merge(&self, n: &mut usize, later: usize) {
        *n += later;
    }

    fn finish(&self, n: usize) -> usize {
        n
    }
}

/// Store `v` in `slot` if the slot is empty or `beats(&v, current)` holds.
///
/// Partition accumulators are merged in source order, so `v` is always the
/// later of the two candidates.
fn keep<T>(slot: &mut Option<T>, v: T, beats: fn(&T, &T) -> bool) {
    if slot.as_ref().is_none_or(|current| beats(&v, current)) {
        *slot = Some(v);
    }
}

/// Smallest value; the earliest one among equal minima. `None` for empty input.
#[derive(Clone, Copy, Debug, Default)]
pub struct Min<T>(PhantomData<fn(T) -> T>);

impl<T> Min<T> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

/// Largest value; the latest one among equal maxima. `None` for empty input.
#[derive(Clone, Copy, Debug, Default)]
pub struct Max<T>(PhantomData<fn(T) -> T>);

impl<T> Max<T> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Ord + 'static> CombineFn<T, Option<T>, Option<T>> for Min<T> {
    fn create(&self) -> Option<T> {
        None
    }

    fn add_input(&self, best: &mut Option<T>, v: T) {
        keep(best, v, |v, current| v < current);
    }

    fn merge(&self, best: &mut Option<T>, later: Option<T>) {
        if let Some(v) = later {
            self.add_input(best, v);
        }
    }

    fn finish(&self, best: Option<T>) -> Option<T> {
        best
    }
}

impl<T: Ord + 'static> CombineFn<T, Option<T>, Option<T>> for Max<T> {
    fn create(&self) -> Option<T> {
        None
    }

    fn add_input(&self, best: &mut Option<T>, v: T) {
        keep(best, v, |v, current| v >= current);
    }

    fn merge(&self, best: &mut Option<T>, later: Option<T>) {
        if let Some(v) = later {
            self.add_input(best, v);
        }
    }

    fn finish(&self, best: Option<T>) -> Option<T> {
        best
    }
}
