//! Reusable reduction algebras for [`ParStream::combine`](crate::ParStream::combine).
//!
//! A [`CombineFn<V, A, O>`] is the named form of the state/folder/combiner triple
//! used by every parallel reduction:
//!
//! - `create` -- a fresh accumulator for one partition (never shared between tasks);
//! - `add_input` -- fold one element into the partition's accumulator, in source order;
//! - `merge` -- combine two partition accumulators. **Must be associative**: partition
//!   results may be merged in any grouping;
//! - `finish` -- turn the merged accumulator into the output.
//!
//! Built-ins:
//!
//! - [`Sum<T>`] -- sum of values.
//! - [`Count`] -- number of values.
//! - [`Min<T>`] / [`Max<T>`] -- extreme value (`None` for empty input).
//! - [`AverageF64`] -- mean as `f64` (`None` for empty input).
//!
//! # Examples
//! ```
//! use ironstream::ParStream;
//! use ironstream::combiners::{Count, Max, Sum};
//!
//! # fn main() -> anyhow::Result<()> {
//! let s = ParStream::from_vec(vec![3u64, 9, 4]);
//! assert_eq!(s.combine(Sum::<u64>::new())?, 16);
//! assert_eq!(s.combine(Count)?, 3);
//! assert_eq!(s.combine(Max::<u64>::new())?, Some(9));
//! # Ok(())
//! # }
//! ```

mod basic;
mod statistical;

pub use basic::{Count, Max, Min, Sum};
pub use statistical::{AverageF64, MeanAcc};

/// A parallel reduction over values `V` with accumulator `A` and output `O`.
pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    fn create(&self) -> A;
    fn add_input(&self, acc: &mut A, v: V);
    fn merge(&self, acc: &mut A, other: A);
    fn finish(&self, acc: A) -> O;
}
