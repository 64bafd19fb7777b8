//! # Ironstream
//!
//! A **fused stream engine** for in-memory collections. Ironstream composes
//! `map`/`filter`/`flat_map` pipelines lazily, without intermediate buffers, and
//! runs them either sequentially or partitioned across a fork/join thread pool.
//!
//! ## Key Features
//!
//! - **Lazy fusion** - combinators wrap a continuation; each terminal runs one loop per partition
//! - **Partitioned parallelism** - contiguous, near-equal slices executed on rayon workers
//! - **Associative reductions** - `fold`, `sum`, `count`, `reduce`, and reusable [`CombineFn`] algebras
//! - **Ordering and grouping** - per-partition sort + k-way merge, per-partition hash grouping + merge
//! - **Short-circuit search** - `any`, `all`, `find_any` cancel sibling partitions cooperatively
//! - **Error propagation** - the first failing user function cancels the rest and is returned
//!
//! ## Quick Start
//!
//! ```
//! use ironstream::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let source = ParStream::from_vec((1..=10).collect::<Vec<i64>>());
//!
//! let total = source
//!     .clone()
//!     .map(|x| x * x)
//!     .filter(|x| x % 2 == 0)
//!     .sum()?;
//! assert_eq!(total, 220);
//!
//! // Every terminal re-runs the chain from the source.
//! assert!(source.any(|x| *x == 7)?);
//! assert_eq!(source.first(|x| *x > 3)?, 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Stream
//!
//! A [`Stream<T>`] is a sequential, push-based producer: it drives a continuation
//! `FnMut(T) -> bool` over its elements and stops as soon as the continuation
//! returns `false`. Streams are re-runnable descriptors, and they are what
//! [`ParStream::flat_map`] expects its function to return.
//!
//! ### ParStream
//!
//! A [`ParStream<T>`] is a source plus a deferred chain of fused steps. Building
//! one never runs anything; a terminal splits the source with the partitioner,
//! runs one task per partition through the [`Runner`], and merges the partition
//! results:
//!
//! - **Aggregation** - [`fold`](ParStream::fold), [`combine`](ParStream::combine),
//!   [`sum`](ParStream::sum), [`count`](ParStream::count), [`reduce`](ParStream::reduce)
//! - **Ordering** - [`order_by`](ParStream::order_by) and variants
//! - **Grouping** - [`group_by`](ParStream::group_by), [`count_by`](ParStream::count_by)
//! - **Search** - [`first`](ParStream::first), [`find_any`](ParStream::find_any),
//!   [`any`](ParStream::any), [`all`](ParStream::all)
//! - **Collection** - [`to_vec`](ParStream::to_vec), [`to_stream`](ParStream::to_stream),
//!   [`for_each`](ParStream::for_each)
//!
//! ### Execution Modes
//!
//! - **Sequential** - [`ParStream::sequential`]: one partition on the calling thread
//! - **Parallel** - the default; [`ParStream::with_partitions`] and
//!   [`ParStream::with_threads`] tune partition count and pool size
//!
//! ### Errors
//!
//! Terminals return [`anyhow::Result`]. Engine failures are [`StreamError`]
//! values (`NotFound`, `InvalidOperation`); errors returned from
//! [`try_map`](ParStream::try_map) / [`try_filter`](ParStream::try_filter)
//! closures come back to the caller unchanged.
//!
//! ## Module Overview
//!
//! - [`stream`] - sequential `Stream` and the continuation protocol
//! - [`par_stream`] - `ParStream` construction, configuration and fused combinators
//! - [`partition`] - splitting sources into contiguous ranges
//! - [`runner`] - execution modes and the fork/join executor
//! - [`cancel`] - cooperative cancellation signal
//! - [`combiners`] - reusable reduction algebras
//! - [`error`] - engine error kinds
//! - [`testing`] - assertion helpers for tests

pub mod aggregate;
pub mod cancel;
pub mod combiners;
pub mod error;
pub mod grouping;
pub mod ordering;
pub mod par_stream;
pub mod partition;
pub mod runner;
pub mod search;
pub mod stream;
pub mod testing;

pub use cancel::Cancellation;
pub use combiners::{AverageF64, CombineFn, Count, Max, Min, Sum};
pub use error::StreamError;
pub use par_stream::ParStream;
pub use partition::Partition;
pub use runner::{ExecMode, Runner};
pub use stream::{Continuation, Stream};
