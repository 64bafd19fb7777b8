//! Execution configuration and the fork/join executor.
//!
//! A [`Runner`] decides how many partitions a terminal uses and where their
//! tasks run:
//!
//! - [`ExecMode::Sequential`] -- one partition, executed inline on the caller's thread.
//! - [`ExecMode::Parallel`] -- one rayon task per partition, on the global pool or on a
//!   dedicated pool when `threads` is set.
//!
//! Both derive `serde` traits, so runner settings can live in application config:
//!
//! ```
//! use ironstream::runner::{ExecMode, Runner};
//!
//! let r = Runner { mode: ExecMode::Parallel { threads: None, partitions: Some(4) }, ..Runner::default() };
//! assert_eq!(r.partition_count(100), 4);
//! assert_eq!(r.partition_count(3), 3);
//! assert_eq!(Runner::sequential().partition_count(100), 1);
//! ```

use crate::cancel::Cancellation;
use crate::partition::{self, Partition};
use anyhow::{Result, anyhow};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecMode {
    Sequential,
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    pub mode: ExecMode,
    /// Partition count used when `ExecMode::Parallel` does not name one.
    pub default_partitions: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: None,
            },
            default_partitions: num_cpus::get().max(1),
        }
    }
}

impl Runner {
    /// Single partition on the calling thread.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            mode: ExecMode::Sequential,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn parallel(threads: Option<usize>, partitions: Option<usize>) -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads,
                partitions,
            },
            ..Self::default()
        }
    }

    /// `min(len, parallelism)`, never below one.
    pub fn partition_count(&self, len: usize) -> usize {
        let wanted = match self.mode {
            ExecMode::Sequential => 1,
            ExecMode::Parallel { partitions, .. } => {
                partitions.unwrap_or(self.default_partitions)
            }
        };
        wanted.max(1).min(len.max(1))
    }

    /// Split `[0, len)` per [`Runner::partition_count`] and run `task` once per slice.
    ///
    /// Results come back in partition order. A task that returns `Err` raises the
    /// shared [`Cancellation`] so siblings can stop early; after the join the first
    /// recorded error is returned. A panicking task also raises the flag before
    /// rayon resumes the panic on the caller.
    pub fn fork_join<R, F>(&self, op: &'static str, len: usize, task: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(Partition, &Cancellation) -> Result<R> + Send + Sync,
    {
        let parts = partition::split(len, self.partition_count(len));
        debug!(op, len, partitions = parts.len(), mode = ?self.mode, "dispatching terminal");

        let cancel = Cancellation::new();
        let run_one = |part: Partition| -> Option<R> {
            let _guard = cancel.on_unwind();
            trace!(op, partition = part.index, start = part.start, end = part.end, "partition started");
            match task(part, &cancel) {
                Ok(r) => Some(r),
                Err(err) => {
                    debug!(op, partition = part.index, error = %err, "partition failed");
                    cancel.fail(err);
                    None
                }
            }
        };

        let results: Vec<Option<R>> = match self.mode {
            ExecMode::Sequential => parts.into_iter().map(run_one).collect(),
            ExecMode::Parallel {
                threads: Some(t), ..
            } => {
                let pool = dedicated_pool(t)?;
                pool.install(|| parts.into_par_iter().map(run_one).collect())
            }
            ExecMode::Parallel { threads: None, .. } => {
                parts.into_par_iter().map(run_one).collect()
            }
        };

        if let Some(err) = cancel.into_error() {
            return Err(err);
        }
        results
            .into_iter()
            .collect::<Option<Vec<R>>>()
            .ok_or_else(|| anyhow!("{op}: partition task ended without a result"))
    }
}

/// Dedicated pool with `threads` workers.
///
/// Pools are built on first use and kept for the life of the process, one per
/// distinct worker count, so repeated terminals reuse the same workers.
pub(crate) fn dedicated_pool(threads: usize) -> Result<Arc<ThreadPool>> {
    static POOLS: OnceLock<Mutex<HashMap<usize, Arc<ThreadPool>>>> = OnceLock::new();

    let mut pools = POOLS
        .get_or_init(Mutex::default)
        .lock()
        .map_err(|_| anyhow!("thread pool registry lock poisoned"))?;
    if let Some(pool) = pools.get(&threads) {
        return Ok(Arc::clone(pool));
    }

    let pool = Arc::new(
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(move |i| format!("ironstream-{threads}x-{i}"))
            .build()?,
    );
    debug!(threads, "built dedicated thread pool");
    pools.insert(threads, Arc::clone(&pool));
    Ok(pool)
}
