//! Contiguous index ranges handed to partition tasks.
//!
//! [`split`] divides `[0, len)` into `n` slices whose sizes differ by at most
//! one element, preserving source order across slice indices.

use std::ops::Range;

/// A contiguous `[start, end)` range of the source, owned by one task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Partition {
    /// Position of this slice among its siblings (0-based, in source order).
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Partition {
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `[0, len)` into `min(n, len)` near-equal contiguous partitions.
///
/// The first `len % n` partitions receive one extra element. An empty source
/// yields a single empty partition so every terminal still runs exactly one
/// task and produces its neutral result.
pub fn split(len: usize, n: usize) -> Vec<Partition> {
    let n = n.max(1).min(len.max(1));
    let base = len / n;
    let extra = len % n;

    let mut out = Vec::with_capacity(n);
    let mut start = 0;
    for index in 0..n {
        let size = base + usize::from(index < extra);
        out.push(Partition { index, start, end: start + size });
        start += size;
    }
    out
}
