//! Mean over `f64`-convertible values.

use super::CombineFn;

/// Running mean state: a Neumaier-compensated sum plus an element count.
///
/// Compensation keeps the rounding error of the partial sums small, so the
/// mean barely moves when the same input is split into a different number of
/// partitions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeanAcc {
    sum: f64,
    carry: f64,
    count: u64,
}

impl MeanAcc {
    fn push(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.carry += (self.sum - t) + x;
        } else {
            self.carry += (x - t) + self.sum;
        }
        self.sum = t;
    }

    /// Number of values folded in so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Arithmetic mean as `f64`; `None` when no value was seen.
#[derive(Clone, Copy, Debug, Default)]
pub struct AverageF64;

impl<V: Into<f64>> CombineFn<V, MeanAcc, Option<f64>> for AverageF64 {
    fn create(&self) -> MeanAcc {
        MeanAcc::default()
    }

    fn add_input(&self, acc: &mut MeanAcc, v: V) {
        acc.push(v.into());
        acc.count += 1;
    }

    fn merge(&self, acc: &mut MeanAcc, other: MeanAcc) {
        acc.push(other.sum);
        acc.carry += other.carry;
        acc.count += other.count;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: MeanAcc) -> Option<f64> {
        (acc.count > 0).then(|| (acc.sum + acc.carry) / acc.count as f64)
    }
}
