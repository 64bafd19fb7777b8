//! Assertion helpers for testing stream outputs.
//!
//! Parallel terminals guarantee different things about order: `to_vec` keeps
//! source order, `order_by` guarantees non-decreasing keys, and most other
//! results are best compared as multisets. These helpers cover those cases with
//! readable failure messages.
//!
//! ```
//! use ironstream::ParStream;
//! use ironstream::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let out = ParStream::from_vec(vec![5, 3, 9, 1]).order_by(|x| *x)?.to_vec()?;
//! assert_sorted_by_key(&out, |x| *x);
//! assert_same_multiset(&out, &[1, 3, 5, 9]);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}"
        );
    }
}

/// Assert that two collections hold the same elements with the same
/// multiplicities, ignoring order.
///
/// # Panics
///
/// Panics if any element occurs a different number of times.
pub fn assert_same_multiset<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    let mut counts: HashMap<&T, isize> = HashMap::new();
    for x in actual {
        *counts.entry(x).or_default() += 1;
    }
    for x in expected {
        *counts.entry(x).or_default() -= 1;
    }

    let extra: Vec<_> = counts.iter().filter(|(_, n)| **n > 0).collect();
    let missing: Vec<_> = counts.iter().filter(|(_, n)| **n < 0).collect();
    assert!(
        extra.is_empty() && missing.is_empty(),
        "Multiset mismatch:\n  Extra (element, surplus): {extra:?}\n  Missing (element, -deficit): {missing:?}"
    );
}

/// Assert that keys are non-decreasing along the collection.
///
/// # Panics
///
/// Panics at the first adjacent pair whose keys are out of order.
pub fn assert_sorted_by_key<T: Debug, K: Ord + Debug>(collection: &[T], key: impl Fn(&T) -> K) {
    for (i, pair) in collection.windows(2).enumerate() {
        let (a, b) = (key(&pair[0]), key(&pair[1]));
        assert!(
            a <= b,
            "Keys out of order at index {}:\n  {a:?} > {b:?}\n  Elements: {:?}, {:?}",
            i + 1,
            pair[0],
            pair[1]
        );
    }
}

/// Assert that every element of a collection satisfies a predicate.
///
/// # Panics
///
/// Panics with the first failing element.
pub fn assert_all<T: Debug>(collection: &[T], predicate: impl Fn(&T) -> bool) {
    for (i, item) in collection.iter().enumerate() {
        assert!(
            predicate(item),
            "Predicate failed for element at index {i}:\n  Element: {item:?}"
        );
    }
}
