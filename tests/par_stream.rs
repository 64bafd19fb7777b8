use anyhow::Result;
use ironstream::testing::*;
use ironstream::{ExecMode, ParStream, Runner, Stream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const PARTITION_COUNTS: [usize; 4] = [1, 2, 7, 64];

#[test]
fn combinators_do_not_execute_until_a_terminal_runs() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let s = ParStream::from_vec((0..100).collect::<Vec<u32>>())
        .map(move |x| {
            c.fetch_add(1, Ordering::SeqCst);
            x + 1
        })
        .filter(|x| x % 2 == 0)
        .flat_map(Stream::once);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(s.count()?, 50);
    assert_eq!(calls.load(Ordering::SeqCst), 100);

    // No caching: the second terminal re-runs the whole chain.
    assert_eq!(s.to_vec()?.len(), 50);
    assert_eq!(calls.load(Ordering::SeqCst), 200);
    Ok(())
}

#[test]
fn to_vec_preserves_source_order_for_any_partition_count() -> Result<()> {
    let data: Vec<i64> = (0..1_000).collect();
    let expected: Vec<i64> = data.iter().map(|x| x * 3).filter(|x| x % 2 == 1).collect();

    for parts in PARTITION_COUNTS {
        let out = ParStream::from_slice(&data)
            .with_partitions(parts)
            .map(|x| x * 3)
            .filter(|x| x % 2 == 1)
            .to_vec()?;
        assert_collections_equal(&out, &expected);
    }
    Ok(())
}

#[test]
fn map_yields_image_multiset() -> Result<()> {
    let data = vec!["a", "bb", "a", "ccc", "bb", "a"];
    let out = ParStream::from_vec(data.clone())
        .with_partitions(3)
        .map(|s| s.len())
        .to_vec()?;
    let expected: Vec<usize> = data.iter().map(|s| s.len()).collect();
    assert_same_multiset(&out, &expected);
    Ok(())
}

#[test]
fn flat_map_expands_each_element_within_its_partition() -> Result<()> {
    let out = ParStream::from_vec(vec![1u32, 2, 3, 4])
        .with_partitions(2)
        .flat_map(|n| Stream::range(0..n).map(move |i| n * 10 + i))
        .to_vec()?;
    assert_eq!(out, vec![10, 20, 21, 30, 31, 32, 40, 41, 42, 43]);
    Ok(())
}

#[test]
fn choose_and_inspect_are_fused() -> Result<()> {
    let seen = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&seen);
    let out = ParStream::from_vec(vec!["1", "x", "3", "", "5"])
        .inspect(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        })
        .choose(|s| s.parse::<u8>().ok())
        .to_vec()?;
    assert_eq!(out, vec![1, 3, 5]);
    assert_eq!(seen.load(Ordering::SeqCst), 5);
    Ok(())
}

#[test]
fn iterable_sources_are_buffered_once() -> Result<()> {
    let produced = AtomicUsize::new(0);
    let s = ParStream::from_iterable((0..10u64).inspect(|_| {
        produced.fetch_add(1, Ordering::SeqCst);
    }));
    assert_eq!(produced.load(Ordering::SeqCst), 10);
    assert_eq!(s.source_len(), 10);

    assert_eq!(s.sum()?, 45);
    assert_eq!(s.sum()?, 45);
    assert_eq!(produced.load(Ordering::SeqCst), 10);

    let collected: ParStream<char> = "hello".chars().collect();
    assert_eq!(collected.to_vec()?, vec!['h', 'e', 'l', 'l', 'o']);
    Ok(())
}

#[test]
fn shared_indexable_sources_are_not_copied() -> Result<()> {
    let shared: Arc<[u32]> = Arc::from(vec![4, 5, 6]);
    let s = ParStream::from_indexable(Arc::clone(&shared));
    assert_eq!(Arc::strong_count(&shared), 2);
    assert_eq!(s.to_vec()?, vec![4, 5, 6]);
    drop(s);
    assert_eq!(Arc::strong_count(&shared), 1);
    Ok(())
}

/// Counts how often values are cloned.
#[derive(Debug)]
struct Tracked(Arc<AtomicUsize>);

impl Clone for Tracked {
    fn clone(&self) -> Self {
        self.0.fetch_add(1, Ordering::SeqCst);
        Tracked(Arc::clone(&self.0))
    }
}

#[test]
fn construction_clone_costs() -> Result<()> {
    let clones = Arc::new(AtomicUsize::new(0));
    let items: Vec<Tracked> = (0..8).map(|_| Tracked(Arc::clone(&clones))).collect();

    let borrowed = ParStream::from_slice(&items);
    assert_eq!(clones.load(Ordering::SeqCst), 8);

    let owned = ParStream::from_vec(items);
    assert_eq!(clones.load(Ordering::SeqCst), 8);

    // Each terminal hands every element to the chain by clone.
    assert_eq!(owned.count()?, 8);
    assert_eq!(clones.load(Ordering::SeqCst), 16);
    assert_eq!(borrowed.count()?, 8);
    assert_eq!(clones.load(Ordering::SeqCst), 24);
    Ok(())
}

#[test]
fn empty_sources_produce_neutral_results() -> Result<()> {
    let s = ParStream::from_vec(Vec::<i32>::new()).with_partitions(8);
    assert!(s.to_vec()?.is_empty());
    assert_eq!(s.count()?, 0);
    assert_eq!(s.sum()?, 0);
    assert!(!s.any(|_| true)?);
    assert!(s.all(|_| false)?);
    Ok(())
}

#[test]
fn configuration_is_carried_through_combinators() {
    let s = ParStream::from_vec(vec![1, 2, 3])
        .with_partitions(2)
        .with_threads(3)
        .map(|x| x * 2);
    assert_eq!(
        s.runner().mode,
        ExecMode::Parallel {
            threads: Some(3),
            partitions: Some(2)
        }
    );

    let seq = s.sequential().filter(|x| *x > 2);
    assert_eq!(seq.runner().mode, ExecMode::Sequential);

    let custom = Runner {
        mode: ExecMode::Parallel {
            threads: None,
            partitions: None,
        },
        default_partitions: 5,
    };
    assert_eq!(seq.with_runner(custom).runner(), custom);
}

#[test]
fn for_each_visits_every_element() -> Result<()> {
    let total = AtomicUsize::new(0);
    ParStream::from_vec((1..=100).collect::<Vec<usize>>())
        .with_partitions(4)
        .for_each(|x| {
            total.fetch_add(x, Ordering::SeqCst);
        })?;
    assert_eq!(total.load(Ordering::SeqCst), 5050);
    Ok(())
}

#[test]
fn to_stream_materializes_for_sequential_reuse() -> Result<()> {
    let s = ParStream::from_vec(vec![3, 1, 2]).map(|x| x * 10).to_stream()?;
    assert_eq!(s.to_vec(), vec![30, 10, 20]);
    assert_eq!(s.sum(), 60);
    Ok(())
}
