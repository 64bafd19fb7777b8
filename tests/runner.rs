use anyhow::Result;
use ironstream::*;
use std::collections::HashSet;
use std::sync::Mutex;
use std::thread;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn partition_count_is_clamped_to_the_source() {
    let r = Runner::parallel(None, Some(8));
    assert_eq!(r.partition_count(1_000), 8);
    assert_eq!(r.partition_count(3), 3);
    assert_eq!(r.partition_count(0), 1);
    assert_eq!(Runner::parallel(None, Some(0)).partition_count(10), 1);
    assert_eq!(Runner::sequential().partition_count(1_000), 1);

    let default = Runner::default();
    assert_eq!(default.partition_count(usize::MAX), num_cpus::get().max(1));
}

#[test]
fn fork_join_covers_every_index_once_in_order() -> Result<()> {
    let r = Runner::parallel(None, Some(6));
    let parts = r.fork_join("cover", 9, |part, _| Ok(part))?;
    assert_eq!(parts.len(), 6);
    assert!(parts.iter().all(|p| !p.is_empty()));
    let covered: Vec<usize> = parts.iter().flat_map(Partition::range).collect();
    assert_eq!(covered, (0..9).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn runner_settings_load_from_config() -> Result<()> {
    let json = r#"{ "mode": { "Parallel": { "threads": 2, "partitions": 16 } }, "default_partitions": 4 }"#;
    let runner: Runner = serde_json::from_str(json)?;
    assert_eq!(
        runner.mode,
        ExecMode::Parallel {
            threads: Some(2),
            partitions: Some(16)
        }
    );
    assert_eq!(runner.partition_count(100), 16);

    let seq: Runner = serde_json::from_str(r#"{ "mode": "Sequential", "default_partitions": 1 }"#)?;
    assert_eq!(seq.mode, ExecMode::Sequential);

    let back: Runner = serde_json::from_str(&serde_json::to_string(&runner)?)?;
    assert_eq!(back, runner);
    Ok(())
}

#[test]
fn execution_modes_agree() -> Result<()> {
    init_tracing();
    let data: Vec<u64> = (0..20_000).collect();
    let pipeline = |s: ParStream<u64>| s.map(|x| x * x % 1_013).filter(|x| x % 3 != 0);

    let sequential = pipeline(ParStream::from_slice(&data).sequential()).to_vec()?;
    let global = pipeline(ParStream::from_slice(&data).with_partitions(13)).to_vec()?;
    let pooled = pipeline(ParStream::from_slice(&data).with_threads(3).with_partitions(7)).to_vec()?;
    assert_eq!(sequential, global);
    assert_eq!(sequential, pooled);

    let sum = pipeline(ParStream::from_slice(&data).with_threads(2)).sum()?;
    assert_eq!(sum, sequential.iter().sum::<u64>());
    Ok(())
}

#[test]
fn sequential_mode_runs_on_the_calling_thread() -> Result<()> {
    let caller = thread::current().id();
    let threads = Mutex::new(HashSet::new());
    ParStream::from_vec((0..500).collect::<Vec<u32>>())
        .sequential()
        .for_each(|_| {
            if let Ok(mut set) = threads.lock() {
                set.insert(thread::current().id());
            }
        })?;
    let seen = threads.into_inner().map_err(|e| anyhow::anyhow!("{e}"))?;
    assert_eq!(seen.len(), 1);
    assert!(seen.contains(&caller));
    Ok(())
}

#[test]
fn dedicated_pool_bounds_worker_threads() -> Result<()> {
    let threads = Mutex::new(HashSet::new());
    ParStream::from_vec((0..10_000).collect::<Vec<u32>>())
        .with_threads(2)
        .with_partitions(32)
        .for_each(|_| {
            if let Ok(mut set) = threads.lock() {
                set.insert(thread::current().id());
            }
        })?;
    let seen = threads.into_inner().map_err(|e| anyhow::anyhow!("{e}"))?;
    assert!(!seen.is_empty() && seen.len() <= 2, "saw {} threads", seen.len());
    Ok(())
}

#[test]
fn dedicated_pool_is_reused_across_terminals() -> Result<()> {
    let threads = Mutex::new(HashSet::new());
    let names = Mutex::new(HashSet::new());
    let s = ParStream::from_vec((0..2_000).collect::<Vec<u32>>())
        .with_threads(6)
        .with_partitions(24);
    for _ in 0..20 {
        s.for_each(|_| {
            if let (Ok(mut ids), Ok(mut ns)) = (threads.lock(), names.lock()) {
                ids.insert(thread::current().id());
                ns.insert(thread::current().name().map(str::to_owned));
            }
        })?;
    }
    let seen = threads.into_inner().map_err(|e| anyhow::anyhow!("{e}"))?;
    assert!(seen.len() <= 6, "saw {} distinct workers over 20 terminals", seen.len());

    let names = names.into_inner().map_err(|e| anyhow::anyhow!("{e}"))?;
    assert!(
        names
            .iter()
            .all(|n| n.as_deref().is_some_and(|n| n.starts_with("ironstream-6x-"))),
        "unexpected worker names: {names:?}"
    );
    Ok(())
}
