use anyhow::Result;
use ironstream::testing::*;
use ironstream::*;

#[test]
fn groups_flatten_back_to_the_source_multiset() -> Result<()> {
    let data: Vec<u32> = (0..1_000u32).map(|i| i.wrapping_mul(31) % 113).collect();
    for parts in [1, 3, 16] {
        let groups = ParStream::from_slice(&data)
            .with_partitions(parts)
            .group_by(|x| x % 10)?
            .to_vec()?;

        let flat: Vec<u32> = groups.iter().flat_map(|(_, g)| g.iter().copied()).collect();
        assert_same_multiset(&flat, &data);
        for (key, group) in &groups {
            assert_all(group, |x| x % 10 == *key);
        }
        assert_eq!(groups.len(), 10);
    }
    Ok(())
}

#[test]
fn groups_keep_source_order_and_first_appearance() -> Result<()> {
    let words = vec!["apple", "bob", "avocado", "cat", "banana", "cherry", "axe"];
    let groups = ParStream::from_vec(words)
        .with_partitions(3)
        .group_by(|w| w.chars().next())?
        .to_vec()?;
    assert_eq!(
        groups,
        vec![
            (Some('a'), vec!["apple", "avocado", "axe"]),
            (Some('b'), vec!["bob", "banana"]),
            (Some('c'), vec!["cat", "cherry"]),
        ]
    );
    Ok(())
}

#[test]
fn groups_can_be_read_repeatedly_and_chained() -> Result<()> {
    let grouped = ParStream::from_vec((1..=9).collect::<Vec<u32>>()).group_by(|x| x % 2 == 0)?;
    let sizes = grouped.clone().map(|(k, g)| (k, g.len())).to_vec()?;
    assert_eq!(sizes, vec![(false, 5), (true, 4)]);

    let sums = grouped.map(|(k, g)| (k, g.into_iter().sum::<u32>())).to_vec()?;
    assert_eq!(sums, vec![(false, 25), (true, 20)]);
    Ok(())
}

#[test]
fn group_by_runs_upstream_filters() -> Result<()> {
    let groups = ParStream::from_vec((0..20).collect::<Vec<i32>>())
        .filter(|x| x % 3 == 0)
        .group_by(|x| *x >= 10)?
        .to_vec()?;
    assert_eq!(groups, vec![(false, vec![0, 3, 6, 9]), (true, vec![12, 15, 18])]);
    Ok(())
}

#[test]
fn empty_source_has_no_groups() -> Result<()> {
    let groups = ParStream::from_vec(Vec::<u8>::new()).group_by(|x| *x)?;
    assert_eq!(groups.count()?, 0);
    Ok(())
}

#[test]
fn count_by_tallies_keys() -> Result<()> {
    let counts = ParStream::from_vec("mississippi".chars().collect::<Vec<_>>())
        .with_partitions(4)
        .count_by(|c| *c)?;
    assert_eq!(counts, vec![('m', 1), ('i', 4), ('s', 4), ('p', 2)]);
    Ok(())
}
