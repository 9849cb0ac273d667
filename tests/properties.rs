use std::collections::HashMap;

use hashtable_engine::{
    DoubleHashingTable, HashTable, LinearProbingTable, OpenAddressingTable, QuadraticProbing,
    QuadraticProbingTable, SeparateChainingTable, TableConfig,
};
use proptest::{collection::vec, prelude::*};

/// Insert, get, remove or contains, on a small key space so slots collide
fn operations() -> impl Strategy<Value = Vec<(u8, u16, u32)>> {
    vec((0_u8..4, 0_u16..48, any::<u32>()), 1..300)
}

/// Sorted entries of any table
fn entries<T: HashTable<u16, u32>>(table: &T) -> Vec<(u16, u32)> {
    let mut entries = Vec::with_capacity(table.len());
    table.for_each_entry(&mut |key, value| entries.push((*key, *value)));
    entries.sort_unstable();
    entries
}

/// Replays `ops` on `table` and on a `HashMap`, comparing every answer
fn check_against_model<T: HashTable<u16, u32>>(
    mut table: T,
    ops: &[(u8, u16, u32)],
) -> Result<(), TestCaseError> {
    let mut model = HashMap::new();
    for &(op, key, value) in ops {
        match op {
            0 => prop_assert_eq!(table.insert(key, value).ok(), Some(model.insert(key, value))),
            1 => prop_assert_eq!(table.get(&key).copied(), model.get(&key).copied()),
            2 => prop_assert_eq!(table.remove(&key), model.remove(&key)),
            _ => prop_assert_eq!(table.contains_key(&key), model.contains_key(&key)),
        }
        prop_assert_eq!(table.len(), model.len());
    }

    let mut expected: Vec<_> = model.into_iter().collect();
    expected.sort_unstable();
    prop_assert_eq!(entries(&table), expected);
    Ok(())
}

proptest! {
    #[test]
    fn quadratic_matches_model(ops in operations()) {
        check_against_model(QuadraticProbingTable::new(), &ops)?;
    }

    #[test]
    fn linear_matches_model(ops in operations()) {
        check_against_model(LinearProbingTable::new(), &ops)?;
    }

    #[test]
    fn double_hashing_matches_model(ops in operations()) {
        check_against_model(DoubleHashingTable::new(), &ops)?;
    }

    #[test]
    fn chaining_matches_model(ops in operations()) {
        check_against_model(SeparateChainingTable::new(), &ops)?;
    }

    #[test]
    fn removing_absent_keys_changes_nothing(
        keys in vec(0_u16..1000, 0..50),
        absent in 1000_u16..2000,
    ) {
        let mut open = QuadraticProbingTable::new();
        let mut chained = SeparateChainingTable::new();
        for &key in &keys {
            open.insert(key, u32::from(key)).unwrap();
            chained.insert(key, u32::from(key)).unwrap();
        }
        let (open_len, chained_len) = (open.len(), chained.len());

        prop_assert_eq!(open.remove(&absent), None);
        prop_assert_eq!(chained.remove(&absent), None);
        prop_assert_eq!(open.len(), open_len);
        prop_assert_eq!(chained.len(), chained_len);
    }

    #[test]
    fn used_slots_stay_within_load_factor(
        load_factor in 0.3_f64..0.95,
        ops in operations(),
    ) {
        let config = TableConfig::new(7, load_factor);
        let mut table = QuadraticProbingTable::<u16, u32>::with_config(config).unwrap();
        for (op, key, value) in ops {
            if op == 2 {
                table.remove(&key);
            } else {
                table.insert(key, value).unwrap();
                let used = table.used_buckets() as f64 / table.capacity() as f64;
                prop_assert!(used <= load_factor, "{} > {}", used, load_factor);
            }
        }
    }

    #[test]
    fn tombstones_are_transparent(
        keys in vec(0_u16..200, 1..60),
        victim in 0_u16..200,
    ) {
        let mut reference = QuadraticProbingTable::new();
        let mut churned = QuadraticProbingTable::new();
        for &key in &keys {
            reference.insert(key, u32::from(key)).unwrap();
            churned.insert(key, u32::from(key)).unwrap();
        }
        reference.insert(victim, 7).unwrap();
        churned.insert(victim, 7).unwrap();
        churned.remove(&victim);
        churned.insert(victim, 7).unwrap();

        prop_assert_eq!(entries(&churned), entries(&reference));
        prop_assert_eq!(churned.len(), reference.len());
    }

    #[test]
    fn growth_preserves_contents(keys in vec(any::<u16>(), 1..200)) {
        let mut open = QuadraticProbingTable::new();
        let mut chained = SeparateChainingTable::new();
        for key in keys {
            let (open_before, open_capacity) = (entries(&open), open.capacity());
            let (chained_before, chained_capacity) = (entries(&chained), chained.capacity());
            let fresh = !open_before.iter().any(|&(existing, _)| existing == key);

            open.insert(key, 1).unwrap();
            chained.insert(key, 1).unwrap();

            if fresh && open.capacity() != open_capacity {
                let mut expected = open_before;
                expected.push((key, 1));
                expected.sort_unstable();
                prop_assert_eq!(entries(&open), expected);
                prop_assert_eq!(open.tombstones(), 0);
            }
            if fresh && chained.capacity() != chained_capacity {
                let mut expected = chained_before;
                expected.push((key, 1));
                expected.sort_unstable();
                prop_assert_eq!(entries(&chained), expected);
            }
        }
    }

    #[test]
    fn quadratic_probing_fills_power_of_two_tables(
        capacity in prop::sample::select(vec![8_usize, 16, 32]),
        hash in any::<u32>(),
    ) {
        // Every key shares one canonical slot, so each insert walks the whole chain.
        let same_slot = move |_: &u32| hash;
        let mut table = OpenAddressingTable::with_strategy(
            TableConfig::new(capacity, 1.0),
            QuadraticProbing,
            same_slot,
        ).unwrap();

        let count = u32::try_from(capacity - 1).unwrap();
        for key in 0..count {
            prop_assert_eq!(table.insert(key, key), Ok(None));
        }
        prop_assert_eq!(table.capacity(), capacity);
        prop_assert_eq!(table.len(), capacity - 1);
        for key in 0..count {
            prop_assert_eq!(table.get(&key), Some(&key));
        }
    }
}
