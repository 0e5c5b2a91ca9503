use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use proptest::prelude::*;

use crate::Error;
use crate::HashMap;
use crate::HashTable;
use crate::Key;

#[derive(Clone, Debug)]
enum Op {
    Insert(i64, u64),
    Get(i64),
    Grow,
    Reserve(usize),
}

fn key_strategy() -> impl Strategy<Value = i64> + Clone {
    // A narrow key range forces repeated keys and shared home cells; the
    // extremes and zero get picked out explicitly.
    prop_oneof![
        8 => -24i64..24,
        1 => Just(0i64),
        1 => any::<i64>(),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        70 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        26 => key.clone().prop_map(Op::Get),
        2 => Just(Op::Grow),
        2 => (0usize..64).prop_map(Op::Reserve),
    ];
    prop::collection::vec(op, 0..=1500)
}

fn decode(values: Vec<Vec<u8>>) -> Vec<u64> {
    values
        .into_iter()
        .map(|v| u64::from_le_bytes(v.try_into().unwrap()))
        .collect()
}

fn identity(key: i64) -> i64 {
    if key == 0 { 0 } else { Key(key).hash() }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_model(capacity in 0usize..16, ops in ops_strategy()) {
        let mut t = HashTable::with_capacity(8, capacity);
        let mut m: BTreeMap<i64, Vec<u64>> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    t.insert(key, &value.to_le_bytes()).unwrap();
                    m.entry(key).or_default().push(value);
                }
                Op::Get(key) => {
                    let got = decode(t.get(key));
                    let expected = m.get(&key).cloned().unwrap_or_default();
                    prop_assert_eq!(got, expected);
                }
                Op::Grow => {
                    if t.capacity() < 4096 {
                        t.grow().unwrap();
                    }
                }
                Op::Reserve(additional) => {
                    t.reserve(additional).unwrap();
                    prop_assert!(t.capacity() >= t.len() + additional);
                }
            }

            prop_assert_eq!(t.len(), m.values().map(Vec::len).sum::<usize>());
            prop_assert!(t.len() <= t.capacity());
        }

        t.assert_invariants();
        for (key, expected) in &m {
            prop_assert_eq!(&decode(t.get(*key)), expected);
        }
    }

    #[test]
    fn prop_growth_is_transparent(
        small in 0usize..4,
        ops in prop::collection::vec((key_strategy(), any::<u64>()), 0..=800),
    ) {
        let mut a = HashTable::with_capacity(8, small);
        let mut b = HashTable::with_capacity(8, ops.len());

        for &(key, value) in &ops {
            a.insert(key, &value.to_le_bytes()).unwrap();
            b.insert(key, &value.to_le_bytes()).unwrap();
        }

        a.assert_invariants();
        b.assert_invariants();
        prop_assert_eq!(a.len(), b.len());
        for &(key, _) in &ops {
            prop_assert_eq!(a.get(key), b.get(key));
        }
    }

    #[test]
    fn prop_cursor_is_complete(
        capacity in 0usize..8,
        ops in prop::collection::vec((key_strategy(), any::<u64>()), 0..=500),
    ) {
        let mut t = HashTable::with_capacity(8, capacity);
        let mut expected: BTreeMap<i64, Vec<u64>> = BTreeMap::new();
        for &(key, value) in &ops {
            t.insert(key, &value.to_le_bytes()).unwrap();
        }
        for &(key, _) in &ops {
            expected.insert(identity(key), decode(t.get(key)));
        }

        let mut got: BTreeMap<i64, Vec<u64>> = BTreeMap::new();
        let mut cursor = t.cursor();
        prop_assert_eq!(cursor.len(), t.len());
        while let Some((key, value)) = cursor.next_copied() {
            got.entry(key).or_default().push(u64::from_le_bytes(value.try_into().unwrap()));
        }

        for values in got.values_mut() {
            values.sort_unstable();
        }
        for values in expected.values_mut() {
            values.sort_unstable();
        }
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_hash_is_never_zero(key in any::<i64>()) {
        prop_assert_ne!(Key(key).hash(), 0);
        prop_assert!(Key(key).hash() > 0);
    }

    #[test]
    fn prop_wrong_width_is_rejected(
        width in 0usize..32,
        key in key_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut t = HashTable::with_capacity(width, 1);
        t.insert(1, &vec![0u8; width]).unwrap();

        let result = t.insert(key, &payload);
        if payload.len() == width {
            prop_assert_eq!(result, Ok(()));
            prop_assert_eq!(t.len(), 2);
        } else {
            prop_assert_eq!(
                result,
                Err(Error::IncorrectValueSize { expected: width, actual: payload.len() })
            );
            prop_assert_eq!(t.len(), 1);
            prop_assert_eq!(t.capacity(), 1);
        }
        t.assert_invariants();
    }

    #[test]
    fn prop_typed_map_round_trip(
        ops in prop::collection::vec((key_strategy(), any::<(i32, i64)>()), 0..=500),
    ) {
        let mut map: HashMap<(i32, i64)> = HashMap::new();
        let mut m: BTreeMap<i64, Vec<(i32, i64)>> = BTreeMap::new();
        for &(key, value) in &ops {
            map.insert(key, &value).unwrap();
            m.entry(key).or_default().push(value);
        }

        prop_assert_eq!(map.len(), ops.len());
        for (key, expected) in &m {
            prop_assert_eq!(&map.get(*key), expected);
        }
    }
}

#[test]
fn absent_keys_are_empty() {
    let mut t = HashTable::with_capacity(8, 4);
    for key in 1..=4 {
        t.insert(key, &(key as u64).to_le_bytes()).unwrap();
    }

    for key in 5..1000 {
        assert!(t.get(key).is_empty(), "key {key}");
        assert!(!t.contains_key(key));
    }
    assert!(t.get(0).is_empty());
}

#[test]
fn zero_key_never_leaks() {
    let mut t = HashTable::with_capacity(8, 2);
    for v in 0..50u64 {
        t.insert(0, &v.to_le_bytes()).unwrap();
    }
    t.insert(1, &u64::MAX.to_le_bytes()).unwrap();

    assert_eq!(decode(t.get(0)), (0..50).collect::<Vec<_>>());
    assert_eq!(decode(t.get(1)), vec![u64::MAX]);
    for key in -100..100 {
        if key != 0 && key != 1 {
            assert!(t.get(key).is_empty(), "key {key}");
        }
    }
    t.assert_invariants();
}
