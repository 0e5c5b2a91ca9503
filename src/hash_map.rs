use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::marker::PhantomData;

use crate::error::Error;
use crate::hash_table;
use crate::hash_table::HashTable;
use crate::value::Value;

/// A typed multimap from `i64` keys to values of type `V`, backed by a
/// [`HashTable`].
///
/// Values are serialized with their [`Value`] codec on insert and
/// deserialized on lookup, so the table only ever holds plain bytes. Since
/// `V::SIZE` is a compile-time constant, a payload of the wrong width can
/// never reach the table.
///
/// # Performance Characteristics
///
/// - **Memory**: 8 bytes of tag per value plus `V::SIZE`, with about 30% of
///   cells left empty.
/// - **Allocation**: inserts serialize through a scratch buffer owned by the
///   map and never allocate unless the table grows.
///
/// # Examples
///
/// ```rust
/// # use flat_multimap::HashMap;
/// #
/// let mut map: HashMap<(i32, i64)> = HashMap::with_capacity(10);
/// map.insert(4, &(1, 100)).unwrap();
/// map.insert(4, &(2, 200)).unwrap();
///
/// assert_eq!(map.get(4), vec![(1, 100), (2, 200)]);
/// assert_eq!(map.len(), 2);
/// ```
pub struct HashMap<V> {
    table: HashTable,
    scratch: Vec<u8>,
    _phantom: PhantomData<fn() -> V>,
}

impl<V> Clone for HashMap<V> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            scratch: self.scratch.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<V> Debug for HashMap<V>
where
    V: Value + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<V: Value> HashMap<V> {
    /// Creates an empty map.
    ///
    /// The map grows on its first insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashMap;
    /// #
    /// let map: HashMap<u64> = HashMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty map that holds `capacity` values before growing.
    ///
    /// # Panics
    ///
    /// Panics if the buffer size overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashMap;
    /// #
    /// let map: HashMap<u64> = HashMap::with_capacity(100);
    /// assert_eq!(map.capacity(), 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_table(HashTable::with_capacity(V::SIZE, capacity))
    }

    /// Creates an empty map, reporting an oversized request as
    /// [`Error::CapacityOverflow`] instead of panicking.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        HashTable::try_with_capacity(V::SIZE, capacity).map(Self::from_table)
    }

    /// Wraps an existing table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncorrectValueSize`] if the table's value size is not
    /// `V::SIZE`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashMap;
    /// # use flat_multimap::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(4, 10);
    /// table.insert(1, &7u32.to_le_bytes()).unwrap();
    ///
    /// let map = HashMap::<u32>::try_from_table(table).unwrap();
    /// assert_eq!(map.get(1), vec![7]);
    ///
    /// assert!(HashMap::<u64>::try_from_table(HashTable::with_capacity(4, 10)).is_err());
    /// ```
    pub fn try_from_table(table: HashTable) -> Result<Self, Error> {
        if table.value_size() != V::SIZE {
            return Err(Error::IncorrectValueSize {
                expected: V::SIZE,
                actual: table.value_size(),
            });
        }
        Ok(Self::from_table(table))
    }

    fn from_table(table: HashTable) -> Self {
        Self {
            table,
            scratch: vec![0; V::SIZE],
            _phantom: PhantomData,
        }
    }

    /// Returns the underlying byte table.
    pub fn as_table(&self) -> &HashTable {
        &self.table
    }

    /// Consumes the map, returning the underlying byte table.
    pub fn into_table(self) -> HashTable {
        self.table
    }

    /// Returns the number of values in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(1, &10u16).unwrap();
    /// map.insert(1, &11u16).unwrap();
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of values the map holds before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Reserves capacity for at least `additional` more values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the required capacity would not
    /// be addressable.
    pub fn reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.table.reserve(additional)
    }

    /// Inserts a value under `key`, after any values already stored there.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the map needed to grow and
    /// could not.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(0, &2i64).unwrap();
    /// assert_eq!(map.get(0), vec![2]);
    /// ```
    pub fn insert(&mut self, key: i64, value: &V) -> Result<(), Error> {
        value.serialize(&mut self.scratch);
        self.table.insert(key, &self.scratch)
    }

    /// Returns every value stored under `key`, in insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// for v in [1u64, 2, 4, 5] {
    ///     map.insert(10, &v).unwrap();
    /// }
    /// assert_eq!(map.get(10), vec![1, 2, 4, 5]);
    /// assert!(map.get(1).is_empty());
    /// ```
    pub fn get(&self, key: i64) -> Vec<V> {
        self.values(key).collect()
    }

    /// Decodes every value stored under `key` into `dst`, replacing its
    /// contents but keeping its allocation, and returns the number of
    /// values.
    pub fn get_into(&self, key: i64, dst: &mut Vec<V>) -> usize {
        dst.clear();
        dst.extend(self.values(key));
        dst.len()
    }

    /// Returns an iterator decoding the values stored under `key` lazily.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(3, &5u32).unwrap();
    /// map.insert(3, &6u32).unwrap();
    /// assert_eq!(map.values(3).sum::<u32>(), 11);
    /// ```
    pub fn values(&self, key: i64) -> Values<'_, V> {
        Values {
            inner: self.table.get_ref(key),
            _phantom: PhantomData,
        }
    }

    /// Returns `true` if at least one value is stored under `key`.
    pub fn contains_key(&self, key: i64) -> bool {
        self.table.contains_key(key)
    }

    /// Returns an iterator over every `(key, value)` pair in the map.
    ///
    /// As with [`HashTable::cursor`], zero-key values come first with key
    /// `0`, and the other values are reported with their tag rather than
    /// their original key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashMap;
    /// #
    /// let mut map = HashMap::new();
    /// map.insert(0, &5u8).unwrap();
    /// map.insert(3, &7u8).unwrap();
    ///
    /// let total: u32 = map.iter().map(|(_, v)| v as u32).sum();
    /// assert_eq!(total, 12);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.table.cursor(),
            _phantom: PhantomData,
        }
    }
}

impl<V: Value> Default for HashMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V: Value> IntoIterator for &'a HashMap<V> {
    type Item = (i64, V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the decoded values stored under one key of a `HashMap`.
pub struct Values<'a, V> {
    inner: hash_table::Values<'a>,
    _phantom: PhantomData<fn() -> V>,
}

impl<V: Value> Iterator for Values<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(V::deserialize)
    }
}

/// An iterator over the decoded `(key, value)` pairs of a `HashMap`.
pub struct Iter<'a, V> {
    inner: hash_table::Cursor<'a>,
    _phantom: PhantomData<fn() -> V>,
}

impl<V: Value> Iterator for Iter<'_, V> {
    type Item = (i64, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, value)| (key, V::deserialize(value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V: Value> ExactSizeIterator for Iter<'_, V> {}

#[cfg(test)]
mod tests {
    use alloc::format;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::key::Key;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Sample {
        step: i32,
        last_seen: i64,
    }

    impl Value for Sample {
        const SIZE: usize = 12;

        fn serialize(&self, dst: &mut [u8]) {
            self.step.serialize(&mut dst[..4]);
            self.last_seen.serialize(&mut dst[4..]);
        }

        fn deserialize(src: &[u8]) -> Self {
            Self {
                step: i32::deserialize(&src[..4]),
                last_seen: i64::deserialize(&src[4..]),
            }
        }
    }

    #[test]
    fn test_new_and_with_capacity() {
        let map: HashMap<u64> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 0);
        assert_eq!(map.as_table().value_size(), 8);

        let map: HashMap<Sample> = HashMap::with_capacity(100);
        assert_eq!(map.capacity(), 100);
        assert_eq!(map.as_table().value_size(), 12);

        let map: HashMap<Sample> = HashMap::default();
        assert!(map.is_empty());
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = HashMap::with_capacity(10);
        map.insert(0, &2i64).unwrap();
        for v in [1, 2, 4, 5] {
            map.insert(10, &v).unwrap();
        }

        assert_eq!(map.get(0), vec![2]);
        assert_eq!(map.get(10), vec![1, 2, 4, 5]);
        assert!(map.get(1).is_empty());
        assert!(map.contains_key(10));
        assert!(!map.contains_key(1));
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_struct_values_across_growth() {
        let mut map = HashMap::with_capacity(1);
        for i in 0..1000 {
            let sample = Sample {
                step: i,
                last_seen: -(i as i64),
            };
            map.insert((i % 7) as i64, &sample).unwrap();
        }

        assert_eq!(map.len(), 1000);
        for key in 0..7 {
            let values = map.get(key);
            let expected = (0..1000)
                .filter(|i| (i % 7) as i64 == key)
                .map(|i| Sample {
                    step: i,
                    last_seen: -(i as i64),
                })
                .collect::<Vec<_>>();
            assert_eq!(values, expected, "key {key}");
        }
    }

    #[test]
    fn test_get_into() {
        let mut map = HashMap::new();
        map.insert(8, &1u32).unwrap();
        map.insert(8, &2u32).unwrap();

        let mut dst = Vec::with_capacity(16);
        dst.push(99);
        assert_eq!(map.get_into(8, &mut dst), 2);
        assert_eq!(dst, vec![1, 2]);
        assert!(dst.capacity() >= 16);

        assert_eq!(map.get_into(9, &mut dst), 0);
        assert!(dst.is_empty());
    }

    #[test]
    fn test_values_is_lazy() {
        let mut map = HashMap::new();
        for v in 0..10u64 {
            map.insert(-3, &v).unwrap();
        }

        let mut values = map.values(-3);
        assert_eq!(values.next(), Some(0));
        assert_eq!(values.nth(4), Some(5));
        assert_eq!(values.count(), 4);
    }

    #[test]
    fn test_iter_matches_get() {
        let mut rng = SmallRng::from_os_rng();
        let mut map = HashMap::new();
        for _ in 0..300 {
            let key = rng.random_range(-10i64..10);
            map.insert(key, &rng.random::<u16>()).unwrap();
        }

        let iter = map.iter();
        assert_eq!(iter.len(), map.len());

        for key in -10..10 {
            let identity = if key == 0 { 0 } else { Key(key).hash() };
            let mut from_iter = map
                .iter()
                .filter(|&(k, _)| k == identity)
                .map(|(_, v)| v)
                .collect::<Vec<_>>();
            let mut from_get = map.get(key);
            from_iter.sort();
            from_get.sort();
            assert_eq!(from_iter, from_get, "key {key}");
        }
        assert_eq!((&map).into_iter().count(), 300);
    }

    #[test]
    fn test_unit_values_count_keys() {
        let mut map: HashMap<()> = HashMap::new();
        for _ in 0..4 {
            map.insert(12, &()).unwrap();
        }
        map.insert(0, &()).unwrap();

        assert_eq!(map.get(12).len(), 4);
        assert_eq!(map.values(0).count(), 1);
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_try_from_table() {
        let table = HashTable::with_capacity(12, 10);
        assert!(HashMap::<Sample>::try_from_table(table.clone()).is_ok());
        assert_eq!(
            HashMap::<u64>::try_from_table(table).unwrap_err(),
            Error::IncorrectValueSize {
                expected: 8,
                actual: 12
            }
        );
    }

    #[test]
    fn test_reserve_and_clone() {
        let mut map = HashMap::new();
        map.insert(1, &1u8).unwrap();
        map.reserve(64).unwrap();
        assert!(map.capacity() >= 65);

        let mut cloned = map.clone();
        cloned.insert(1, &2u8).unwrap();
        assert_eq!(map.get(1), vec![1]);
        assert_eq!(cloned.get(1), vec![1, 2]);
        assert_eq!(cloned.into_table().len(), 2);
    }

    #[test]
    fn test_debug() {
        let mut map = HashMap::new();
        map.insert(0, &7u8).unwrap();
        assert_eq!(format!("{map:?}"), "[(0, 7)]");
    }
}
