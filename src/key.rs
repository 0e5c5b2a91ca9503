/// A key stored in a [`HashTable`](crate::HashTable).
///
/// Keys are plain 64-bit integers. Every key other than zero is reduced to a
/// non-zero tag by [`Key::hash`]; zero is routed to a separate side channel
/// since a tag of zero marks an empty cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(pub i64);

impl Key {
    /// The key stored in the side channel instead of the cell buffer.
    pub const ZERO: Key = Key(0);

    /// Hashes the key to the tag written into its cell.
    ///
    /// This is the splitmix64 finalizer, reduced to a non-negative `i64`. The
    /// result is never zero: a mix that lands on zero is remapped to one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::Key;
    /// #
    /// assert_ne!(Key(42).hash(), 0);
    /// assert_eq!(Key(0).hash(), 1);
    /// assert_eq!(Key(42).hash(), Key(42).hash());
    /// ```
    #[inline(always)]
    pub fn hash(self) -> i64 {
        let mut x = self.0 as u64;
        x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
        x ^= x >> 31;

        match (x % i64::MAX as u64) as i64 {
            0 => 1,
            tag => tag,
        }
    }

    /// Returns `true` if this is the zero key.
    ///
    /// This looks at the key itself, not its hash.
    #[inline(always)]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for Key {
    #[inline(always)]
    fn from(value: i64) -> Self {
        Key(value)
    }
}

impl From<Key> for i64 {
    #[inline(always)]
    fn from(key: Key) -> Self {
        key.0
    }
}
