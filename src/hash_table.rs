use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::error::Error;
use crate::key::Key;

/// Width of the tag at the start of every cell.
const TAG_SIZE: usize = 8;

/// Tag value marking an empty cell. [`Key::hash`] never produces it.
const EMPTY: u64 = 0;

/// The table keeps at most 7 values per 10 cells. `LOAD_FACTOR` is the same
/// ratio as a float, for display only; sizing is done in integers.
const LOAD_FACTOR_NUM: u128 = 7;
const LOAD_FACTOR_DEN: u128 = 10;

/// Fraction of cells the table fills before it grows.
pub const LOAD_FACTOR: f64 = 0.7;

/// Factor the capacity is multiplied by on every growth event.
pub const GROWTH_RATIO: usize = 2;

/// Number of cells backing `capacity` values.
///
/// Always strictly greater than `capacity`, which guarantees every probe
/// sequence eventually meets an empty cell.
#[inline(always)]
fn cells_for_capacity(capacity: usize) -> Option<usize> {
    usize::try_from(capacity as u128 * LOAD_FACTOR_DEN / LOAD_FACTOR_NUM + 1).ok()
}

/// Debug statistics for hash table analysis.
///
/// Only available with the `stats` feature (and always under `cfg(test)`).
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of values currently in the table, zero-key values included
    pub populated: usize,
    /// Number of values the table holds before it grows
    pub capacity: usize,
    /// Width of every value in bytes
    pub value_size: usize,
    /// Total number of cells allocated
    pub total_cells: usize,
    /// Number of cells currently occupied
    pub occupied_cells: usize,
    /// Number of values in the zero-key side channel
    pub zero_key_entries: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Cell utilization (occupied_cells / total_cells)
    pub cell_utilization: f64,
    /// Largest distance between a value's cell and its home cell
    pub longest_probe: usize,
    /// Total memory in bytes used by the cell buffer and side channel
    pub total_bytes: usize,
    /// Bytes held by empty cells
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Cell Usage: {}/{} ({:.2}% utilization)",
            self.occupied_cells,
            self.total_cells,
            self.cell_utilization * 100.0
        );
        println!("Zero key: {} entries", self.zero_key_entries);
        println!("Longest probe: {} cells", self.longest_probe);
        println!(
            "Total Allocated: {} bytes ({} byte values)",
            self.total_bytes, self.value_size
        );
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// An array-backed multimap from `i64` keys to fixed-width byte values.
///
/// Every value lives in one contiguous byte buffer of cells. A cell is an
/// 8-byte tag (the key's [hash](Key::hash), zero when the cell is empty)
/// followed by `value_size` payload bytes. Collisions are resolved by linear
/// probing. The same key may be inserted any number of times; all of its
/// values are kept, in insertion order.
///
/// Key `0` cannot be told apart from an empty cell, so its values are kept in
/// a separate side channel. This is invisible to callers.
///
/// When [`len`](HashTable::len) reaches [`capacity`](HashTable::capacity),
/// the next insert doubles the capacity and rehashes every value into a new
/// buffer.
///
/// ## Performance Characteristics
///
/// - **Memory**: 8 bytes of tag per value plus the value itself, with about
///   30% of cells left empty.
/// - **Allocation**: none per operation besides growth and the copies made by
///   [`get`](HashTable::get).
///
/// ## Example
///
/// ```rust
/// # use flat_multimap::HashTable;
/// #
/// let mut table = HashTable::with_capacity(8, 10);
///
/// table.insert(7, &1u64.to_le_bytes()).unwrap();
/// table.insert(7, &2u64.to_le_bytes()).unwrap();
///
/// let values = table.get(7);
/// assert_eq!(values, vec![1u64.to_le_bytes().to_vec(), 2u64.to_le_bytes().to_vec()]);
/// assert!(table.get(8).is_empty());
/// ```
#[derive(Clone)]
pub struct HashTable {
    data: Vec<u8>,

    zeroes: Vec<u8>,
    zero_len: usize,

    value_size: usize,
    cell_size: usize,
    cell_count: usize,

    len: usize,
    capacity: usize,
}

impl Debug for HashTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        let cells = (0..self.cell_count)
            .map(|index| match self.tag_at(index) {
                EMPTY => "................".to_string(),
                tag => format!("{tag:016x}"),
            })
            .collect::<Vec<String>>();

        f.debug_struct("HashTable")
            .field(
                "cells",
                &cells.chunks(8).map(|w| w.join(", ")).collect::<Vec<_>>(),
            )
            .field("zero_keys", &self.zero_len)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("value_size", &self.value_size)
            .finish()
    }
}

impl HashTable {
    /// Creates an empty table for `value_size`-byte values that holds
    /// `capacity` values before growing.
    ///
    /// `capacity` counts values, not distinct keys: five keys with ten values
    /// each need a capacity of fifty.
    ///
    /// # Panics
    ///
    /// Panics if the buffer size overflows `usize`. See
    /// [`try_with_capacity`](HashTable::try_with_capacity) for a
    /// non-panicking version.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashTable;
    /// #
    /// let table = HashTable::with_capacity(12, 100);
    /// assert_eq!(table.capacity(), 100);
    /// assert_eq!(table.value_size(), 12);
    /// assert!(table.is_empty());
    /// ```
    pub fn with_capacity(value_size: usize, capacity: usize) -> Self {
        Self::try_with_capacity(value_size, capacity).expect("allocation size overflow")
    }

    /// Creates an empty table, reporting an oversized request as
    /// [`Error::CapacityOverflow`] instead of panicking.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::Error;
    /// # use flat_multimap::HashTable;
    /// #
    /// assert!(HashTable::try_with_capacity(8, 10).is_ok());
    /// assert_eq!(
    ///     HashTable::try_with_capacity(8, usize::MAX).unwrap_err(),
    ///     Error::CapacityOverflow
    /// );
    /// ```
    pub fn try_with_capacity(value_size: usize, capacity: usize) -> Result<Self, Error> {
        let cell_size = value_size
            .checked_add(TAG_SIZE)
            .ok_or(Error::CapacityOverflow)?;
        let cell_count = cells_for_capacity(capacity).ok_or(Error::CapacityOverflow)?;
        let bytes = cell_count
            .checked_mul(cell_size)
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or(Error::CapacityOverflow)?;

        Ok(Self {
            data: vec![0; bytes],
            zeroes: Vec::new(),
            zero_len: 0,
            value_size,
            cell_size,
            cell_count,
            len: 0,
            capacity,
        })
    }

    /// Returns the number of values in the table.
    ///
    /// Every successful insert counts once, including repeated keys and the
    /// zero key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(1, 10);
    /// table.insert(0, &[1]).unwrap();
    /// table.insert(5, &[1]).unwrap();
    /// table.insert(5, &[2]).unwrap();
    /// assert_eq!(table.len(), 3);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table contains no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of values the table holds before it grows.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the width in bytes every value must have.
    pub fn value_size(&self) -> usize {
        self.value_size
    }

    /// Returns the number of cells in the backing buffer.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    #[inline(always)]
    fn tag_at(&self, index: usize) -> u64 {
        let offset = index * self.cell_size;
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&self.data[offset..offset + TAG_SIZE]);
        u64::from_le_bytes(tag)
    }

    #[inline(always)]
    fn value_at(&self, index: usize) -> &[u8] {
        let offset = index * self.cell_size + TAG_SIZE;
        &self.data[offset..offset + self.value_size]
    }

    #[inline(always)]
    fn zero_value_at(&self, index: usize) -> &[u8] {
        let offset = index * self.value_size;
        &self.zeroes[offset..offset + self.value_size]
    }

    #[inline(always)]
    fn home_index(&self, tag: u64) -> usize {
        (tag % self.cell_count as u64) as usize
    }

    #[inline(always)]
    fn next_index(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.cell_count { 0 } else { next }
    }

    /// Finds the first cell holding `tag`, or the first empty cell if the tag
    /// is absent, starting from the tag's home cell.
    ///
    /// The boolean is `true` when the tag was found.
    #[inline]
    fn first_index(&self, tag: u64) -> (usize, bool) {
        let mut index = self.home_index(tag);
        loop {
            match self.tag_at(index) {
                EMPTY => return (index, false),
                found if found == tag => return (index, true),
                _ => index = self.next_index(index),
            }
        }
    }

    /// Returns `index` if that cell is empty, otherwise the next empty cell.
    #[inline]
    fn first_free(&self, mut index: usize) -> usize {
        while self.tag_at(index) != EMPTY {
            index = self.next_index(index);
        }
        index
    }

    /// Writes `value` behind every value already stored under `tag`.
    ///
    /// The caller must ensure at least one cell is empty and that
    /// `value.len() == self.value_size`.
    #[inline]
    fn place(&mut self, tag: u64, value: &[u8]) {
        debug_assert_ne!(tag, EMPTY);
        debug_assert_eq!(value.len(), self.value_size);

        let (start, _) = self.first_index(tag);
        let index = self.first_free(start);

        let offset = index * self.cell_size;
        self.data[offset..offset + TAG_SIZE].copy_from_slice(&tag.to_le_bytes());
        self.data[offset + TAG_SIZE..offset + self.cell_size].copy_from_slice(value);
    }

    #[inline(always)]
    fn check_value_size(&self, actual: usize) -> Result<(), Error> {
        if actual != self.value_size {
            return Err(Error::IncorrectValueSize {
                expected: self.value_size,
                actual,
            });
        }
        Ok(())
    }

    /// Inserts a value under `key`.
    ///
    /// Values already stored under `key` are kept; the new one is appended
    /// after them. If the table is at capacity it grows first.
    ///
    /// # Errors
    ///
    /// - [`Error::IncorrectValueSize`] if `value` is not exactly
    ///   [`value_size`](HashTable::value_size) bytes long.
    /// - [`Error::CapacityOverflow`] if the table needed to grow and could
    ///   not.
    ///
    /// The table is unchanged when an error is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::Error;
    /// # use flat_multimap::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(4, 10);
    /// table.insert(10, &[1, 2, 3, 4]).unwrap();
    ///
    /// assert_eq!(
    ///     table.insert(10, &[1, 2]),
    ///     Err(Error::IncorrectValueSize { expected: 4, actual: 2 })
    /// );
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(&mut self, key: i64, value: &[u8]) -> Result<(), Error> {
        self.check_value_size(value.len())?;

        if self.len >= self.capacity {
            self.grow()?;
        }

        let key = Key(key);
        if key.is_zero() {
            self.zeroes.extend_from_slice(value);
            self.zero_len += 1;
        } else {
            self.place(key.hash() as u64, value);
        }

        self.len += 1;
        Ok(())
    }

    /// Returns copies of every value stored under `key`, in insertion order.
    ///
    /// The copies are owned and stay valid however the table changes
    /// afterwards. An absent key yields an empty vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(1, 10);
    /// for v in [1u8, 2, 4, 5] {
    ///     table.insert(10, &[v]).unwrap();
    /// }
    ///
    /// assert_eq!(table.get(10), vec![vec![1], vec![2], vec![4], vec![5]]);
    /// assert!(table.get(1).is_empty());
    /// ```
    pub fn get(&self, key: i64) -> Vec<Vec<u8>> {
        self.get_ref(key).map(<[u8]>::to_vec).collect()
    }

    /// Copies every value stored under `key` into `dst`, reusing the
    /// allocations already in it, and returns the number of values.
    ///
    /// `dst` is truncated to exactly the values found.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(2, 10);
    /// table.insert(3, &[1, 1]).unwrap();
    /// table.insert(3, &[2, 2]).unwrap();
    ///
    /// let mut buf = vec![vec![9; 2]; 5];
    /// assert_eq!(table.get_into(3, &mut buf), 2);
    /// assert_eq!(buf, vec![vec![1, 1], vec![2, 2]]);
    ///
    /// assert_eq!(table.get_into(4, &mut buf), 0);
    /// assert!(buf.is_empty());
    /// ```
    pub fn get_into(&self, key: i64, dst: &mut Vec<Vec<u8>>) -> usize {
        let mut count = 0;
        for value in self.get_ref(key) {
            match dst.get_mut(count) {
                Some(slot) => {
                    slot.clear();
                    slot.extend_from_slice(value);
                }
                None => dst.push(value.to_vec()),
            }
            count += 1;
        }
        dst.truncate(count);
        count
    }

    /// Returns an iterator over the values stored under `key`, borrowed
    /// straight from the table's buffer.
    ///
    /// Nothing is copied. The borrow keeps the table from being modified
    /// while the iterator or any slice it returned is alive; use
    /// [`get`](HashTable::get) for values that must outlive a later insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(1, 10);
    /// table.insert(0, &[7]).unwrap();
    /// table.insert(0, &[8]).unwrap();
    ///
    /// let sum: u32 = table.get_ref(0).map(|v| v[0] as u32).sum();
    /// assert_eq!(sum, 15);
    /// ```
    pub fn get_ref(&self, key: i64) -> Values<'_> {
        let key = Key(key);
        let probe = if key.is_zero() {
            Probe::Zero(0)
        } else {
            let tag = key.hash() as u64;
            match self.first_index(tag) {
                (index, true) => Probe::Run { tag, index },
                (_, false) => Probe::Done,
            }
        };

        Values { table: self, probe }
    }

    /// Returns `true` if at least one value is stored under `key`.
    pub fn contains_key(&self, key: i64) -> bool {
        self.get_ref(key).next().is_some()
    }

    /// Doubles the capacity and rehashes every value into a new buffer.
    ///
    /// This runs automatically when an insert finds the table full. A table
    /// with capacity zero grows to one.
    ///
    /// The new buffer is fully populated before it replaces the old one, and
    /// the order of values under each key is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the grown buffer would not be
    /// addressable. The table is unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(1, 4);
    /// table.insert(1, &[1]).unwrap();
    /// table.grow().unwrap();
    ///
    /// assert_eq!(table.capacity(), 8);
    /// assert_eq!(table.get(1), vec![vec![1]]);
    /// ```
    pub fn grow(&mut self) -> Result<(), Error> {
        let capacity = self
            .capacity
            .checked_mul(GROWTH_RATIO)
            .ok_or(Error::CapacityOverflow)?
            .max(1);
        self.rehash(capacity)
    }

    /// Reserves capacity for at least `additional` more values.
    ///
    /// Does nothing if the capacity is already sufficient; otherwise
    /// rehashes once to exactly `len() + additional`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the required capacity would not
    /// be addressable. The table is unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8, 0);
    /// table.reserve(50).unwrap();
    /// assert!(table.capacity() >= 50);
    /// ```
    pub fn reserve(&mut self, additional: usize) -> Result<(), Error> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;
        if required > self.capacity {
            self.rehash(required)?;
        }
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn rehash(&mut self, capacity: usize) -> Result<(), Error> {
        let mut grown = Self::try_with_capacity(self.value_size, capacity)?;

        // Walk the old buffer one cluster at a time, starting right after an
        // empty cell, so a run that wraps past the end is replayed in order.
        let start = (0..self.cell_count)
            .find(|&index| self.tag_at(index) == EMPTY)
            .unwrap_or(0);
        for step in 1..=self.cell_count {
            let index = (start + step) % self.cell_count;
            let tag = self.tag_at(index);
            if tag != EMPTY {
                grown.place(tag, self.value_at(index));
            }
        }

        grown.zeroes = core::mem::take(&mut self.zeroes);
        grown.zero_len = self.zero_len;
        grown.len = self.len;

        tracing::debug!(
            old_capacity = self.capacity,
            new_capacity = capacity,
            cells = grown.cell_count,
            len = self.len,
            "rehashed table"
        );

        *self = grown;
        Ok(())
    }

    /// Returns a cursor over every `(key, value)` pair in the table.
    ///
    /// Zero-key values come first, in insertion order, reported with key `0`.
    /// The remaining values follow in buffer order, each reported with its
    /// tag (the key's [hash](Key::hash)) since the original key is not
    /// stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use flat_multimap::HashTable;
    /// # use flat_multimap::Key;
    /// #
    /// let mut table = HashTable::with_capacity(1, 10);
    /// table.insert(0, &[5]).unwrap();
    /// table.insert(3, &[7]).unwrap();
    ///
    /// let pairs: Vec<(i64, Vec<u8>)> = table.cursor().map(|(k, v)| (k, v.to_vec())).collect();
    /// assert_eq!(pairs, vec![(0, vec![5]), (Key(3).hash(), vec![7])]);
    /// ```
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            table: self,
            zero_index: 0,
            cell_index: 0,
            remaining: self.len,
        }
    }

    /// Alias for [`cursor`](HashTable::cursor).
    pub fn iter(&self) -> Cursor<'_> {
        self.cursor()
    }

    /// Computes a histogram of probe distances for the current table state.
    ///
    /// Only available with the `stats` feature.
    ///
    /// Entry `d` counts the values stored `d` cells past their home cell.
    /// Zero-key values are not in the buffer and are not counted. The
    /// returned vector is as long as the largest distance plus one.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();

        for index in 0..self.cell_count {
            let tag = self.tag_at(index);
            if tag == EMPTY {
                continue;
            }

            let distance = (index + self.cell_count - self.home_index(tag)) % self.cell_count;
            if hist.len() <= distance {
                hist.resize(distance + 1, 0);
            }
            hist[distance] += 1;
        }

        hist
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Only available with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.probe_histogram();
        let occupied_cells = hist.iter().sum::<usize>();

        DebugStats {
            populated: self.len,
            capacity: self.capacity,
            value_size: self.value_size,
            total_cells: self.cell_count,
            occupied_cells,
            zero_key_entries: self.zero_len,
            load_factor: if self.capacity == 0 {
                0.0
            } else {
                self.len as f64 / self.capacity as f64
            },
            cell_utilization: occupied_cells as f64 / self.cell_count as f64,
            longest_probe: hist.len().saturating_sub(1),
            total_bytes: self.data.len() + self.zeroes.len(),
            wasted_bytes: (self.cell_count - occupied_cells) * self.cell_size,
        }
    }

    /// Checks every structural invariant of the table, panicking on the first
    /// violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert!(self.cell_count > self.capacity, "{self:#?}");
        assert!(self.len <= self.capacity, "{self:#?}");
        assert_eq!(self.data.len(), self.cell_count * self.cell_size);
        assert_eq!(self.zeroes.len(), self.zero_len * self.value_size);

        let mut occupied = 0;
        for index in 0..self.cell_count {
            let tag = self.tag_at(index);
            if tag == EMPTY {
                continue;
            }
            occupied += 1;
            assert!(tag <= i64::MAX as u64, "tag {tag:x} at {index}");

            // No hole between a value and its home cell, or Get would stop
            // short of it.
            let mut probe = self.home_index(tag);
            while probe != index {
                assert_ne!(self.tag_at(probe), EMPTY, "hole at {probe} before {index}");
                probe = self.next_index(probe);
            }
        }
        assert_eq!(occupied + self.zero_len, self.len, "{self:#?}");
    }

    /// Pretty-prints the probe-distance histogram horizontally using stdout.
    ///
    /// Requires the `stats` and `std` features.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = *hist.iter().max().unwrap_or(&0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} cells occupied):", hist.iter().sum::<usize>());

        for (distance, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", distance, "█".repeat(width), count);
        }
    }
}

impl<'a> IntoIterator for &'a HashTable {
    type Item = (i64, &'a [u8]);
    type IntoIter = Cursor<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.cursor()
    }
}

#[derive(Clone, Copy, Debug)]
enum Probe {
    Zero(usize),
    Run { tag: u64, index: usize },
    Done,
}

/// An iterator over the values stored under one key.
///
/// This struct is created by the [`get_ref`] method on [`HashTable`]. It
/// yields slices borrowed from the table's buffer, in insertion order.
///
/// [`get_ref`]: HashTable::get_ref
#[derive(Clone)]
pub struct Values<'a> {
    table: &'a HashTable,
    probe: Probe,
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        match self.probe {
            Probe::Zero(index) if index < table.zero_len => {
                self.probe = Probe::Zero(index + 1);
                Some(table.zero_value_at(index))
            }
            Probe::Run { tag, mut index } => loop {
                // The run ends at the first empty cell; cells of other keys
                // in between are skipped.
                let found = table.tag_at(index);
                if found == EMPTY {
                    self.probe = Probe::Done;
                    return None;
                }

                let current = index;
                index = table.next_index(index);
                if found == tag {
                    self.probe = Probe::Run { tag, index };
                    return Some(table.value_at(current));
                }
            },
            Probe::Zero(_) | Probe::Done => {
                self.probe = Probe::Done;
                None
            }
        }
    }
}

impl FusedIterator for Values<'_> {}

/// A single-pass cursor over every value in a [`HashTable`].
///
/// This struct is created by the [`cursor`] method on [`HashTable`]. As an
/// [`Iterator`] it yields `(key, value)` pairs whose values borrow the
/// table's buffer; [`next_into`] and [`next_copied`] advance the same cursor
/// but hand out copies instead.
///
/// Zero-key values are yielded first with key `0`. Every other value is
/// yielded with its tag, in buffer order. A full pass yields exactly
/// [`len`](HashTable::len) pairs. To start over, create a new cursor.
///
/// [`cursor`]: HashTable::cursor
/// [`next_into`]: Cursor::next_into
/// [`next_copied`]: Cursor::next_copied
///
/// # Examples
///
/// ```rust
/// # use flat_multimap::HashTable;
/// #
/// let mut table = HashTable::with_capacity(4, 10);
/// table.insert(0, &[0, 0, 0, 1]).unwrap();
/// table.insert(9, &[0, 0, 0, 2]).unwrap();
///
/// let mut cursor = table.cursor();
/// let mut value = Vec::new();
/// while let Some(key) = cursor.next_into(&mut value) {
///     println!("{key}: {value:?}");
/// }
/// ```
#[derive(Clone)]
pub struct Cursor<'a> {
    table: &'a HashTable,
    zero_index: usize,
    cell_index: usize,
    remaining: usize,
}

impl Cursor<'_> {
    /// Advances the cursor, copying the value into `value` (reusing its
    /// allocation) and returning the key, or `None` at the end.
    pub fn next_into(&mut self, value: &mut Vec<u8>) -> Option<i64> {
        let (key, src) = self.next()?;
        value.clear();
        value.extend_from_slice(src);
        Some(key)
    }

    /// Advances the cursor, returning the key and an owned copy of the value.
    pub fn next_copied(&mut self) -> Option<(i64, Vec<u8>)> {
        self.next().map(|(key, value)| (key, value.to_vec()))
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = (i64, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;

        if self.zero_index < table.zero_len {
            let value = table.zero_value_at(self.zero_index);
            self.zero_index += 1;
            self.remaining = self.remaining.saturating_sub(1);
            return Some((Key::ZERO.0, value));
        }

        while self.cell_index < table.cell_count {
            let index = self.cell_index;
            self.cell_index += 1;

            let tag = table.tag_at(index);
            if tag != EMPTY {
                self.remaining = self.remaining.saturating_sub(1);
                return Some((tag as i64, table.value_at(index)));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Cursor<'_> {}

impl FusedIterator for Cursor<'_> {}
