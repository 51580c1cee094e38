use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;

/// Smallest non-zero ring size. The table grows straight from the
/// sentinel-only state to this size and never shrinks below it.
const MIN_CAPACITY: usize = 2;

/// Upper load bound as a fraction: grow once `(len + 1) / capacity` reaches
/// 4/5.
const MAX_LOAD: (u128, u128) = (4, 5);

/// Lower load bound as a fraction: shrink once `len / capacity` drops to 1/5.
const MIN_LOAD: (u128, u128) = (1, 5);

#[inline(always)]
fn at_max_load(populated: usize, capacity: usize) -> bool {
    populated as u128 * MAX_LOAD.1 >= capacity as u128 * MAX_LOAD.0
}

#[inline(always)]
fn at_min_load(populated: usize, capacity: usize) -> bool {
    populated as u128 * MIN_LOAD.1 <= capacity as u128 * MIN_LOAD.0
}

#[inline(always)]
fn sentinel_only<V>() -> Vec<Bucket<V>> {
    vec![Bucket::Sentinel]
}

/// State of a single slot in the backing array.
#[derive(Clone)]
enum Bucket<V> {
    /// Available for a new entry.
    Empty,
    /// Holds an entry sitting `displacement` ring positions past the ideal
    /// index derived from `hash`.
    Occupied {
        displacement: usize,
        hash: u64,
        value: V,
    },
    /// The last slot of the array. Never holds data and is never probed.
    Sentinel,
}

impl<V> Bucket<V> {
    #[inline(always)]
    fn value(&self) -> Option<&V> {
        match self {
            Bucket::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    #[inline(always)]
    fn value_mut(&mut self) -> Option<&mut V> {
        match self {
            Bucket::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Count of occupied buckets per displacement.
///
/// Compiled with the `stats` feature or under `cfg(test)`.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    bins: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Returns the bins. Index `d` holds the number of entries with
    /// displacement `d`; the last bin is never zero.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Returns the largest displacement in the table, or `None` if the table
    /// is empty.
    pub fn max_displacement(&self) -> Option<usize> {
        self.bins.len().checked_sub(1)
    }

    /// Returns the number of entries counted.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} entries):", self.total());
        for (displacement, &count) in self.bins.iter().enumerate() {
            let width = (count as u128 * max_bar as u128).div_ceil(max as u128) as usize;
            println!("{:>3} | {} ({})", displacement, "█".repeat(width), count);
        }
    }
}

/// Debug statistics for hash table analysis.
///
/// Compiled with the `stats` feature or under `cfg(test)`.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Number of addressable buckets in the ring
    pub capacity: usize,
    /// Total number of slots allocated, sentinel included
    pub total_slots: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Largest displacement of any entry
    pub max_displacement: usize,
    /// Mean displacement over all entries
    pub mean_displacement: f64,
    /// Total memory in bytes used by the backing array
    pub total_bytes: usize,
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
            "Displacement: max {}, mean {:.3}",
            self.max_displacement, self.mean_displacement
        );
        println!(
            "Total Allocated: {} bytes over {} slots",
            self.total_bytes, self.total_slots
        );
    }
}

/// A hash table using Robin Hood linear probing with backward-shift
/// deletion.
///
/// `HashTable<V>` stores values of type `V`. Like a raw table, it does not
/// hash anything itself: every operation takes the value's hash and an
/// equality predicate. The hash is stored alongside the value and reused
/// whenever the table resizes.
///
/// The ring of buckets is always a power of two in size (or empty), followed
/// by one sentinel bucket. The table doubles once an insertion would bring
/// the load factor to 80% and halves once a removal drops it to 20%, never
/// shrinking below two buckets.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use robin_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new();
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     robin_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     robin_hash::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    buckets: Vec<Bucket<V>>,
    populated: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;

        let layout = self
            .buckets
            .iter()
            .map(|bucket| match bucket {
                Bucket::Empty => "..".to_string(),
                Bucket::Occupied { displacement, .. } => format!("{displacement:02}"),
                Bucket::Sentinel => "##".to_string(),
            })
            .collect::<Vec<String>>()
            .join(", ");

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("capacity", &self.capacity())
            .field("displacements", &layout)
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table. No buckets besides the sentinel are allocated
    /// until the first insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            buckets: sentinel_only(),
            populated: 0,
        }
    }

    /// Returns the number of addressable buckets in the ring.
    ///
    /// This is `0` for a fresh or cleared table and otherwise a power of two.
    pub fn capacity(&self) -> usize {
        self.buckets.len() - 1
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        debug_assert!(self.capacity().is_power_of_two());
        self.capacity() - 1
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of elements in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// assert_eq!(table.len(), 0);
    ///
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Removes all elements and releases the bucket array, returning the
    /// table to its freshly constructed state.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    /// table.entry(2, |&n: &u64| n == 2).or_insert(2);
    /// assert_eq!(table.len(), 2);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 0);
    /// ```
    pub fn clear(&mut self) {
        log::trace!(
            "clearing robin hood table: len={} capacity={}",
            self.populated,
            self.capacity()
        );
        self.buckets = sentinel_only();
        self.populated = 0;
    }

    /// Returns an iterator over all values in the table.
    ///
    /// Values are yielded in bucket order, which is unrelated to insertion
    /// order and changes whenever the table is mutated.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator over mutable references to all values in the
    /// table.
    ///
    /// Callers must not change any part of a value that feeds its hash or
    /// equality predicate.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// The table is reset to its freshly constructed state immediately;
    /// values not consumed by the iterator are dropped with it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(7, |s: &String| s == "key1").or_insert("key1".to_string());
    ///
    /// let values: Vec<String> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values, vec!["key1".to_string()]);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        let buckets = core::mem::replace(&mut self.buckets, sentinel_only());
        let remaining = core::mem::replace(&mut self.populated, 0);
        Drain {
            inner: IntoIter {
                buckets: buckets.into_iter(),
                remaining,
            },
            _table: PhantomData,
        }
    }

    /// Finds a value in the table by hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use robin_hash::hash_table::HashTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_u64(n: u64) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     n.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(hash_u64(42), |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.find(hash_u64(42), |&n| n == 42), Some(&42));
    /// assert_eq!(table.find(hash_u64(99), |&n| n == 99), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(hash, eq)?;
        self.buckets[index].value()
    }

    /// Finds a value in the table by hash and equality predicate, returning a
    /// mutable reference to it.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        self.buckets[index].value_mut()
    }

    /// Removes and returns a value from the table.
    ///
    /// The gap left behind is closed by shifting the rest of the cluster one
    /// bucket back. Returns `None` and leaves the table untouched if no value
    /// matches.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(99, |&n| n == 99), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        Some(self.remove_at(index))
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// Looking up an entry never resizes the table; a resize only happens
    /// when a [`VacantEntry`] is actually filled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::Entry;
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    ///
    /// match table.entry(5, |s: &String| s == "hello") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         *entry.get_mut() = "updated".to_string();
    ///     }
    /// }
    ///
    /// assert_eq!(table.find(5, |s| s == "hello"), Some(&"hello".to_string()));
    /// ```
    #[inline]
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        match self.find_index(hash, eq) {
            Some(index) => Entry::Occupied(OccupiedEntry { table: self, index }),
            None => Entry::Vacant(VacantEntry { table: self, hash }),
        }
    }

    /// Walks the probe sequence for `hash`. The walk gives up as soon as it
    /// meets an empty bucket or a resident closer to its ideal bucket than
    /// the distance walked so far: a matching entry would have evicted it.
    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }

        let mask = self.mask();
        let mut index = hash as usize & mask;
        let mut distance = 0usize;
        loop {
            match &self.buckets[index] {
                Bucket::Occupied {
                    displacement,
                    hash: resident_hash,
                    value,
                } => {
                    if *displacement < distance {
                        return None;
                    }
                    if *resident_hash == hash && eq(value) {
                        return Some(index);
                    }
                }
                Bucket::Empty | Bucket::Sentinel => return None,
            }

            distance += 1;
            index = (index + 1) & mask;
        }
    }

    /// Robin Hood placement. Carries `(displacement, hash, value)` forward
    /// from the ideal bucket, swapping it with any resident that sits closer
    /// to its own ideal bucket, until an empty bucket takes whatever is being
    /// carried. Returns the index where the original `value` ended up.
    ///
    /// Does not touch `populated` and performs no resize or duplicate check.
    fn place(&mut self, mut hash: u64, mut value: V) -> usize {
        let mask = self.mask();
        let mut index = hash as usize & mask;
        let mut displacement = 0usize;
        let mut landed = None;
        loop {
            let bucket = &mut self.buckets[index];
            if let Bucket::Occupied {
                displacement: resident,
                hash: resident_hash,
                value: resident_value,
            } = bucket
            {
                if *resident < displacement {
                    core::mem::swap(resident, &mut displacement);
                    core::mem::swap(resident_hash, &mut hash);
                    core::mem::swap(resident_value, &mut value);
                    if landed.is_none() {
                        landed = Some(index);
                    }
                }
            } else {
                debug_assert!(matches!(bucket, Bucket::Empty), "probe reached the sentinel");
                *bucket = Bucket::Occupied {
                    displacement,
                    hash,
                    value,
                };
                return landed.unwrap_or(index);
            }

            displacement += 1;
            index = (index + 1) & mask;
        }
    }

    /// Empties the bucket at `index`, then shifts every following entry that
    /// is not at its ideal bucket one step back until the cluster ends.
    fn remove_at(&mut self, index: usize) -> V {
        let mask = self.mask();
        let removed = core::mem::replace(&mut self.buckets[index], Bucket::Empty);
        self.populated -= 1;

        let mut gap = index;
        loop {
            let next = (gap + 1) & mask;
            match &mut self.buckets[next] {
                Bucket::Occupied { displacement, .. } if *displacement > 0 => *displacement -= 1,
                _ => break,
            }
            self.buckets.swap(gap, next);
            gap = next;
        }

        self.maybe_shrink();

        let Bucket::Occupied { value, .. } = removed else {
            unreachable!("removed bucket {index} was not occupied");
        };
        value
    }

    #[inline]
    fn maybe_grow(&mut self) {
        let capacity = self.capacity();
        if capacity < MIN_CAPACITY || at_max_load(self.populated + 1, capacity) {
            let target = capacity
                .checked_mul(2)
                .expect("capacity overflow")
                .max(MIN_CAPACITY);
            self.resize(target);
        }
    }

    #[inline]
    fn maybe_shrink(&mut self) {
        let capacity = self.capacity();
        if self.populated > 0 && capacity > MIN_CAPACITY && at_min_load(self.populated, capacity) {
            self.resize(capacity / 2);
        }
    }

    /// Rebuilds the table with a ring of `capacity` buckets. The new array is
    /// fully allocated before the old one is swapped out, so an allocation
    /// failure leaves the table as it was.
    #[cold]
    fn resize(&mut self, capacity: usize) {
        debug_assert!(capacity.is_power_of_two());
        debug_assert!(capacity >= MIN_CAPACITY);

        log::trace!(
            "resizing robin hood table: len={} old_capacity={} new_capacity={}",
            self.populated,
            self.capacity(),
            capacity
        );

        let mut buckets = Vec::with_capacity(capacity.checked_add(1).expect("capacity overflow"));
        buckets.resize_with(capacity, || Bucket::Empty);
        buckets.push(Bucket::Sentinel);

        let old = core::mem::replace(&mut self.buckets, buckets);
        for bucket in old {
            if let Bucket::Occupied { hash, value, .. } = bucket {
                self.place(hash, value);
            }
        }
    }

    /// Computes a histogram of displacements for the current table state.
    ///
    /// Requires the `stats` feature outside of tests.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut bins = Vec::new();
        for bucket in &self.buckets {
            if let Bucket::Occupied { displacement, .. } = bucket {
                if bins.len() <= *displacement {
                    bins.resize(displacement + 1, 0);
                }
                bins[*displacement] += 1;
            }
        }
        ProbeHistogram { bins }
    }

    /// Returns detailed utilization statistics for debugging.
    ///
    /// Requires the `stats` feature outside of tests.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let total_displacement: usize = histogram
            .bins()
            .iter()
            .enumerate()
            .map(|(displacement, count)| displacement * count)
            .sum();
        let capacity = self.capacity();

        DebugStats {
            populated: self.populated,
            capacity,
            total_slots: self.buckets.len(),
            load_factor: if capacity == 0 {
                0.0
            } else {
                self.populated as f64 / capacity as f64
            },
            max_displacement: histogram.max_displacement().unwrap_or(0),
            mean_displacement: if self.populated == 0 {
                0.0
            } else {
                total_displacement as f64 / self.populated as f64
            },
            total_bytes: self.buckets.capacity() * core::mem::size_of::<Bucket<V>>(),
        }
    }
}

impl<V> IntoIterator for HashTable<V> {
    type IntoIter = IntoIter<V>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            buckets: self.buckets.into_iter(),
            remaining: self.populated,
        }
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut HashTable<V> {
    type IntoIter = IterMut<'a, V>;
    type Item = &'a mut V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry - no matching value is present in the table
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - a matching value is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use robin_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    ///
    /// let value = table.entry(3, |s: &String| s == "key").or_insert("key".to_string());
    /// assert_eq!(value, "key");
    ///
    /// let existing = table.entry(3, |s: &String| s == "key").or_insert("other".to_string());
    /// assert_eq!(existing, "key");
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value in the entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Calls `f` on the value if the entry is occupied, returning the entry
    /// for further chaining.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in the hash table.
///
/// [`entry`]: HashTable::entry
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts a value into the vacant entry and returns a mutable reference to
    /// it.
    ///
    /// The table grows first if the insertion would bring it to its maximum
    /// load factor. The value may displace other entries on its way to its
    /// bucket.
    pub fn insert(self, value: V) -> &'a mut V {
        let VacantEntry { table, hash } = self;
        table.maybe_grow();
        table.populated += 1;
        let index = table.place(hash, value);
        match table.buckets[index].value_mut() {
            Some(value) => value,
            None => unreachable!("bucket {index} is empty right after placement"),
        }
    }
}

/// A view into an occupied entry in the hash table.
///
/// [`entry`]: HashTable::entry
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        match self.table.buckets[self.index].value() {
            Some(value) => value,
            None => unreachable!("occupied entry points at an empty bucket"),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        match self.table.buckets[self.index].value_mut() {
            Some(value) => value,
            None => unreachable!("occupied entry points at an empty bucket"),
        }
    }

    /// Converts the entry into a mutable reference to the value, bound to the
    /// lifetime of the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        let OccupiedEntry { table, index } = self;
        match table.buckets[index].value_mut() {
            Some(value) => value,
            None => unreachable!("occupied entry points at an empty bucket"),
        }
    }

    /// Removes the value from the table and returns it.
    ///
    /// This may shift neighbouring entries back and shrink the table.
    pub fn remove(self) -> V {
        self.table.remove_at(self.index)
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Bucket<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for bucket in self.buckets.by_ref() {
            match bucket {
                Bucket::Occupied { value, .. } => {
                    self.remaining -= 1;
                    return Some(value);
                }
                Bucket::Empty => {}
                Bucket::Sentinel => break,
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter_mut`] method on [`HashTable`].
///
/// [`iter_mut`]: HashTable::iter_mut
pub struct IterMut<'a, V> {
    buckets: core::slice::IterMut<'a, Bucket<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for bucket in self.buckets.by_ref() {
            match bucket {
                Bucket::Occupied { value, .. } => {
                    self.remaining -= 1;
                    return Some(value);
                }
                Bucket::Empty => {}
                Bucket::Sentinel => break,
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V> {
    buckets: alloc::vec::IntoIter<Bucket<V>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for bucket in self.buckets.by_ref() {
            match bucket {
                Bucket::Occupied { value, .. } => {
                    self.remaining -= 1;
                    return Some(value);
                }
                Bucket::Empty => {}
                Bucket::Sentinel => break,
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> FusedIterator for IntoIter<V> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    inner: IntoIter<V>,
    _table: PhantomData<&'a mut HashTable<V>>,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> FusedIterator for Drain<'_, V> {}
