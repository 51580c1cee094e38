use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::DefaultHashBuilder;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
#[cfg(any(test, feature = "stats"))]
use crate::hash_table::{DebugStats, ProbeHistogram};

/// Error returned by [`HashMap::at`] when the requested key is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("key does not exist")]
pub struct KeyNotFound;

/// A hash map implemented using the Robin Hood [`HashTable`] as the
/// underlying storage.
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash keys. Each key is
/// hashed once on insertion; the hash is kept with the entry and reused when
/// the table resizes.
///
/// Unlike `std::collections::HashMap`, [`insert`] never overwrites: inserting
/// a key that is already present leaves the map unchanged. Use
/// [`get_mut`], [`entry`] or [`get_or_insert_default`] to update values.
///
/// The table keeps its load factor between 20% and 80%, doubling on insert
/// and halving on removal as needed.
///
/// [`insert`]: HashMap::insert
/// [`get_mut`]: HashMap::get_mut
/// [`entry`]: HashMap::entry
/// [`get_or_insert_default`]: HashMap::get_or_insert_default
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl<K, V> HashMap<K, V, DefaultHashBuilder> {
    /// Creates an empty map using the default hasher builder.
    ///
    /// No buckets are allocated until the first insertion.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use robin_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Returns the hasher builder the map was created with.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets in the underlying ring.
    ///
    /// This is `0` for a fresh or cleared map and a power of two otherwise.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Removes all elements from the map and releases its buckets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 0);
    /// assert!(map.iter().next().is_none());
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over the key-value pairs of the map.
    ///
    /// Pairs come out in bucket order, which has nothing to do with insertion
    /// order and changes whenever the map is modified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    ///
    /// let map = HashMap::from([(1, "a"), (2, "b")]);
    ///
    /// let mut pairs: Vec<_> = map.iter().collect();
    /// pairs.sort();
    /// assert_eq!(pairs, [(&1, &"a"), (&2, &"b")]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the key-value pairs of the map, with mutable
    /// references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns an iterator that removes and yields all key-value pairs from the
    /// map.
    ///
    /// The map is empty as soon as `drain` returns, even if the iterator is
    /// dropped early.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    ///
    /// let mut map = HashMap::from([(1, "a"), (2, "b")]);
    ///
    /// let pairs: Vec<_> = map.drain().collect();
    /// assert!(map.is_empty());
    /// assert_eq!(pairs.len(), 2);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Returns a histogram of how far each entry sits from its ideal bucket.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        self.table.probe_histogram()
    }

    /// Returns a summary of the table's occupancy and probe lengths.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        self.table.debug_stats()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts a key-value pair into the map if the key is not already
    /// present.
    ///
    /// Returns `true` if the pair was inserted. If the key was already
    /// present, the map is left untouched, `value` is dropped and `false` is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(_) => false,
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                true
            }
        }
    }

    /// Returns the stored key and value for `key`, or `None` if the key is
    /// absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    ///
    /// let map = HashMap::from([("one".to_string(), 1)]);
    /// assert_eq!(map.find("one"), Some((&"one".to_string(), &1)));
    /// assert_eq!(map.find("two"), None);
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |(k, _)| k.borrow() == key)
            .map(|(k, v)| (k, v))
    }

    /// Returns the key-value pair corresponding to the supplied key. Same as
    /// [`find`](HashMap::find).
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(key)
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, |(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(key).is_some()
    }

    /// Returns a reference to the value corresponding to the key, or
    /// [`KeyNotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    /// use robin_hash::KeyNotFound;
    ///
    /// let map = HashMap::from([(1, "a")]);
    /// assert_eq!(map.at(&1), Ok(&"a"));
    /// assert_eq!(map.at(&2), Err(KeyNotFound));
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).ok_or(KeyNotFound)
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// Inserting may resize the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    ///
    /// let mut counts: HashMap<&str, u32> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts[&"a"], 2);
    /// assert_eq!(counts[&"b"], 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map. Removing an absent key is a no-op.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k.borrow() == key)
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use robin_hash::HashMap;
    ///
    /// let mut map = HashMap::new();
    ///
    /// map.entry(1).or_insert("a");
    /// map.entry(2).or_insert("b");
    /// map.entry(1).or_insert("c");
    ///
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), Some(&"b"));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(slot) => Entry::Occupied(OccupiedEntry { slot }),
            TableEntry::Vacant(slot) => Entry::Vacant(VacantEntry { slot, key }),
        }
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for HashMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// Returns a reference to the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present. Use [`HashMap::at`] for a fallible
    /// lookup.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key does not exist")
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts every pair in order. Pairs whose key is already present are
    /// skipped, so the first occurrence of a key wins.
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl<K, V, const N: usize> From<[(K, V); N]> for HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Builds a map from a list of pairs. As with [`Extend`], the first
    /// occurrence of a duplicated key wins.
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<K: Debug, V: Debug> Debug for Entry<'_, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Entry::Vacant(entry) => f.debug_tuple("Vacant").field(entry.key()).finish(),
            Entry::Occupied(entry) => f
                .debug_tuple("Occupied")
                .field(entry.key())
                .field(entry.get())
                .finish(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Returns the stored value, or inserts `default` into a vacant entry
    /// (possibly growing the map) and returns that.
    pub fn or_insert(self, default: V) -> &'a mut V {
        self.or_insert_with(|| default)
    }

    /// Like [`or_insert`](Entry::or_insert), but only builds the value when
    /// the entry is vacant.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Vacant(vacant) => vacant.insert(default()),
            Entry::Occupied(occupied) => occupied.into_mut(),
        }
    }

    /// Runs `f` on the stored value if there is one. Vacant entries pass
    /// through unchanged.
    pub fn and_modify<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        if let Entry::Occupied(occupied) = &mut self {
            f(occupied.get_mut());
        }
        self
    }

    /// The key this entry was looked up with (vacant) or the stored key
    /// (occupied).
    pub fn key(&self) -> &K {
        match self {
            Entry::Vacant(vacant) => vacant.key(),
            Entry::Occupied(occupied) => occupied.key(),
        }
    }

    /// `or_insert_with(V::default)`.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A slot the key was not found in. Filling it may grow the map.
pub struct VacantEntry<'a, K, V> {
    slot: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// The key that [`insert`](VacantEntry::insert) would store.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Gives the key back without touching the map.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Stores `(key, value)` and returns the value in its final bucket.
    pub fn insert(self, value: V) -> &'a mut V {
        let VacantEntry { slot, key } = self;
        let (_, stored) = slot.insert((key, value));
        stored
    }
}

/// A stored key-value pair found by [`HashMap::entry`].
pub struct OccupiedEntry<'a, K, V> {
    slot: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// The stored key.
    pub fn key(&self) -> &K {
        let (key, _) = self.slot.get();
        key
    }

    /// The stored value.
    pub fn get(&self) -> &V {
        let (_, value) = self.slot.get();
        value
    }

    /// The stored value, mutably.
    pub fn get_mut(&mut self) -> &mut V {
        let (_, value) = self.slot.get_mut();
        value
    }

    /// The stored value, borrowed for as long as the map was.
    pub fn into_mut(self) -> &'a mut V {
        let (_, value) = self.slot.into_mut();
        value
    }

    /// Swaps in `value` and hands back the previous one. The key stays.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Takes the pair out of the map. Later entries in the cluster shift
    /// back and the map may shrink.
    pub fn remove_entry(self) -> (K, V) {
        self.slot.remove()
    }

    /// [`remove_entry`](OccupiedEntry::remove_entry), keeping only the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of a `HashMap`.
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

impl<K, V> FusedIterator for Drain<'_, K, V> {}

/// An owning iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V> {
    inner: crate::hash_table::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;
    use core::hash::BuildHasherDefault;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;
    use test_log::test;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap(),
                k2: rng.try_next_u64().unwrap(),
            }
        }
    }

    /// Hashes a `u64` key to itself so bucket positions are predictable.
    #[derive(Default)]
    struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for &byte in bytes.iter().rev() {
                self.0 = (self.0 << 8) | u64::from(byte);
            }
        }

        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
    }

    type IdentityState = BuildHasherDefault<IdentityHasher>;

    fn keys_in_bucket_order<V, S>(map: &HashMap<u64, V, S>) -> Vec<u64> {
        map.keys().copied().collect()
    }

    #[test]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.capacity(), 0);

        let map2 = HashMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
        assert_eq!(map2.len(), 0);

        let map3: HashMap<i32, String> = HashMap::new();
        assert!(map3.is_empty());
    }

    #[test]
    fn test_hasher_is_returned() {
        let builder = SipHashBuilder { k1: 3, k2: 4 };
        let map: HashMap<u64, u64, _> = HashMap::with_hasher(builder);
        assert_eq!(map.hasher().k1, 3);
        assert_eq!(map.hasher().k2, 4);
        assert_eq!(map.hasher().hash_one(7u64), SipHashBuilder { k1: 3, k2: 4 }.hash_one(7u64));
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        assert!(map.insert(1, "hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);
    }

    #[test]
    fn test_duplicate_insert_is_ignored() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..3u64 {
            assert!(map.insert(i, i * 10));
        }
        let capacity = map.capacity();

        assert!(!map.insert(1, 99));
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&1), Some(&10));
        assert_eq!(map.capacity(), capacity);
    }

    #[test]
    fn test_find_returns_stored_pair() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert("key".to_string(), 5);

        assert_eq!(map.find("key"), Some((&"key".to_string(), &5)));
        assert_eq!(map.find(&"key".to_string()), Some((&"key".to_string(), &5)));
        assert_eq!(map.find("nope"), None);
        assert_eq!(map.get_key_value("key"), map.find("key"));
    }

    #[test]
    fn test_get_mut() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_contains_key() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert!(!map.contains_key(&1));

        map.insert(1, "value".to_string());
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn test_at() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert_eq!(map.at(&1), Err(KeyNotFound));

        map.insert(1, 10);
        assert_eq!(map.at(&1), Ok(&10));
        assert_eq!(map.at(&2), Err(KeyNotFound));
        assert_eq!(KeyNotFound.to_string(), "key does not exist");
    }

    #[test]
    fn test_index() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert("a".to_string(), 1);
        assert_eq!(map["a"], 1);
    }

    #[test]
    #[should_panic(expected = "key does not exist")]
    fn test_index_missing_key_panics() {
        let map: HashMap<u64, u64, SipHashBuilder> = HashMap::default();
        let _ = map[&1];
    }

    #[test]
    fn test_get_or_insert_default() {
        let mut map: HashMap<u64, Vec<u64>, SipHashBuilder> = HashMap::default();

        map.get_or_insert_default(1).push(42);
        map.get_or_insert_default(1).push(24);
        assert_eq!(map.get(&1), Some(&vec![42, 24]));

        assert!(map.get_or_insert_default(2).is_empty());
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_get_or_insert_default_resizes() {
        let mut map: HashMap<u64, u64, IdentityState> = HashMap::default();
        *map.get_or_insert_default(0) += 1;
        assert_eq!(map.capacity(), 2);
        *map.get_or_insert_default(1) += 1;
        assert_eq!(map.capacity(), 4);
        *map.get_or_insert_default(0) += 1;
        assert_eq!(map.get(&0), Some(&2));
        assert_eq!(map.get(&1), Some(&1));
    }

    #[test]
    fn test_remove() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.remove(&1), Some("hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove(&3), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        assert_eq!(map.remove_entry(&1), Some((1, "hello".to_string())));
        assert_eq!(map.len(), 0);
        assert_eq!(map.remove_entry(&1), None);
    }

    #[test]
    fn test_clear() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.len(), 2);
        map.clear();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 0);
        assert!(map.iter().next().is_none());
        assert!(!map.contains_key(&1));
        assert!(!map.contains_key(&2));

        assert!(map.insert(3, "again".to_string()));
        assert_eq!(map.capacity(), 2);
        assert_eq!(map.get(&3), Some(&"again".to_string()));
    }

    #[test]
    fn test_entry_api() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        let value = map.entry(1).or_insert("hello".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        let value = map.entry(1).or_insert("world".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        map.entry(2).or_insert_with(|| "computed".to_string());
        assert_eq!(map.get(&2), Some(&"computed".to_string()));

        map.entry(1)
            .and_modify(|v| v.push_str(" world"))
            .or_insert("default".to_string());
        assert_eq!(map.get(&1), Some(&"hello world".to_string()));

        assert_eq!(map.entry(3).key(), &3);
    }

    #[test]
    fn test_occupied_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), &"hello".to_string());

                *entry.get_mut() = "world".to_string();
                assert_eq!(entry.get(), &"world".to_string());

                let old_value = entry.insert("new".to_string());
                assert_eq!(old_value, "world".to_string());
                assert_eq!(entry.get(), &"new".to_string());

                let (key, value) = entry.remove_entry();
                assert_eq!(key, 1);
                assert_eq!(value, "new".to_string());
            }
            Entry::Vacant(_) => panic!("Expected occupied entry"),
        }

        assert!(map.is_empty());
    }

    #[test]
    fn test_vacant_entry() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        match map.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);

                let value = entry.insert("hello".to_string());
                assert_eq!(value, &"hello".to_string());
            }
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));

        match map.entry(2) {
            Entry::Vacant(entry) => assert_eq!(entry.into_key(), 2),
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_iterators() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        assert_eq!(map.iter().len(), 3);
        let pairs: std::collections::HashMap<i32, String> =
            map.iter().map(|(k, v)| (*k, v.clone())).collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get(&1), Some(&"one".to_string()));
        assert_eq!(pairs.get(&2), Some(&"two".to_string()));
        assert_eq!(pairs.get(&3), Some(&"three".to_string()));

        let keys: std::collections::HashSet<i32> = map.keys().copied().collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&1));
        assert!(keys.contains(&2));
        assert!(keys.contains(&3));

        let values: std::collections::HashSet<String> = map.values().cloned().collect();
        assert_eq!(values.len(), 3);
        assert!(values.contains("one"));
        assert!(values.contains("two"));
        assert!(values.contains("three"));

        for value in map.values_mut() {
            value.push('!');
        }
        for (k, v) in &mut map {
            if *k == 1 {
                v.push('?');
            }
        }
        assert_eq!(map.get(&1), Some(&"one!?".to_string()));
        assert_eq!(map.get(&3), Some(&"three!".to_string()));

        let mut owned: Vec<(i32, String)> = map.into_iter().collect();
        owned.sort();
        assert_eq!(owned[0], (1, "one!?".to_string()));
        assert_eq!(owned.len(), 3);
    }

    #[test]
    fn test_drain() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        let drained: std::collections::HashMap<i32, String> = map.drain().collect();
        assert_eq!(drained.len(), 3);
        assert!(map.is_empty());

        assert_eq!(drained.get(&1), Some(&"one".to_string()));
        assert_eq!(drained.get(&2), Some(&"two".to_string()));
        assert_eq!(drained.get(&3), Some(&"three".to_string()));
    }

    #[test]
    fn test_from_iter_and_extend_keep_first() {
        let map: HashMap<u64, &str, SipHashBuilder> =
            [(1, "a"), (2, "b"), (1, "c")].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&"a"));

        let mut map = map;
        map.extend([(2, "x"), (3, "y")]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&2), Some(&"b"));
        assert_eq!(map.get(&3), Some(&"y"));
    }

    #[test]
    fn test_from_array_literal() {
        let map = HashMap::from([("one", 1), ("two", 2), ("three", 3)]);
        assert_eq!(map.len(), 3);
        assert_eq!(map[&"two"], 2);
    }

    #[test]
    fn test_equality_ignores_layout() {
        let forward: HashMap<u64, u64, SipHashBuilder> = (0..50).map(|i| (i, i * 2)).collect();
        let backward: HashMap<u64, u64, SipHashBuilder> =
            (0..50).rev().map(|i| (i, i * 2)).collect();
        assert_eq!(forward, backward);

        let mut changed = backward.clone();
        *changed.get_mut(&7).unwrap() = 0;
        assert_ne!(forward, changed);
    }

    #[test]
    fn test_debug_format() {
        let mut map: HashMap<u64, &str, IdentityState> = HashMap::default();
        map.insert(2, "b");
        map.insert(1, "a");
        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    fn test_load_factor_stays_in_bounds() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        let check = |map: &HashMap<u64, u64, SipHashBuilder>| {
            if !map.is_empty() {
                let load = map.len() as f64 / map.capacity() as f64;
                assert!(load > 0.2 && load <= 0.8, "load {load} at len {}", map.len());
            }
        };

        for i in 0..2000u64 {
            map.insert(i, i);
            check(&map);
        }
        for i in 0..2000u64 {
            map.remove(&i);
            check(&map);
        }
        assert!(map.is_empty());
        assert!(map.capacity() <= 4);
    }

    #[test]
    fn test_identity_hash_scenario() {
        let mut map: HashMap<u64, u64, IdentityState> = HashMap::default();
        for key in 1..=9u64 {
            map.insert(key, key * 100);
        }
        assert_eq!(map.len(), 9);
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.find(&5), Some((&5, &500)));
        assert_eq!(keys_in_bucket_order(&map), (1..=9).collect::<Vec<_>>());
        assert_eq!(map.probe_histogram().bins(), &[9]);

        // 17 lands on bucket 1 and pushes 2..=9 one bucket along.
        map.insert(17, 1700);
        assert_eq!(map.probe_histogram().bins(), &[1, 9]);
        assert_eq!(
            keys_in_bucket_order(&map),
            vec![1, 17, 2, 3, 4, 5, 6, 7, 8, 9]
        );

        assert_eq!(map.remove(&5), Some(500));
        assert_eq!(map.len(), 9);
        assert_eq!(map.find(&5), None);
        // 6..=9 shift back into their ideal buckets.
        assert_eq!(map.probe_histogram().bins(), &[5, 4]);
        assert_eq!(
            keys_in_bucket_order(&map),
            vec![1, 17, 2, 3, 4, 6, 7, 8, 9]
        );
        for key in [1u64, 2, 3, 4, 6, 7, 8, 9, 17] {
            assert_eq!(map.get(&key), Some(&(key * 100)));
        }
    }

    #[test]
    fn test_remove_inside_colliding_cluster() {
        let mut map: HashMap<u64, u64, IdentityState> = HashMap::default();
        // 3, 19, 35, 51 share bucket 3 of 8; 4 and 5 queue up behind them.
        for key in [3u64, 19, 35, 51, 4, 5] {
            assert!(map.insert(key, key + 1000));
        }
        assert_eq!(map.capacity(), 8);
        assert_eq!(keys_in_bucket_order(&map), vec![5, 19, 35, 3, 51, 4]);
        assert_eq!(map.probe_histogram().bins(), &[1, 1, 1, 3]);

        assert_eq!(map.remove(&35), Some(1035));
        assert_eq!(keys_in_bucket_order(&map), vec![19, 3, 51, 4, 5]);
        assert_eq!(map.probe_histogram().bins(), &[1, 1, 3]);
        // 4 sits closer to home than 35 would, so the miss ends there.
        assert_eq!(map.get(&35), None);

        assert_eq!(map.remove(&19), Some(1019));
        assert_eq!(keys_in_bucket_order(&map), vec![3, 51, 4, 5]);
        assert_eq!(map.probe_histogram().bins(), &[1, 3]);

        assert_eq!(map.remove(&3), Some(1003));
        assert_eq!(keys_in_bucket_order(&map), vec![51, 4, 5]);
        assert_eq!(map.probe_histogram().bins(), &[3]);
        for key in [51u64, 4, 5] {
            assert_eq!(map.get(&key), Some(&(key + 1000)));
        }

        assert_eq!(map.remove(&4), Some(1004));
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.remove(&5), Some(1005));
        assert_eq!(map.capacity(), 4);
        assert_eq!(keys_in_bucket_order(&map), vec![51]);
        assert_eq!(map.probe_histogram().bins(), &[1]);
    }

    #[test]
    fn test_single_home_bucket_cluster() {
        let mut map: HashMap<u64, u64, IdentityState> = HashMap::default();
        let keys: Vec<u64> = (0..20).map(|k| k * 64).collect();
        for &key in &keys {
            assert!(map.insert(key, key));
        }
        assert_eq!(map.capacity(), 32);
        // Every key starts at bucket 0, so each displacement shows up once
        // and ties keep insertion order.
        assert_eq!(map.probe_histogram().bins(), &[1; 20]);
        assert_eq!(keys_in_bucket_order(&map), keys);

        for &key in keys.iter().step_by(2) {
            assert_eq!(map.remove(&key), Some(key));
        }
        let kept: Vec<u64> = keys.iter().copied().skip(1).step_by(2).collect();
        assert_eq!(map.len(), 10);
        assert_eq!(map.capacity(), 32);
        assert_eq!(map.probe_histogram().bins(), &[1; 10]);
        assert_eq!(keys_in_bucket_order(&map), kept);

        for &key in keys.iter().step_by(2) {
            assert!(!map.contains_key(&key));
        }
        for &key in &kept {
            assert_eq!(map.at(&key), Ok(&key));
        }
    }

    #[test]
    fn test_displaced_value_survives_moves() {
        let mut map: HashMap<u64, Vec<u64>, IdentityState> = HashMap::default();
        map.insert(3, vec![3]);
        map.insert(19, vec![19]);
        map.insert(35, vec![35]);
        assert_eq!(map.capacity(), 4);
        assert_eq!(map.probe_histogram().bins(), &[1, 1, 1]);

        // 35 is two buckets from home.
        map.get_mut(&35).unwrap().push(1);

        // Rebuilds the ring at 8 buckets.
        map.insert(51, vec![51]);
        assert_eq!(map.capacity(), 8);
        map.get_mut(&35).unwrap().push(2);

        // Backward shift moves 35 and 3 towards bucket 3.
        assert_eq!(map.remove(&19), Some(vec![19]));
        assert_eq!(map.get(&35), Some(&vec![35, 1, 2]));
        assert_eq!(map.get(&3), Some(&vec![3]));
        assert_eq!(map.get(&51), Some(&vec![51]));
    }

    #[test]
    fn test_str_lookup_across_resizes() {
        let mut map: HashMap<String, usize, SipHashBuilder> =
            HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..200 {
            assert!(map.insert(format!("key-{i}"), i));
        }
        assert_eq!(map.capacity(), 256);

        for i in 10..200 {
            assert_eq!(map.remove(format!("key-{i}").as_str()), Some(i));
        }
        assert_eq!(map.len(), 10);
        assert!(map.capacity() < 64);

        for i in 0..10 {
            let key = format!("key-{i}");
            assert_eq!(map.get(key.as_str()), Some(&i));
            assert_eq!(map.get_key_value(key.as_str()), Some((&key, &i)));
        }
        assert_eq!(map.get("key-10"), None);
    }

    #[test]
    fn test_iterators_stay_exhausted() {
        let mut map: HashMap<u64, u64, IdentityState> = HashMap::default();
        map.extend([(1, 10), (9, 90), (17, 170)]);

        let mut keys = map.keys();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys.by_ref().count(), 3);
        assert_eq!(keys.len(), 0);
        assert_eq!(keys.next(), None);
        assert_eq!(keys.next(), None);

        let mut values = map.values();
        assert_eq!(values.by_ref().count(), 3);
        assert_eq!(values.next(), None);
        assert_eq!(values.next(), None);

        let mut values_mut = map.values_mut();
        values_mut.by_ref().for_each(|v| *v += 1);
        assert_eq!(values_mut.len(), 0);
        assert!(values_mut.next().is_none());
        assert!(values_mut.next().is_none());

        let mut drain = map.drain();
        assert_eq!(drain.len(), 3);
        let mut drained: Vec<_> = drain.by_ref().collect();
        drained.sort_unstable();
        assert_eq!(drained, vec![(1, 11), (9, 91), (17, 171)]);
        assert_eq!(drain.next(), None);
        assert_eq!(drain.next(), None);
        drop(drain);

        map.extend([(2, 20), (4, 40)]);
        let mut into_iter = map.into_iter();
        assert_eq!(into_iter.len(), 2);
        assert_eq!(into_iter.by_ref().count(), 2);
        assert_eq!(into_iter.len(), 0);
        assert_eq!(into_iter.next(), None);
        assert_eq!(into_iter.next(), None);
    }

    #[test]
    fn test_entry_debug() {
        let mut map: HashMap<u64, &str, IdentityState> = HashMap::default();
        map.insert(7, "seven");
        assert_eq!(format!("{:?}", map.entry(7)), r#"Occupied(7, "seven")"#);
        assert_eq!(format!("{:?}", map.entry(8)), "Vacant(8)");
    }
}
