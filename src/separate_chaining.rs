use std::{borrow::Borrow, fmt, mem, slice};

use crate::{
    config::TableConfig,
    error::TableError,
    hash::{Djb2Hasher, KeyHasher, normalize_index},
    trace::trace,
};

/// A key-value pair together with the key's cached hash
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry<K, V> {
    /// Hash of `key`, reused when the table grows
    hash: u32,
    /// The key in the key-value pair
    key: K,
    /// The value associated with the key
    value: V,
}

impl<K, V> Entry<K, V> {
    /// Identity check: hashes first, then keys
    fn matches<Q>(&self, hash: u32, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.hash == hash && self.key.borrow() == key
    }
}

/// A hash table keeping colliding entries in per-bucket lists.
///
/// Entries within a bucket stay in insertion order until the table grows.
/// The table doubles once its size exceeds `capacity × load_factor`.
///
/// Iteration is not checked against concurrent mutation: a [`ChainCursor`]
/// driven across a mutation may skip or repeat keys.
#[derive(Debug, Clone)]
pub struct SeparateChainingTable<K, V, H = Djb2Hasher> {
    /// One entry list per bucket, its length is the capacity
    buckets: Vec<Vec<Entry<K, V>>>,
    /// Capacity and load factor the table was built with
    config: TableConfig,
    /// Size above which the table grows
    threshold: usize,
    /// Total entries across all buckets
    size: usize,
    /// Key hash function
    hasher: H,
}

impl<K, V, H: Default> Default for SeparateChainingTable<K, V, H> {
    fn default() -> Self {
        let config = TableConfig::SEPARATE_CHAINING;
        Self::from_parts(config, config.capacity, H::default())
    }
}

impl<K, V> SeparateChainingTable<K, V, Djb2Hasher> {
    /// Creates an empty table with the default capacity (3) and load factor (0.75)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with at least `capacity` buckets
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::InvalidArgument`] when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::with_config(TableConfig { capacity, ..TableConfig::SEPARATE_CHAINING })
    }

    /// Creates an empty table from an explicit capacity and load factor
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::InvalidArgument`] for a zero capacity or a
    /// non-finite or non-positive load factor.
    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        Self::with_config_and_hasher(config, Djb2Hasher)
    }
}

impl<K, V, H> SeparateChainingTable<K, V, H> {
    /// Creates an empty table that hashes keys with `hasher`
    ///
    /// # Errors
    ///
    /// Same as [`SeparateChainingTable::with_config`].
    pub fn with_config_and_hasher(config: TableConfig, hasher: H) -> Result<Self, TableError> {
        let config = config.validate()?;
        let capacity = config.capacity.max(TableConfig::SEPARATE_CHAINING.capacity);
        if capacity > Self::max_capacity() {
            return Err(TableError::CapacityOverflow { capacity });
        }
        Ok(Self::from_parts(config, capacity, hasher))
    }

    /// Assembles an empty table of exactly `capacity` buckets
    fn from_parts(config: TableConfig, capacity: usize, hasher: H) -> Self {
        Self {
            buckets: empty_buckets(capacity),
            config,
            threshold: config.threshold(capacity),
            size: 0,
            hasher,
        }
    }

    /// Largest bucket count a `Vec` of buckets can address
    #[allow(clippy::arithmetic_side_effects, clippy::cast_sign_loss)]
    fn max_capacity() -> usize {
        isize::MAX as usize / mem::size_of::<Vec<Entry<K, V>>>().max(1)
    }

    /// Inserts a key-value pair, returning the value it replaced.
    ///
    /// A new entry is appended to its bucket; the table doubles when the
    /// size then exceeds the threshold.
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::CapacityOverflow`] if the insert would need
    /// a table larger than addressable memory; the table is left unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError>
    where
        K: Eq,
        H: KeyHasher<K>,
    {
        let hash = self.hasher.hash_key(&key);
        if let Some(entry) = self.bucket_mut(hash).iter_mut().find(|entry| entry.matches(hash, &key)) {
            return Ok(Some(mem::replace(&mut entry.value, value)));
        }

        let size = self.size.saturating_add(1);
        let grown = if size > self.threshold { Some(self.grown_capacity()?) } else { None };

        self.bucket_mut(hash).push(Entry { hash, key, value });
        self.size = size;
        if let Some(capacity) = grown {
            self.resize(capacity);
        }
        Ok(None)
    }

    /// Alias of [`SeparateChainingTable::insert`]
    ///
    /// # Errors
    ///
    /// Same as [`SeparateChainingTable::insert`].
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, TableError>
    where
        K: Eq,
        H: KeyHasher<K>,
    {
        self.insert(key, value)
    }

    /// Retrieves the value for `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let hash = self.hasher.hash_key(key);
        self.bucket(hash).iter().find(|entry| entry.matches(hash, key)).map(|entry| &entry.value)
    }

    /// Retrieves a mutable reference to the value for `key`
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let hash = self.hasher.hash_key(key);
        self.bucket_mut(hash)
            .iter_mut()
            .find(|entry| entry.matches(hash, key))
            .map(|entry| &mut entry.value)
    }

    /// Returns true if `key` is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.get(key).is_some()
    }

    /// Removes `key`, splicing its entry out of the bucket
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let hash = self.hasher.hash_key(key);
        let bucket = self.bucket_mut(hash);
        let position = bucket.iter().position(|entry| entry.matches(hash, key))?;
        let entry = bucket.remove(position);
        self.size = self.size.saturating_sub(1);
        Some(entry.value)
    }

    /// Removes every entry, keeping the capacity
    pub fn clear(&mut self) {
        trace!(capacity = self.buckets.len(), keys = self.size, "clearing separate chaining table");
        self.buckets.iter_mut().for_each(Vec::clear);
        self.size = 0;
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the table holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of buckets
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Current ratio of entries to buckets
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.buckets.len().max(1) as f64
    }

    /// Load factor the table was configured with
    #[must_use]
    pub fn max_load_factor(&self) -> f64 {
        self.config.load_factor
    }

    /// Length of every bucket, in bucket order
    #[must_use]
    pub fn bucket_lengths(&self) -> Vec<usize> {
        self.buckets.iter().map(Vec::len).collect()
    }

    /// Iterates over the entries, bucket by bucket, in insertion order within a bucket
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { buckets: self.buckets.iter(), entries: slice::Iter::default(), remaining: self.size }
    }

    /// Iterates over the keys in [`Self::iter`] order
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Iterates over the values in [`Self::iter`] order
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Starts a detached key walk with no modification check
    #[must_use]
    pub fn cursor(&self) -> ChainCursor {
        ChainCursor { bucket: 0, position: 0 }
    }

    /// Bucket a hash maps to
    #[allow(clippy::indexing_slicing)]
    fn bucket(&self, hash: u32) -> &[Entry<K, V>] {
        // normalize_index stays below the non-zero bucket count
        &self.buckets[normalize_index(hash, self.buckets.len())]
    }

    /// Mutable bucket a hash maps to
    #[allow(clippy::indexing_slicing)]
    fn bucket_mut(&mut self, hash: u32) -> &mut Vec<Entry<K, V>> {
        let index = normalize_index(hash, self.buckets.len());
        &mut self.buckets[index]
    }

    /// Capacity after one doubling
    fn grown_capacity(&self) -> Result<usize, TableError> {
        let capacity = self.buckets.len();
        capacity
            .checked_mul(2)
            .filter(|&grown| grown <= Self::max_capacity())
            .ok_or(TableError::CapacityOverflow { capacity })
    }

    /// Rehashes every entry into `capacity` fresh buckets
    fn resize(&mut self, capacity: usize) {
        trace!(from = self.buckets.len(), to = capacity, keys = self.size, "growing separate chaining table");
        let old_buckets = mem::replace(&mut self.buckets, empty_buckets(capacity));
        self.threshold = self.config.threshold(capacity);
        for entry in old_buckets.into_iter().flatten() {
            self.bucket_mut(entry.hash).push(entry);
        }
    }
}

/// `capacity` empty buckets
fn empty_buckets<K, V>(capacity: usize) -> Vec<Vec<Entry<K, V>>> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, Vec::new);
    buckets
}

impl<K: fmt::Display, V: fmt::Display, H> fmt::Display for SeparateChainingTable<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (position, (key, value)) in self.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key} => {value}")?;
        }
        f.write_str("}")
    }
}

impl<'a, K, V, H> IntoIterator for &'a SeparateChainingTable<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over the entries of a [`SeparateChainingTable`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Buckets not yet entered
    buckets: slice::Iter<'a, Vec<Entry<K, V>>>,
    /// Rest of the current bucket
    entries: slice::Iter<'a, Entry<K, V>>,
    /// Entries not yet yielded
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.entries.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some((&entry.key, &entry.value));
            }
            self.entries = self.buckets.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Borrowing iterator over the keys of a [`SeparateChainingTable`]
#[derive(Debug, Clone)]
pub struct Keys<'a, K, V> {
    /// Entry iterator being projected
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Borrowing iterator over the values of a [`SeparateChainingTable`]
#[derive(Debug, Clone)]
pub struct Values<'a, K, V> {
    /// Entry iterator being projected
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Detached key walk over a [`SeparateChainingTable`].
///
/// Unlike [`crate::KeyCursor`] it performs no modification check: after the
/// table changes, the walk resumes at the same bucket position and may skip
/// or repeat keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainCursor {
    /// Bucket being walked
    bucket: usize,
    /// Next position within that bucket
    position: usize,
}

impl ChainCursor {
    /// Advances to the next key, bucket by bucket
    pub fn next<'t, K, V, H>(&mut self, table: &'t SeparateChainingTable<K, V, H>) -> Option<&'t K> {
        while let Some(bucket) = table.buckets.get(self.bucket) {
            if let Some(entry) = bucket.get(self.position) {
                self.position = self.position.saturating_add(1);
                return Some(&entry.key);
            }
            self.bucket = self.bucket.saturating_add(1);
            self.position = 0;
        }
        None
    }
}
