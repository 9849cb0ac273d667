use std::{borrow::Borrow, fmt, iter, mem, slice};

use crate::{
    config::TableConfig,
    error::TableError,
    hash::{KeyHasher, PolynomialHasher, normalize_index},
    probing::{DoubleHashing, LinearProbing, ProbingStrategy, QuadraticProbing},
    trace::trace,
};

/// One cell of the backing array
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot<K, V> {
    /// Never written since the last resize or clear; terminates searches
    Empty,
    /// Left behind by a removal; keeps probe chains intact
    Tombstone,
    /// Holds a live entry
    Occupied(K, V),
}

impl<K, V> Slot<K, V> {
    /// Borrows the entry if the slot holds one
    fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Self::Occupied(key, value) => Some((key, value)),
            Self::Empty | Self::Tombstone => None,
        }
    }

    /// Consumes the slot, yielding its entry if it held one
    fn into_entry(self) -> Option<(K, V)> {
        match self {
            Self::Occupied(key, value) => Some((key, value)),
            Self::Empty | Self::Tombstone => None,
        }
    }
}

/// Result of walking a key's probe sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The key lives at `index`; `tombstone` is the first tombstone passed on the way
    Found {
        /// Slot holding the key
        index: usize,
        /// Earliest tombstone seen before reaching `index`
        tombstone: Option<usize>,
    },
    /// The key is absent
    Missing {
        /// First tombstone seen, else the empty slot that ended the walk
        vacancy: Option<usize>,
    },
}

/// A hash table resolving collisions inside a single slot array.
///
/// The probe sequence comes from the strategy `S`; removals leave tombstones
/// that are reused by later inserts and only dropped when the table grows.
/// Lookups take `&mut self`: a successful lookup that passed a tombstone
/// moves the entry into that tombstone, which shortens future probe chains
/// without changing the logical contents.
///
/// Note: This implementation is not thread-safe.
#[derive(Debug, Clone)]
pub struct OpenAddressingTable<K, V, S = QuadraticProbing, H = PolynomialHasher> {
    /// Backing array, its length is the capacity
    slots: Vec<Slot<K, V>>,
    /// Capacity and load factor the table was built with
    config: TableConfig,
    /// Used-slot count at which the next insert grows the table
    threshold: usize,
    /// Occupied plus tombstone slots
    used_buckets: usize,
    /// Occupied slots
    key_count: usize,
    /// Bumped on every structural mutation, checked by [`KeyCursor`]
    modification_count: u64,
    /// Probe sequence and capacity policy
    strategy: S,
    /// Key hash function
    hasher: H,
}

/// Open addressing with triangular-number probing over power-of-two capacities
pub type QuadraticProbingTable<K, V, H = PolynomialHasher> =
    OpenAddressingTable<K, V, QuadraticProbing, H>;
/// Open addressing with a fixed-stride linear probe
pub type LinearProbingTable<K, V, H = PolynomialHasher> =
    OpenAddressingTable<K, V, LinearProbing, H>;
/// Open addressing with a per-key secondary step over prime capacities
pub type DoubleHashingTable<K, V, H = PolynomialHasher> =
    OpenAddressingTable<K, V, DoubleHashing, H>;

impl<K, V, S, H> Default for OpenAddressingTable<K, V, S, H>
where
    S: ProbingStrategy + Default,
    H: Default,
{
    fn default() -> Self {
        Self::with_default_config(H::default())
    }
}

impl<K, V, S> OpenAddressingTable<K, V, S, PolynomialHasher>
where
    S: ProbingStrategy + Default,
{
    /// Creates an empty table with the default capacity (7) and load factor (0.65)
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_config(PolynomialHasher)
    }

    /// Creates an empty table with room for at least `capacity` slots
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::InvalidArgument`] when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::with_config(TableConfig { capacity, ..TableConfig::OPEN_ADDRESSING })
    }

    /// Creates an empty table from an explicit capacity and load factor
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::InvalidArgument`] for a zero capacity or a
    /// non-finite or non-positive load factor, and with
    /// [`TableError::CapacityOverflow`] if the strategy cannot fit the capacity.
    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        Self::with_strategy(config, S::default(), PolynomialHasher)
    }
}

impl<K, V, S, H> OpenAddressingTable<K, V, S, H>
where
    S: ProbingStrategy + Default,
{
    /// Creates an empty table that hashes keys with `hasher`
    ///
    /// # Errors
    ///
    /// Same as [`OpenAddressingTable::with_config`].
    pub fn with_hasher(config: TableConfig, hasher: H) -> Result<Self, TableError> {
        Self::with_strategy(config, S::default(), hasher)
    }

    /// Default capacity and load factor with the given hash function
    fn with_default_config(hasher: H) -> Self {
        let config = TableConfig::OPEN_ADDRESSING;
        let strategy = S::default();
        let capacity = strategy.adjust_capacity(config.capacity).unwrap_or(config.capacity);
        Self::from_parts(config, capacity, strategy, hasher)
    }
}

impl<K, V, S, H> OpenAddressingTable<K, V, S, H>
where
    S: ProbingStrategy,
{
    /// Creates an empty table with an explicit strategy and hash function
    ///
    /// # Errors
    ///
    /// Same as [`OpenAddressingTable::with_config`].
    pub fn with_strategy(config: TableConfig, strategy: S, hasher: H) -> Result<Self, TableError> {
        let config = config.validate()?;
        let requested = config.capacity.max(TableConfig::OPEN_ADDRESSING.capacity);
        let capacity = strategy
            .adjust_capacity(requested)
            .filter(|&capacity| capacity <= Self::max_capacity())
            .ok_or(TableError::CapacityOverflow { capacity: requested })?;
        Ok(Self::from_parts(config, capacity, strategy, hasher))
    }

    /// Assembles an empty table of exactly `capacity` slots
    fn from_parts(config: TableConfig, capacity: usize, strategy: S, hasher: H) -> Self {
        Self {
            slots: empty_slots(capacity),
            config,
            threshold: Self::threshold_for(&config, capacity),
            used_buckets: 0,
            key_count: 0,
            modification_count: 0,
            strategy,
            hasher,
        }
    }

    /// Largest slot count a `Vec<Slot<K, V>>` can address
    #[allow(clippy::arithmetic_side_effects, clippy::cast_sign_loss)]
    fn max_capacity() -> usize {
        isize::MAX as usize / mem::size_of::<Slot<K, V>>().max(1)
    }

    /// Admission threshold, kept below `capacity` so one empty slot always survives
    fn threshold_for(config: &TableConfig, capacity: usize) -> usize {
        config.threshold(capacity).min(capacity.saturating_sub(1))
    }

    /// Inserts a key-value pair, returning the value it replaced.
    ///
    /// Grows the table first when the used-slot count has reached the
    /// threshold. A replaced entry keeps its original key.
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::CapacityOverflow`] if growth is needed but
    /// the next capacity is not addressable; the table is left unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError>
    where
        K: Eq,
        H: KeyHasher<K>,
    {
        if self.used_buckets >= self.threshold {
            self.resize()?;
        }

        match self.find(&key) {
            Probe::Found { index, tombstone } => {
                let previous = self.replace_slot(index, Slot::Tombstone).into_entry();
                let target = tombstone.unwrap_or(index);
                self.bump();
                match previous {
                    Some((old_key, old_value)) => {
                        self.replace_slot(target, Slot::Occupied(old_key, value));
                        Ok(Some(old_value))
                    }
                    None => {
                        self.replace_slot(target, Slot::Occupied(key, value));
                        Ok(None)
                    }
                }
            }
            Probe::Missing { vacancy: Some(index) } => {
                if matches!(self.replace_slot(index, Slot::Occupied(key, value)), Slot::Empty) {
                    self.used_buckets = self.used_buckets.saturating_add(1);
                }
                self.key_count = self.key_count.saturating_add(1);
                self.bump();
                Ok(None)
            }
            Probe::Missing { vacancy: None } => {
                // Every slot walked was live: grow and try again.
                self.resize()?;
                self.insert(key, value)
            }
        }
    }

    /// Alias of [`OpenAddressingTable::insert`]
    ///
    /// # Errors
    ///
    /// Same as [`OpenAddressingTable::insert`].
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, TableError>
    where
        K: Eq,
        H: KeyHasher<K>,
    {
        self.insert(key, value)
    }

    /// Retrieves the value for `key`.
    ///
    /// May relocate the entry into an earlier tombstone; the logical contents
    /// never change.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let index = self.locate(key)?;
        match self.slots.get(index) {
            Some(Slot::Occupied(_, value)) => Some(value),
            _ => None,
        }
    }

    /// Retrieves a mutable reference to the value for `key`, compacting like [`Self::get`]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let index = self.locate(key)?;
        match self.slots.get_mut(index) {
            Some(Slot::Occupied(_, value)) => Some(value),
            _ => None,
        }
    }

    /// Returns true if `key` is present, compacting like [`Self::get`]
    pub fn contains_key<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.locate(key).is_some()
    }

    /// Removes `key`, leaving a tombstone in its slot
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let Probe::Found { index, .. } = self.find(key) else {
            return None;
        };
        let (_, value) = self.replace_slot(index, Slot::Tombstone).into_entry()?;
        self.key_count = self.key_count.saturating_sub(1);
        self.bump();
        Some(value)
    }

    /// Number of slots visited to resolve `key`, hit or miss.
    ///
    /// Unlike [`Self::get`] this never relocates anything.
    pub fn probe_length<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: Clone,
        H: KeyHasher<Q>,
    {
        let mut strategy = self.strategy.clone();
        let hash = self.hasher.hash_key(key);
        walk(&self.slots, &mut strategy, hash, key).1
    }

    /// Walks the probe sequence of `key`
    fn find<Q>(&mut self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let hash = self.hasher.hash_key(key);
        walk(&self.slots, &mut self.strategy, hash, key).0
    }

    /// Finds `key` and moves it into the first tombstone passed, if any
    fn locate<Q>(&mut self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        match self.find(key) {
            Probe::Found { index, tombstone: Some(tombstone) } => {
                self.slots.swap(index, tombstone);
                self.bump();
                Some(tombstone)
            }
            Probe::Found { index, tombstone: None } => Some(index),
            Probe::Missing { .. } => None,
        }
    }

    /// Grows the table and reinserts every live entry; tombstones are dropped here.
    ///
    /// Every entry is placed in a scratch array first, so a strategy whose
    /// walk cannot seat an entry fails the resize before anything moves.
    fn resize(&mut self) -> Result<(), TableError>
    where
        K: Eq,
        H: KeyHasher<K>,
    {
        let capacity = self.slots.len();
        let overflow = TableError::CapacityOverflow { capacity };
        let grown = self
            .strategy
            .increase_capacity(capacity)
            .and_then(|grown| self.strategy.adjust_capacity(grown))
            .filter(|&grown| grown <= Self::max_capacity())
            .ok_or(overflow)?;

        let mut targets = Vec::with_capacity(self.key_count);
        {
            let mut seated: Vec<Slot<&K, ()>> = empty_slots(grown);
            for (key, _) in self.slots.iter().filter_map(Slot::entry) {
                let hash = self.hasher.hash_key(key);
                let Probe::Missing { vacancy: Some(index) } =
                    walk(&seated, &mut self.strategy, hash, key).0
                else {
                    return Err(overflow);
                };
                if let Some(slot) = seated.get_mut(index) {
                    *slot = Slot::Occupied(key, ());
                }
                targets.push(index);
            }
        }

        trace!(
            from = capacity,
            to = grown,
            keys = self.key_count,
            reclaimed = self.tombstones(),
            "growing open addressing table"
        );

        let old_slots = mem::replace(&mut self.slots, empty_slots(grown));
        self.threshold = Self::threshold_for(&self.config, grown);
        for ((key, value), index) in old_slots.into_iter().filter_map(Slot::into_entry).zip(targets) {
            self.replace_slot(index, Slot::Occupied(key, value));
        }
        self.used_buckets = self.key_count;
        self.bump();
        Ok(())
    }

    /// Writes `slot` at `index`, returning what was there
    fn replace_slot(&mut self, index: usize, slot: Slot<K, V>) -> Slot<K, V> {
        match self.slots.get_mut(index) {
            Some(current) => mem::replace(current, slot),
            None => Slot::Empty,
        }
    }

    /// Records a structural mutation
    fn bump(&mut self) {
        self.modification_count = self.modification_count.wrapping_add(1);
    }
}

impl<K, V, S, H> OpenAddressingTable<K, V, S, H> {
    /// Removes every entry and tombstone, keeping the capacity
    pub fn clear(&mut self) {
        trace!(capacity = self.slots.len(), keys = self.key_count, "clearing open addressing table");
        self.slots.fill_with(|| Slot::Empty);
        self.key_count = 0;
        self.used_buckets = 0;
        self.modification_count = self.modification_count.wrapping_add(1);
    }

    /// Number of live keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.key_count
    }

    /// Returns true if the table holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    /// Number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Occupied plus tombstone slots
    #[must_use]
    pub fn used_buckets(&self) -> usize {
        self.used_buckets
    }

    /// Slots holding a tombstone
    #[must_use]
    pub fn tombstones(&self) -> usize {
        self.used_buckets.saturating_sub(self.key_count)
    }

    /// Current ratio of used slots to capacity
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.used_buckets as f64 / self.slots.len().max(1) as f64
    }

    /// Load factor the table was configured with
    #[must_use]
    pub fn max_load_factor(&self) -> f64 {
        self.config.load_factor
    }

    /// Structural mutation counter
    #[must_use]
    pub fn modification_count(&self) -> u64 {
        self.modification_count
    }

    /// Iterates over the entries in slot order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: self.slots.iter(), remaining: self.key_count }
    }

    /// Iterates over the keys in slot order
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Iterates over the values in slot order
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Starts a detached, fail-fast walk over the keys.
    ///
    /// The cursor does not borrow the table, so the table may be mutated
    /// between steps; the next step then reports
    /// [`TableError::ConcurrentModification`].
    ///
    /// A lookup that moves an entry into an earlier tombstone also counts as
    /// a mutation, so interleaving [`Self::get`], [`Self::get_mut`] or
    /// [`Self::contains_key`] with a walk can end it the same way.
    #[must_use]
    pub fn cursor(&self) -> KeyCursor {
        KeyCursor { expected: self.modification_count, index: 0, remaining: self.key_count }
    }
}

/// Walks the probe sequence of `key` over `slots`, returning the outcome and
/// the number of slots visited
#[allow(clippy::arithmetic_side_effects)]
fn walk<K, V, Q, S>(slots: &[Slot<K, V>], strategy: &mut S, hash: u32, key: &Q) -> (Probe, usize)
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
    S: ProbingStrategy,
{
    let capacity = slots.len();
    strategy.setup(hash, capacity);
    let offset = normalize_index(hash, capacity);
    let mut tombstone = None;

    for attempt in 0..capacity {
        let index = match attempt {
            0 => offset,
            // Both terms are below `capacity`, which is at most `isize::MAX`.
            _ => (offset + strategy.probe(attempt) % capacity) % capacity,
        };
        let visited = attempt.saturating_add(1);
        match slots.get(index) {
            Some(Slot::Tombstone) => {
                tombstone.get_or_insert(index);
            }
            Some(Slot::Occupied(candidate, _)) if candidate.borrow() == key => {
                return (Probe::Found { index, tombstone }, visited);
            }
            Some(Slot::Occupied(..)) => {}
            Some(Slot::Empty) => {
                return (Probe::Missing { vacancy: tombstone.or(Some(index)) }, visited);
            }
            None => return (Probe::Missing { vacancy: tombstone }, visited),
        }
    }

    (Probe::Missing { vacancy: tombstone }, capacity)
}

/// A fresh array of `capacity` empty slots
fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    iter::repeat_with(|| Slot::Empty).take(capacity).collect()
}

impl<K: fmt::Display, V: fmt::Display, S, H> fmt::Display for OpenAddressingTable<K, V, S, H> {
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

impl<'a, K, V, S, H> IntoIterator for &'a OpenAddressingTable<K, V, S, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over the entries of an [`OpenAddressingTable`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Remaining slots
    slots: slice::Iter<'a, Slot<K, V>>,
    /// Live entries not yet yielded
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(key, value) = slot {
                self.remaining = self.remaining.saturating_sub(1);
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Borrowing iterator over the keys of an [`OpenAddressingTable`]
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

/// Borrowing iterator over the values of an [`OpenAddressingTable`]
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

/// Detached key walk over an [`OpenAddressingTable`] that fails fast on mutation.
///
/// Created by [`OpenAddressingTable::cursor`]. It snapshots the table's
/// modification count; every step compares it against the live count and
/// yields [`TableError::ConcurrentModification`] once they differ. The
/// cursor is one-pass and must be driven with the table that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCursor {
    /// Modification count at creation
    expected: u64,
    /// Next slot to inspect
    index: usize,
    /// Keys not yet yielded
    remaining: usize,
}

impl KeyCursor {
    /// Advances to the next key in slot order
    pub fn next<'t, K, V, S, H>(
        &mut self,
        table: &'t OpenAddressingTable<K, V, S, H>,
    ) -> Option<Result<&'t K, TableError>> {
        if table.modification_count != self.expected {
            return Some(Err(TableError::ConcurrentModification));
        }
        if self.remaining == 0 {
            return None;
        }
        while let Some(slot) = table.slots.get(self.index) {
            self.index = self.index.saturating_add(1);
            if let Slot::Occupied(key, _) = slot {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(Ok(key));
            }
        }
        None
    }
}
