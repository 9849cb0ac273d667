//! The map contract shared by both table variants

use crate::{
    OpenAddressingTable, SeparateChainingTable, error::TableError, hash::KeyHasher,
    probing::ProbingStrategy,
};

/// Operations every table variant supports.
///
/// Lookups take `&mut self` because open addressing may compact its probe
/// chains while reading; separate chaining simply ignores the extra access.
pub trait HashTable<K, V> {
    /// Inserts a key-value pair, returning the replaced value
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::CapacityOverflow`] if the table cannot grow.
    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError>;

    /// Retrieves the value for `key`
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Removes `key`, returning its value
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Returns true if `key` is present
    fn contains_key(&mut self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries
    fn len(&self) -> usize;

    /// Returns true if the table holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry, keeping the capacity
    fn clear(&mut self);

    /// Visits every entry in storage order
    fn for_each_entry(&self, visit: &mut dyn FnMut(&K, &V));

    /// Alias of [`HashTable::insert`]
    ///
    /// # Errors
    ///
    /// Same as [`HashTable::insert`].
    fn put(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        self.insert(key, value)
    }

    /// Returns the keys as a Vec, in storage order
    fn keys_cloned(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut keys = Vec::with_capacity(self.len());
        self.for_each_entry(&mut |key, _| keys.push(key.clone()));
        keys
    }

    /// Returns the values as a Vec, in storage order
    fn values_cloned(&self) -> Vec<V>
    where
        V: Clone,
    {
        let mut values = Vec::with_capacity(self.len());
        self.for_each_entry(&mut |_, value| values.push(value.clone()));
        values
    }

    /// Inserts every pair of `iter`, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Same as [`HashTable::insert`].
    fn insert_all<I>(&mut self, iter: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        Self: Sized,
    {
        for (key, value) in iter {
            self.insert(key, value)?;
        }
        Ok(())
    }
}

impl<K, V, S, H> HashTable<K, V> for OpenAddressingTable<K, V, S, H>
where
    K: Eq,
    S: ProbingStrategy,
    H: KeyHasher<K>,
{
    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        Self::insert(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        Self::get(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        Self::remove(self, key)
    }

    fn contains_key(&mut self, key: &K) -> bool {
        Self::contains_key(self, key)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(&K, &V)) {
        self.iter().for_each(|(key, value)| visit(key, value));
    }
}

impl<K, V, H> HashTable<K, V> for SeparateChainingTable<K, V, H>
where
    K: Eq,
    H: KeyHasher<K>,
{
    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        Self::insert(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        Self::get(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        Self::remove(self, key)
    }

    fn contains_key(&mut self, key: &K) -> bool {
        Self::contains_key(self, key)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(&K, &V)) {
        self.iter().for_each(|(key, value)| visit(key, value));
    }
}

/// Builds a table of type `T` from key-value pairs
///
/// # Errors
///
/// Same as [`HashTable::insert`].
pub fn from_pairs<T, K, V, I>(iter: I) -> Result<T, TableError>
where
    T: HashTable<K, V> + Default,
    I: IntoIterator<Item = (K, V)>,
{
    let mut table = T::default();
    table.insert_all(iter)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinearProbingTable, QuadraticProbingTable};

    /// Exercises the contract the same way against any table
    fn check_contract<T: HashTable<String, i32>>(mut table: T) {
        assert!(HashTable::is_empty(&table));
        table.insert_all(vec![("a".to_string(), 1), ("b".to_string(), 2)]).unwrap();
        assert_eq!(HashTable::put(&mut table, "a".to_string(), 10), Ok(Some(1)));

        assert_eq!(HashTable::get(&mut table, &"a".to_string()), Some(&10));
        assert!(HashTable::contains_key(&mut table, &"b".to_string()));
        assert_eq!(HashTable::remove(&mut table, &"b".to_string()), Some(2));
        assert_eq!(HashTable::remove(&mut table, &"b".to_string()), None);
        assert_eq!(HashTable::len(&table), 1);

        assert_eq!(table.keys_cloned(), vec!["a".to_string()]);
        assert_eq!(table.values_cloned(), vec![10]);

        HashTable::clear(&mut table);
        assert!(HashTable::is_empty(&table));
    }

    #[test]
    fn test_contract_on_every_variant() {
        check_contract(QuadraticProbingTable::new());
        check_contract(LinearProbingTable::new());
        check_contract(SeparateChainingTable::new());
    }

    #[test]
    fn test_from_pairs() {
        let data = vec![("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 3)];

        let mut table: SeparateChainingTable<String, i32> = from_pairs(data).unwrap();

        assert_eq!(table.get("a"), Some(&1));
        assert_eq!(table.get("b"), Some(&2));
        assert_eq!(table.get("c"), Some(&3));
        assert_eq!(HashTable::len(&table), 3);
        assert_eq!(table.get_mut("c").map(|value| *value), Some(3));
    }

    #[test]
    fn test_keys_and_values() {
        let mut table = QuadraticProbingTable::new();
        table.insert("a".to_string(), 1).unwrap();
        table.insert("b".to_string(), 2).unwrap();
        table.insert("c".to_string(), 3).unwrap();

        let mut keys = table.keys_cloned();
        keys.sort(); // Sort for predictable comparison

        let mut values = table.values_cloned();
        values.sort_unstable();

        assert_eq!(keys, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(values, vec![1, 2, 3]);
    }
}
