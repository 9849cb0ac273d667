//! # Hash Table Engine
//!
//! Two interchangeable hash tables behind one map contract:
//!
//! - `OpenAddressingTable`: a single slot array; collisions follow a pluggable
//!   probe sequence (`QuadraticProbing`, `LinearProbing`, `DoubleHashing`) and
//!   removals leave tombstones that are reclaimed when the table grows
//! - `SeparateChainingTable`: an array of buckets, each a list of entries in
//!   insertion order
//!
//! Both tables are single-threaded. Open addressing offers a fail-fast
//! `KeyCursor` that reports `TableError::ConcurrentModification` when the table
//! changes mid-walk; the chaining `ChainCursor` performs no such check.
//!
//! ## Basic Usage
//!
//! ```rust
//! use hashtable_engine::QuadraticProbingTable;
//!
//! let mut table = QuadraticProbingTable::new();
//!
//! // Insert values
//! table.insert("apple".to_string(), 1)?;
//! table.insert("banana".to_string(), 2)?;
//!
//! // Retrieve values (lookups may compact probe chains, hence `&mut`)
//! assert_eq!(table.get("apple"), Some(&1));
//!
//! // Update values
//! assert_eq!(table.insert("apple".to_string(), 10)?, Some(1));
//!
//! // Remove values
//! assert_eq!(table.remove("apple"), Some(10));
//! assert_eq!(table.get("apple"), None);
//! assert_eq!(table.to_string(), "{banana => 2}");
//! # Ok::<(), hashtable_engine::TableError>(())
//! ```
//!
//! ## Fail-fast Iteration
//!
//! ```rust
//! use hashtable_engine::{QuadraticProbingTable, TableError};
//!
//! let mut table = QuadraticProbingTable::new();
//! table.insert(1_u32, "one")?;
//! table.insert(2_u32, "two")?;
//!
//! let mut cursor = table.cursor();
//! assert!(cursor.next(&table).is_some());
//! table.insert(3, "three")?;
//! assert_eq!(cursor.next(&table), Some(Err(TableError::ConcurrentModification)));
//! # Ok::<(), TableError>(())
//! ```
//!
//! ## Separate Chaining with a Custom Hash
//!
//! ```rust
//! use hashtable_engine::{SeparateChainingTable, TableConfig};
//!
//! let by_length = |key: &String| key.len() as u32;
//! let mut table = SeparateChainingTable::with_config_and_hasher(TableConfig::SEPARATE_CHAINING, by_length)?;
//! table.insert("one".to_string(), 1)?;
//! table.insert("two".to_string(), 2)?;
//! assert_eq!(table.get(&"two".to_string()), Some(&2));
//! # Ok::<(), hashtable_engine::TableError>(())
//! ```

/// Capacity and load factor parameters
mod config;
/// Error taxonomy
mod error;
/// Key hash functions
mod hash;
/// Table with in-array collision resolution and tombstones
mod open_addressing;
/// Probe sequence strategies for open addressing
pub mod probing;
/// Table with per-bucket entry lists
mod separate_chaining;
/// Logging shim over `tracing`
mod trace;
/// The shared map contract
mod utils;

pub use config::TableConfig;
pub use error::{InvalidArgument, TableError};
pub use hash::{
    Djb2Hasher, HashInput, KeyHasher, PolynomialHasher, TableKey, djb2, normalize_index,
    polynomial_31,
};
pub use open_addressing::{
    DoubleHashingTable, KeyCursor, LinearProbingTable, OpenAddressingTable, QuadraticProbingTable,
};
pub use probing::{DoubleHashing, LinearProbing, ProbingStrategy, QuadraticProbing};
pub use separate_chaining::{ChainCursor, SeparateChainingTable};
pub use utils::{HashTable, from_pairs};

/// Borrowing iterators over an [`OpenAddressingTable`]
pub mod open_addressing_iter {
    pub use crate::open_addressing::{Iter, Keys, Values};
}

/// Borrowing iterators over a [`SeparateChainingTable`]
pub mod separate_chaining_iter {
    pub use crate::separate_chaining::{Iter, Keys, Values};
}
