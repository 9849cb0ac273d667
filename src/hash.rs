//! Key hashing: the 32-bit hash functions the tables index with

use std::borrow::Cow;

/// What a key contributes to the default hashers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashInput<'a> {
    /// Integral keys hash to their value truncated to 32 bits
    Integer(i64),
    /// Textual keys are hashed over their UTF-16 code units
    Text(&'a str),
}

/// Keys usable with [`PolynomialHasher`] and [`Djb2Hasher`].
///
/// Other key types can still be stored by passing a closure hasher.
pub trait TableKey: Eq {
    /// Returns the hashing view of this key
    fn hash_input(&self) -> HashInput<'_>;
}

/// Maps a key to a 32-bit hash
pub trait KeyHasher<K: ?Sized> {
    /// Hashes `key`
    fn hash_key(&self, key: &K) -> u32;
}

impl<K: ?Sized, F: Fn(&K) -> u32> KeyHasher<K> for F {
    fn hash_key(&self, key: &K) -> u32 {
        self(key)
    }
}

/// Polynomial string hash with multiplier 31, the default for open addressing.
///
/// Only text goes through the polynomial. Integer keys hash to their own
/// value truncated to 32 bits, so `5` and `"5"` land in different slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolynomialHasher;

impl<K: TableKey + ?Sized> KeyHasher<K> for PolynomialHasher {
    fn hash_key(&self, key: &K) -> u32 {
        match key.hash_input() {
            HashInput::Integer(value) => truncate(value),
            HashInput::Text(text) => polynomial_31(text),
        }
    }
}

/// DJB2 string hash (xor variant), the default for separate chaining
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Djb2Hasher;

impl<K: TableKey + ?Sized> KeyHasher<K> for Djb2Hasher {
    fn hash_key(&self, key: &K) -> u32 {
        match key.hash_input() {
            HashInput::Integer(value) => truncate(value),
            HashInput::Text(text) => djb2(text),
        }
    }
}

/// `h = h * 33 ^ unit` seeded with 5381, wrapping at 32 bits
#[must_use]
pub fn djb2(text: &str) -> u32 {
    text.encode_utf16()
        .fold(5381_u32, |hash, unit| hash.wrapping_mul(33) ^ u32::from(unit))
}

/// `h = 31 * h + unit` seeded with 0, wrapping at 32 bits
#[must_use]
pub fn polynomial_31(text: &str) -> u32 {
    text.encode_utf16()
        .fold(0_u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// Maps a hash into `0..capacity` after clearing the sign bit.
///
/// `capacity` must be non-zero; every table keeps at least one slot.
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn normalize_index(hash: u32, capacity: usize) -> usize {
    (hash & 0x7FFF_FFFF) as usize % capacity.max(1)
}

/// Keeps the low 32 bits, matching a two's complement integer conversion
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn truncate(value: i64) -> u32 {
    value as u32
}

impl TableKey for str {
    fn hash_input(&self) -> HashInput<'_> {
        HashInput::Text(self)
    }
}

impl TableKey for String {
    fn hash_input(&self) -> HashInput<'_> {
        HashInput::Text(self)
    }
}

impl TableKey for Box<str> {
    fn hash_input(&self) -> HashInput<'_> {
        HashInput::Text(self)
    }
}

impl TableKey for Cow<'_, str> {
    fn hash_input(&self) -> HashInput<'_> {
        HashInput::Text(self)
    }
}

impl<T: TableKey + ?Sized> TableKey for &T {
    fn hash_input(&self) -> HashInput<'_> {
        (**self).hash_input()
    }
}

impl TableKey for char {
    fn hash_input(&self) -> HashInput<'_> {
        HashInput::Integer(i64::from(u32::from(*self)))
    }
}

impl TableKey for bool {
    fn hash_input(&self) -> HashInput<'_> {
        HashInput::Integer(i64::from(*self))
    }
}

/// Implements [`TableKey`] for integers that convert losslessly into `i64`
macro_rules! lossless_integer_keys {
    ($($ty:ty),*) => {$(
        impl TableKey for $ty {
            fn hash_input(&self) -> HashInput<'_> {
                HashInput::Integer(i64::from(*self))
            }
        }
    )*};
}

/// Implements [`TableKey`] for integers wider than (or as wide as) `i64`,
/// keeping their two's complement low bits
macro_rules! wrapping_integer_keys {
    ($($ty:ty),*) => {$(
        impl TableKey for $ty {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            fn hash_input(&self) -> HashInput<'_> {
                HashInput::Integer(*self as i64)
            }
        }
    )*};
}

lossless_integer_keys!(i8, i16, i32, i64, u8, u16, u32);
wrapping_integer_keys!(u64, usize, isize, i128, u128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_djb2_known_values() {
        assert_eq!(djb2(""), 5381);
        // 5381 * 33 ^ 'a'
        assert_eq!(djb2("a"), (5381 * 33) ^ 97);
        assert_eq!(djb2("ab"), ((((5381 * 33) ^ 97) * 33) ^ 98));
    }

    #[test]
    fn test_polynomial_matches_java_string_hash() {
        assert_eq!(polynomial_31(""), 0);
        assert_eq!(polynomial_31("a"), 97);
        assert_eq!(polynomial_31("ab"), 97 * 31 + 98);
        // "hello".hashCode() == 99162322
        assert_eq!(polynomial_31("hello"), 99_162_322);
    }

    #[test]
    fn test_integers_truncate() {
        assert_eq!(Djb2Hasher.hash_key(&42_i32), 42);
        assert_eq!(PolynomialHasher.hash_key(&7_u8), 7);
        assert_eq!(Djb2Hasher.hash_key(&-1_i64), u32::MAX);
        assert_eq!(Djb2Hasher.hash_key(&(1_u64 << 32 | 5)), 5);
        assert_eq!(PolynomialHasher.hash_key(&5_u32), 5);
        assert_ne!(PolynomialHasher.hash_key(&5_u32), PolynomialHasher.hash_key("5"));
    }

    #[test]
    fn test_owned_and_borrowed_text_agree() {
        let owned = String::from("key");
        assert_eq!(Djb2Hasher.hash_key(&owned), Djb2Hasher.hash_key("key"));
        assert_eq!(PolynomialHasher.hash_key(&owned), PolynomialHasher.hash_key(&"key"));
    }

    #[test]
    fn test_closure_hasher() {
        let constant = |_: &String| 3_u32;
        assert_eq!(constant.hash_key(&String::from("anything")), 3);
    }

    #[test]
    fn test_normalize_index_masks_sign_bit() {
        assert_eq!(normalize_index(u32::MAX, 8), 0x7FFF_FFFF % 8);
        assert_eq!(normalize_index(0x8000_0003, 7), 3);
        assert_eq!(normalize_index(10, 7), 3);
    }
}
