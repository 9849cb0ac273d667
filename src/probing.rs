//! Probe sequences for [`crate::OpenAddressingTable`].
//!
//! A strategy turns an attempt counter `x = 1, 2, 3, ...` into an offset
//! `f(x)`; the table visits `(canonical + f(x)) mod capacity`. Each strategy
//! also owns the capacity rule that guarantees its sequence reaches every
//! slot, so a probe walk over a table with at least one empty slot always
//! terminates.

/// Collision resolution policy for open addressing
pub trait ProbingStrategy {
    /// Prepares the sequence for one operation on a key with the given hash.
    ///
    /// Called once per operation before the probe loop starts.
    fn setup(&mut self, _hash: u32, _capacity: usize) {}

    /// Offset of the `attempt`-th probe relative to the canonical slot.
    ///
    /// The table reduces the offset modulo the capacity, so it only has to be
    /// correct modulo the capacity passed to [`ProbingStrategy::setup`].
    fn probe(&self, attempt: usize) -> usize;

    /// Capacity after one growth step, `None` on overflow
    fn increase_capacity(&self, capacity: usize) -> Option<usize> {
        capacity.checked_mul(2)?.checked_add(1)
    }

    /// Smallest capacity `>= capacity` the sequence fully covers, `None` on overflow
    fn adjust_capacity(&self, capacity: usize) -> Option<usize>;
}

/// Triangular-number probing, `f(x) = (x² + x) / 2`, over power-of-two capacities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadraticProbing;

impl ProbingStrategy for QuadraticProbing {
    #[allow(clippy::integer_division)]
    fn probe(&self, attempt: usize) -> usize {
        // Halve the even factor first so the product stays exact modulo 2^64.
        if attempt % 2 == 0 {
            (attempt / 2).wrapping_mul(attempt.wrapping_add(1))
        } else {
            attempt.wrapping_mul(attempt.wrapping_add(1) / 2)
        }
    }

    /// Next power of two strictly above `capacity`
    fn increase_capacity(&self, capacity: usize) -> Option<usize> {
        let highest_bit = capacity.checked_ilog2()?;
        1_usize.checked_shl(highest_bit.checked_add(1)?)
    }

    fn adjust_capacity(&self, capacity: usize) -> Option<usize> {
        if capacity.is_power_of_two() { Some(capacity) } else { self.increase_capacity(capacity) }
    }
}

/// Linear probing with a fixed stride, `f(x) = 17x`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearProbing {
    /// Distance between two consecutive probes
    stride: usize,
    /// Capacity of the walk in progress, set by [`ProbingStrategy::setup`]
    capacity: usize,
}

impl LinearProbing {
    /// Stride used by [`LinearProbing::default`]
    pub const DEFAULT_STRIDE: usize = 17;

    /// Creates a linear strategy with a custom stride (at least 1)
    #[must_use]
    pub fn with_stride(stride: usize) -> Self {
        Self { stride: stride.max(1), capacity: 0 }
    }
}

impl Default for LinearProbing {
    fn default() -> Self {
        Self::with_stride(Self::DEFAULT_STRIDE)
    }
}

impl ProbingStrategy for LinearProbing {
    fn setup(&mut self, _hash: u32, capacity: usize) {
        self.capacity = capacity;
    }

    fn probe(&self, attempt: usize) -> usize {
        mul_mod(self.stride, attempt, self.capacity)
    }

    /// Smallest odd capacity `>= capacity` that is coprime with the stride
    fn adjust_capacity(&self, capacity: usize) -> Option<usize> {
        let mut capacity = capacity.checked_add(usize::from(capacity % 2 == 0))?;
        while gcd(self.stride, capacity) != 1 {
            capacity = capacity.checked_add(2)?;
        }
        Some(capacity)
    }
}

/// Double hashing, `f(x) = δ·x` with `δ` drawn from a secondary hash, over
/// prime capacities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleHashing {
    /// Step derived in [`ProbingStrategy::setup`], always in `1..capacity`
    delta: usize,
    /// Capacity of the walk in progress
    capacity: usize,
}

impl ProbingStrategy for DoubleHashing {
    #[allow(clippy::arithmetic_side_effects)]
    fn setup(&mut self, hash: u32, capacity: usize) {
        // Fibonacci mix decorrelates the step from the canonical slot.
        let secondary = hash.wrapping_mul(0x9E37_79B9).rotate_left(16) as usize;
        self.capacity = capacity;
        self.delta = match capacity {
            0..=2 => 1,
            _ => 1 + secondary % (capacity - 1),
        };
    }

    fn probe(&self, attempt: usize) -> usize {
        mul_mod(self.delta.max(1), attempt, self.capacity)
    }

    fn adjust_capacity(&self, capacity: usize) -> Option<usize> {
        next_prime(capacity)
    }
}

/// `a·b mod modulus` without overflow; a zero modulus leaves the product unreduced
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
fn mul_mod(a: usize, b: usize, modulus: usize) -> usize {
    if modulus == 0 {
        return a.wrapping_mul(b);
    }
    // The remainder is below `modulus`, so it fits back into usize.
    (a as u128 * b as u128 % modulus as u128) as usize
}

/// Greatest common divisor
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn gcd(a: usize, b: usize) -> usize {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Smallest prime `>= n`, `None` if it does not fit in `usize`
fn next_prime(n: usize) -> Option<usize> {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate = candidate.checked_add(1)?;
    }
    Some(candidate)
}

/// Trial division primality test
#[allow(clippy::arithmetic_side_effects)]
fn is_prime(n: usize) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut divisor = 3_usize;
    while divisor.saturating_mul(divisor) <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Slots visited by the first `capacity` probes from slot 0
    fn visited<S: ProbingStrategy>(strategy: &mut S, hash: u32, capacity: usize) -> HashSet<usize> {
        strategy.setup(hash, capacity);
        (0..capacity).map(|x| strategy.probe(x) % capacity).collect()
    }

    #[test]
    fn test_quadratic_offsets_are_triangular() {
        let offsets: Vec<_> = (1..=6).map(|x| QuadraticProbing.probe(x)).collect();
        assert_eq!(offsets, vec![1, 3, 6, 10, 15, 21]);
    }

    #[test]
    fn test_quadratic_capacity_rules() {
        assert_eq!(QuadraticProbing.adjust_capacity(7), Some(8));
        assert_eq!(QuadraticProbing.adjust_capacity(8), Some(8));
        assert_eq!(QuadraticProbing.increase_capacity(8), Some(16));
        assert_eq!(QuadraticProbing.increase_capacity(9), Some(16));
        assert_eq!(QuadraticProbing.increase_capacity(1 << (usize::BITS - 1)), None);
    }

    #[test]
    fn test_quadratic_covers_power_of_two_tables() {
        for capacity in [8, 16, 32, 64, 1024] {
            assert_eq!(visited(&mut QuadraticProbing, 0, capacity).len(), capacity);
        }
    }

    #[test]
    fn test_linear_capacity_is_coprime_with_stride() {
        let linear = LinearProbing::default();
        assert_eq!(linear.adjust_capacity(17), Some(19));
        assert_eq!(linear.adjust_capacity(34), Some(35));
        assert_eq!(linear.adjust_capacity(255), Some(257));
        assert_eq!(linear.adjust_capacity(8), Some(9));
        assert_eq!(linear.adjust_capacity(7), Some(7));
        assert_eq!(linear.increase_capacity(7), Some(15));
        assert_eq!(linear.increase_capacity(usize::MAX), None);
        assert_eq!(linear.adjust_capacity(usize::MAX - 1), None);
        assert_eq!(visited(&mut LinearProbing::default(), 0, 35).len(), 35);
    }

    #[test]
    fn test_wide_strides_stay_exact_modulo_capacity() {
        let mut wide = LinearProbing::with_stride(usize::MAX);
        assert_eq!(wide.adjust_capacity(7), Some(7));
        assert_eq!(visited(&mut wide, 0, 7).len(), 7);

        let mut huge = DoubleHashing::default();
        let capacity = next_prime(1 << 40).unwrap();
        huge.setup(u32::MAX, capacity);
        assert!(huge.probe(capacity - 1) < capacity);
        assert_eq!(mul_mod(usize::MAX, usize::MAX, 7), 1);
    }

    #[test]
    fn test_double_hashing_uses_prime_capacities() {
        let double = DoubleHashing::default();
        assert_eq!(double.adjust_capacity(7), Some(7));
        assert_eq!(double.adjust_capacity(8), Some(11));
        assert_eq!(double.adjust_capacity(15), Some(17));
    }

    #[test]
    fn test_double_hashing_covers_prime_tables() {
        for hash in [0, 1, 12_345, u32::MAX] {
            let mut strategy = DoubleHashing::default();
            assert_eq!(visited(&mut strategy, hash, 31).len(), 31);
            assert!((1..31).contains(&strategy.delta));
        }
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(17, 34), 17);
        assert_eq!(gcd(17, 35), 1);
        assert_eq!(gcd(12, 18), 6);
    }
}
