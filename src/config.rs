//! Construction parameters for both table variants

use crate::error::{InvalidArgument, TableError};

/// Initial capacity and maximum load factor of a table.
///
/// Values below the variant's default capacity are raised to it; everything
/// else is taken as given once [`TableConfig::validate`] accepts it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    /// Requested number of slots (open addressing) or buckets (chaining)
    pub capacity: usize,
    /// Ratio of used slots to capacity that triggers growth
    pub load_factor: f64,
}

impl TableConfig {
    /// Defaults used by [`crate::OpenAddressingTable`]
    pub const OPEN_ADDRESSING: Self = Self { capacity: 7, load_factor: 0.65 };
    /// Defaults used by [`crate::SeparateChainingTable`]
    pub const SEPARATE_CHAINING: Self = Self { capacity: 3, load_factor: 0.75 };

    /// Creates a config without validating it
    #[must_use]
    pub const fn new(capacity: usize, load_factor: f64) -> Self {
        Self { capacity, load_factor }
    }

    /// Checks that capacity is positive and the load factor is finite and positive
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidArgument`] naming the offending parameter.
    pub fn validate(self) -> Result<Self, TableError> {
        if self.capacity == 0 {
            return Err(InvalidArgument::Capacity(self.capacity).into());
        }
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(InvalidArgument::LoadFactor(self.load_factor).into());
        }
        Ok(self)
    }

    /// Number of used slots that a table of `capacity` slots admits before growing
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn threshold(&self, capacity: usize) -> usize {
        // saturating float-to-int cast, never wraps
        (capacity as f64 * self.load_factor).floor() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TableConfig::OPEN_ADDRESSING.validate().is_ok());
        assert!(TableConfig::SEPARATE_CHAINING.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = TableConfig::new(0, 0.5).validate().unwrap_err();
        assert_eq!(err, TableError::InvalidArgument(InvalidArgument::Capacity(0)));
    }

    #[test]
    fn test_rejects_bad_load_factors() {
        for load_factor in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = TableConfig::new(8, load_factor).validate().unwrap_err();
            assert!(err.is_invalid_argument(), "{load_factor} accepted");
        }
    }

    #[test]
    fn test_threshold_floors() {
        let config = TableConfig::new(8, 0.65);
        assert_eq!(config.threshold(8), 5);
        assert_eq!(config.threshold(16), 10);
        assert_eq!(TableConfig::new(3, 0.75).threshold(3), 2);
        assert_eq!(TableConfig::new(7, 2.0).threshold(7), 14);
    }
}
