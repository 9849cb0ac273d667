//! Error types shared by both table variants

use thiserror::Error;

/// Construction parameters rejected at the call boundary
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidArgument {
    /// Capacity must be positive
    #[error("Illegal capacity: {0}")]
    Capacity(usize),
    /// Load factor must be finite and strictly positive
    #[error("Illegal load factor: {0}")]
    LoadFactor(f64),
}

/// Failures surfaced by table construction, growth and checked iteration.
///
/// None of these are retried internally: each one reports a caller error
/// (or an impossible growth request) and leaves the table untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TableError {
    /// A construction parameter was out of range
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    /// The table changed between two steps of a checked cursor
    #[error("table was modified during iteration")]
    ConcurrentModification,
    /// Growing past `capacity` would exceed the addressable size
    #[error("capacity overflow while growing a table of {capacity} slots")]
    CapacityOverflow {
        /// Capacity at the moment growth was requested
        capacity: usize,
    },
}

impl TableError {
    /// Returns true for the `InvalidArgument` family
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TableError::from(InvalidArgument::Capacity(0));
        assert_eq!(err.to_string(), "Illegal capacity: 0");
        assert!(err.is_invalid_argument());

        let err = TableError::from(InvalidArgument::LoadFactor(-0.5));
        assert_eq!(err.to_string(), "Illegal load factor: -0.5");

        assert!(!TableError::ConcurrentModification.is_invalid_argument());
        assert_eq!(
            TableError::CapacityOverflow { capacity: 8 }.to_string(),
            "capacity overflow while growing a table of 8 slots"
        );
    }
}
