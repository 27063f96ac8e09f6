//! # Value Objects
//!
//! Immutable domain primitives for the key game ledger.
//! These types represent concepts that are defined by their value, not identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount in the smallest token unit.
pub type Amount = u128;

/// Round number (monotonically increasing, starting at 0).
pub type RoundId = u64;

/// Key count within a round.
pub type KeyCount = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte participant address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() == 20 {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(slice);
            Some(Self(bytes))
        } else {
            None
        }
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 20] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_slice() {
        let addr = Address::from_slice(&[7u8; 20]).unwrap();
        assert_eq!(addr, Address::new([7u8; 20]));
        assert!(Address::from_slice(&[1, 2, 3]).is_none());
    }

    #[test]
    fn test_address_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::new([1u8; 20]).is_zero());
    }

    #[test]
    fn test_address_display() {
        let addr = Address::new([0xab; 20]);
        assert_eq!(format!("{addr}"), "0xabababab...abab");
        assert!(format!("{addr:?}").starts_with("0xabababab"));
    }
}
