//! # Checked Arithmetic Utilities
//!
//! All ledger arithmetic goes through these helpers. Any overflow, underflow
//! or division by zero fails the enclosing operation with a `LedgerError`;
//! nothing in the ledger wraps or saturates silently.

use crate::domain::value_objects::Amount;
use crate::errors::LedgerError;

/// Checked addition.
pub fn add(a: Amount, b: Amount) -> Result<Amount, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

/// Checked subtraction.
pub fn sub(a: Amount, b: Amount) -> Result<Amount, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::Underflow)
}

/// Checked multiplication.
pub fn mul(a: Amount, b: Amount) -> Result<Amount, LedgerError> {
    a.checked_mul(b).ok_or(LedgerError::Overflow)
}

/// Checked division (floor).
pub fn div(a: Amount, b: Amount) -> Result<Amount, LedgerError> {
    a.checked_div(b).ok_or(LedgerError::DivisionByZero)
}

/// Checked exponentiation.
pub fn pow(base: Amount, exp: u32) -> Result<Amount, LedgerError> {
    base.checked_pow(exp).ok_or(LedgerError::Overflow)
}

/// Integer square root (floor), via Newton's method.
#[must_use]
pub fn sqrt(n: Amount) -> Amount {
    if n == 0 {
        return 0;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_overflow() {
        assert_eq!(add(1, 2).unwrap(), 3);
        assert!(matches!(add(Amount::MAX, 1), Err(LedgerError::Overflow)));
    }

    #[test]
    fn test_sub_underflow() {
        assert_eq!(sub(5, 3).unwrap(), 2);
        assert!(matches!(sub(3, 5), Err(LedgerError::Underflow)));
    }

    #[test]
    fn test_mul_overflow() {
        assert_eq!(mul(6, 7).unwrap(), 42);
        assert!(matches!(mul(Amount::MAX, 2), Err(LedgerError::Overflow)));
    }

    #[test]
    fn test_div_floor_and_zero() {
        assert_eq!(div(7, 2).unwrap(), 3);
        assert!(matches!(div(1, 0), Err(LedgerError::DivisionByZero)));
    }

    #[test]
    fn test_pow() {
        assert_eq!(pow(10, 3).unwrap(), 1000);
        assert!(matches!(pow(Amount::MAX, 2), Err(LedgerError::Overflow)));
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(sqrt(0), 0);
        assert_eq!(sqrt(1), 1);
        assert_eq!(sqrt(15), 3);
        assert_eq!(sqrt(16), 4);
        assert_eq!(sqrt(1_000_000), 1000);
    }
}
