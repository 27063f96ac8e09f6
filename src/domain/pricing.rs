//! # Key Pricing Engine
//!
//! Given a payment and the current price, computes how many keys the payment
//! buys under a compounding price curve, the unspent remainder, and the price
//! after the last purchase.
//!
//! Implemented as a bounded loop, never recursion: the remaining payment
//! strictly decreases by at least one unit per iteration (the price is
//! always >= 1), so the loop terminates for any input.

use crate::domain::math;
use crate::domain::value_objects::{Amount, KeyCount};
use crate::errors::LedgerError;

/// Outcome of running a payment through the price curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPurchase {
    /// Keys purchasable with the payment.
    pub keys_bought: KeyCount,
    /// Unspent part of the payment, to be refunded.
    pub remainder: Amount,
    /// Price of the next key after this purchase.
    pub final_price: Amount,
}

/// Runs `payment` through the compounding price curve.
///
/// While the remaining payment covers the current price, one key is bought,
/// the price is deducted, and the price rises by `increasing_percent` percent
/// (floor division). Pure function: all three outputs are produced in every
/// case, including zero keys bought (`remainder == payment`,
/// `final_price == starting_price`).
pub fn compute_keys(
    payment: Amount,
    starting_price: Amount,
    increasing_percent: Amount,
) -> Result<KeyPurchase, LedgerError> {
    // A zero price would make the loop spin forever; configuration
    // validation keeps the curve at >= 1 unit, this is the last line of
    // defense for direct callers.
    if starting_price == 0 {
        return Err(LedgerError::PriceCurveStalled {
            start_price: starting_price,
            increase_percent: increasing_percent,
        });
    }

    let mut remaining = payment;
    let mut price = starting_price;
    let mut keys_bought: KeyCount = 0;

    while remaining >= price {
        remaining = math::sub(remaining, price)?;
        keys_bought = keys_bought.checked_add(1).ok_or(LedgerError::Overflow)?;
        let step = math::div(math::mul(price, increasing_percent)?, 100)?;
        price = math::add(price, step)?;
    }

    Ok(KeyPurchase {
        keys_bought,
        remainder: remaining,
        final_price: price,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_keys_bought() {
        let out = compute_keys(999, 1_000, 10).unwrap();
        assert_eq!(out.keys_bought, 0);
        assert_eq!(out.remainder, 999);
        assert_eq!(out.final_price, 1_000);
    }

    #[test]
    fn test_spec_scenario_exact_arithmetic() {
        // 2000 at price 1000, 1% increase: 1000 >= 1000 buys key 1
        // (price -> 1010), remaining 1000 < 1010, stop.
        let out = compute_keys(2_000, 1_000, 1).unwrap();
        assert_eq!(out.keys_bought, 1);
        assert_eq!(out.remainder, 1_000);
        assert_eq!(out.final_price, 1_010);
    }

    #[test]
    fn test_compounding_multi_key() {
        // 1000 + 1100 + 1210 = 3310 spent, 90 left, price 1331.
        let out = compute_keys(3_400, 1_000, 10).unwrap();
        assert_eq!(out.keys_bought, 3);
        assert_eq!(out.remainder, 90);
        assert_eq!(out.final_price, 1_331);
    }

    #[test]
    fn test_price_monotonicity() {
        let mut price = 1_000;
        for payment in [500, 1_000, 5_000, 20_000] {
            let out = compute_keys(payment, price, 7).unwrap();
            assert!(out.final_price >= price);
            if out.keys_bought > 0 {
                assert!(out.final_price > price);
            }
            price = out.final_price;
        }
    }

    #[test]
    fn test_floor_division_on_step() {
        // 101 * 1 / 100 == 1 (floor), so the price moves by exactly 1.
        let out = compute_keys(101, 101, 1).unwrap();
        assert_eq!(out.keys_bought, 1);
        assert_eq!(out.final_price, 102);
    }

    #[test]
    fn test_zero_price_rejected() {
        assert!(matches!(
            compute_keys(1_000, 0, 10),
            Err(LedgerError::PriceCurveStalled { .. })
        ));
    }

    #[test]
    fn test_exact_payment_consumed() {
        let out = compute_keys(1_000, 1_000, 10).unwrap();
        assert_eq!(out.keys_bought, 1);
        assert_eq!(out.remainder, 0);
        assert_eq!(out.final_price, 1_100);
    }
}
