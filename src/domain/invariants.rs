//! # Domain Invariants
//!
//! Invariants that MUST hold for every round at all times. They are enforced
//! by construction in `ledger.rs`; these helpers exist so tests and debug
//! assertions can verify them independently.

use crate::domain::entities::Round;
use crate::domain::ledger::LedgerState;

/// Conservation: a round never pays out more than it took in.
#[must_use]
pub fn check_conservation(round: &Round) -> bool {
    round.total_out <= round.round_bank
}

/// Validated keys never exceed the keys actually sold.
#[must_use]
pub fn check_validated_bound(round: &Round) -> bool {
    round.count_validated_keys <= round.keys_counter
}

/// Per-address key counts sum to the round's total counter.
#[must_use]
pub fn check_key_accounting(round: &Round) -> bool {
    let sum: u64 = round.address_keys.values().sum();
    sum == round.keys_counter
}

/// Checks every registered round plus the registry shape itself: round
/// numbers are consecutive from 0 through the current round.
#[must_use]
pub fn check_ledger(state: &LedgerState) -> bool {
    let mut expected = 0u64;
    for (&id, round) in state.rounds() {
        if id != expected
            || !check_conservation(round)
            || !check_validated_bound(round)
            || !check_key_accounting(round)
        {
            return false;
        }
        expected += 1;
    }
    expected == state.current_round() + 1
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Round;
    use crate::domain::value_objects::Address;

    #[test]
    fn test_conservation() {
        let mut round = Round::open(0, 30);
        round.round_bank = 100;
        round.total_out = 100;
        assert!(check_conservation(&round));
        round.total_out = 101;
        assert!(!check_conservation(&round));
    }

    #[test]
    fn test_validated_bound() {
        let mut round = Round::open(0, 30);
        round.keys_counter = 4;
        round.count_validated_keys = 4;
        assert!(check_validated_bound(&round));
        round.count_validated_keys = 5;
        assert!(!check_validated_bound(&round));
    }

    #[test]
    fn test_key_accounting() {
        let mut round = Round::open(0, 30);
        round.address_keys.insert(Address::new([1u8; 20]), 3);
        round.address_keys.insert(Address::new([2u8; 20]), 2);
        round.keys_counter = 5;
        assert!(check_key_accounting(&round));
        round.keys_counter = 6;
        assert!(!check_key_accounting(&round));
    }
}
