//! # Core Domain Entities
//!
//! The round record, its derived status, and the global game configuration.

use crate::domain::value_objects::{Address, Amount, KeyCount, RoundId, Timestamp};
use crate::domain::{math, invariants};
use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// TIMING CONSTANTS
// =============================================================================

/// Duration of a freshly created round (5 minutes).
pub const ROUND_INITIAL_DURATION_SECS: u64 = 5 * 60;

/// Hard cap on how far a round's end may sit in the future (24 hours).
pub const ROUND_MAX_DURATION_SECS: u64 = 24 * 60 * 60;

/// End-time extension granted per key sold (30 seconds).
pub const EXTENSION_PER_KEY_SECS: u64 = 30;

// =============================================================================
// GAME CONFIGURATION
// =============================================================================

/// Global pricing and dividend configuration.
///
/// `dividends_percent` is only the default for *future* rounds: every round
/// snapshots it at creation and keeps the snapshot forever.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Price of the first key in every round.
    pub start_key_price: Amount,
    /// Compounding price increase per key sold, in percent.
    pub price_increasing_percent: Amount,
    /// Dividend share of a round's bank, in percent (rest goes to the leader).
    pub dividends_percent: Amount,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_key_price: 1_000_000,
            price_increasing_percent: 5,
            dividends_percent: 30,
        }
    }
}

impl GameConfig {
    /// Validates the configuration as a whole.
    ///
    /// The pricing pair must satisfy
    /// `start_key_price * price_increasing_percent / 100 >= 1` so the price
    /// rises by at least one unit per key and the pricing loop cannot stall.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.dividends_percent >= 100 {
            return Err(LedgerError::InvalidPercent {
                value: self.dividends_percent,
            });
        }
        let step = math::div(
            math::mul(self.start_key_price, self.price_increasing_percent)?,
            100,
        )?;
        if step < 1 {
            return Err(LedgerError::PriceCurveStalled {
                start_price: self.start_key_price,
                increase_percent: self.price_increasing_percent,
            });
        }
        Ok(())
    }
}

// =============================================================================
// ROUND STATUS (derived, never stored)
// =============================================================================

/// Lifecycle status of a round, derived from its stored fields on every
/// access. There is no status field to drift out of sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    /// `now < end_timestamp`: accepting purchases.
    Active,
    /// Ended, but the winner payout or some dividends are still outstanding.
    EndedUnsettled,
    /// Ended, winner payout claimed, every key holder's dividend accounted.
    FullySettled,
}

// =============================================================================
// ROUND
// =============================================================================

/// One competitive interval: a bank, a leader, and a key-price curve.
///
/// Rounds are append-only in the registry and are never deleted; they persist
/// indefinitely for historical dividend and settlement queries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Round {
    /// Absolute time after which the round is considered ended.
    pub end_timestamp: Timestamp,
    /// Last key buyer; `None` once the winner payout has been claimed.
    pub leader: Option<Address>,
    /// Cumulative value contributed by key purchases (excludes refunds).
    pub round_bank: Amount,
    /// Dividend share percentage snapshotted at round creation.
    pub dividends_percent: Amount,
    /// Total keys sold in the round.
    pub keys_counter: KeyCount,
    /// Keys held by each address in this round.
    pub address_keys: HashMap<Address, KeyCount>,
    /// Running sum of keys whose holders have withdrawn their dividends.
    pub count_validated_keys: KeyCount,
    /// Cumulative value already paid out of this round's bank.
    pub total_out: Amount,
}

impl Round {
    /// Opens a fresh round ending `ROUND_INITIAL_DURATION_SECS` from `now`,
    /// snapshotting the given dividends percentage.
    #[must_use]
    pub fn open(now: Timestamp, dividends_percent: Amount) -> Self {
        Self {
            end_timestamp: now + ROUND_INITIAL_DURATION_SECS,
            leader: None,
            round_bank: 0,
            dividends_percent,
            keys_counter: 0,
            address_keys: HashMap::new(),
            count_validated_keys: 0,
            total_out: 0,
        }
    }

    /// Returns true once the round's end time has passed.
    #[must_use]
    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.end_timestamp
    }

    /// Derives the round status from stored timestamps and counters.
    #[must_use]
    pub fn status(&self, now: Timestamp) -> RoundStatus {
        if !self.has_ended(now) {
            RoundStatus::Active
        } else if self.leader.is_none() && self.count_validated_keys == self.keys_counter {
            RoundStatus::FullySettled
        } else {
            RoundStatus::EndedUnsettled
        }
    }

    /// Keys held by `addr` in this round (zero if it never bought).
    #[must_use]
    pub fn keys_of(&self, addr: Address) -> KeyCount {
        self.address_keys.get(&addr).copied().unwrap_or(0)
    }

    /// Extends the end time by `EXTENSION_PER_KEY_SECS` per key bought,
    /// clamped so the end never sits more than `ROUND_MAX_DURATION_SECS`
    /// past `now` at the moment of extension.
    pub fn extend(&mut self, now: Timestamp, keys_bought: KeyCount) -> Result<(), LedgerError> {
        let extension = EXTENSION_PER_KEY_SECS
            .checked_mul(keys_bought)
            .ok_or(LedgerError::Overflow)?;
        let extended = self
            .end_timestamp
            .checked_add(extension)
            .ok_or(LedgerError::Overflow)?;
        let cap = now
            .checked_add(ROUND_MAX_DURATION_SECS)
            .ok_or(LedgerError::Overflow)?;
        self.end_timestamp = extended.min(cap);
        Ok(())
    }

    /// Unclaimed remainder still sitting in the bank (rounding dust plus
    /// never-claimed payouts).
    #[must_use]
    pub fn remainder(&self) -> Amount {
        debug_assert!(invariants::check_conservation(self));
        self.round_bank.saturating_sub(self.total_out)
    }
}

// =============================================================================
// ROUND INFO (read-model snapshot)
// =============================================================================

/// Flat snapshot of a round for read accessors, so callers never borrow
/// registry internals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInfo {
    pub round: RoundId,
    pub end_timestamp: Timestamp,
    pub leader: Option<Address>,
    pub round_bank: Amount,
    pub dividends_percent: Amount,
    pub keys_counter: KeyCount,
    pub total_out: Amount,
    pub count_validated_keys: KeyCount,
}

impl RoundInfo {
    /// Builds a snapshot of `round` under the id `id`.
    #[must_use]
    pub fn snapshot(id: RoundId, round: &Round) -> Self {
        Self {
            round: id,
            end_timestamp: round.end_timestamp,
            leader: round.leader,
            round_bank: round.round_bank,
            dividends_percent: round.dividends_percent,
            keys_counter: round.keys_counter,
            total_out: round.total_out,
            count_validated_keys: round.count_validated_keys,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(GameConfig::default().validate().is_ok());

        let bad_dividends = GameConfig {
            dividends_percent: 100,
            ..GameConfig::default()
        };
        assert!(matches!(
            bad_dividends.validate(),
            Err(LedgerError::InvalidPercent { value: 100 })
        ));

        // 50 * 1 / 100 == 0: the curve would never move.
        let stalled = GameConfig {
            start_key_price: 50,
            price_increasing_percent: 1,
            dividends_percent: 30,
        };
        assert!(matches!(
            stalled.validate(),
            Err(LedgerError::PriceCurveStalled { .. })
        ));
    }

    #[test]
    fn test_round_open_defaults() {
        let round = Round::open(1_000, 30);
        assert_eq!(round.end_timestamp, 1_000 + ROUND_INITIAL_DURATION_SECS);
        assert_eq!(round.leader, None);
        assert_eq!(round.round_bank, 0);
        assert_eq!(round.dividends_percent, 30);
        assert_eq!(round.keys_counter, 0);
    }

    #[test]
    fn test_status_derivation() {
        let mut round = Round::open(0, 30);
        assert_eq!(round.status(10), RoundStatus::Active);

        let after_end = round.end_timestamp;
        // Ended, nothing sold, no leader: nothing outstanding.
        assert_eq!(round.status(after_end), RoundStatus::FullySettled);

        round.leader = Some(Address::new([1u8; 20]));
        round.keys_counter = 5;
        assert_eq!(round.status(after_end), RoundStatus::EndedUnsettled);

        round.leader = None;
        assert_eq!(round.status(after_end), RoundStatus::EndedUnsettled);

        round.count_validated_keys = 5;
        assert_eq!(round.status(after_end), RoundStatus::FullySettled);
    }

    #[test]
    fn test_extend_and_clamp() {
        let mut round = Round::open(0, 30);
        let base_end = round.end_timestamp;

        round.extend(0, 2).unwrap();
        assert_eq!(round.end_timestamp, base_end + 2 * EXTENSION_PER_KEY_SECS);

        // A huge purchase clamps at now + 24h.
        round.extend(100, 1_000_000).unwrap();
        assert_eq!(round.end_timestamp, 100 + ROUND_MAX_DURATION_SECS);
    }

    #[test]
    fn test_remainder() {
        let mut round = Round::open(0, 30);
        round.round_bank = 1_000;
        round.total_out = 400;
        assert_eq!(round.remainder(), 600);
    }

    #[test]
    fn test_round_info_snapshot() {
        let mut round = Round::open(50, 25);
        round.round_bank = 777;
        round.leader = Some(Address::new([9u8; 20]));
        let info = RoundInfo::snapshot(3, &round);
        assert_eq!(info.round, 3);
        assert_eq!(info.round_bank, 777);
        assert_eq!(info.leader, Some(Address::new([9u8; 20])));
        assert_eq!(info.dividends_percent, 25);
    }
}
