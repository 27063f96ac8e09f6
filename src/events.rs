//! # Event Schema
//!
//! Payloads emitted by the service after each committed operation. Events
//! are published over a broadcast channel; subscribers get a cloned record
//! with a unique event id.

use crate::domain::value_objects::{Address, Amount, KeyCount, RoundId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One committed state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A new round was lazily opened.
    RoundOpened {
        round: RoundId,
        end_timestamp: Timestamp,
        dividends_percent: Amount,
    },
    /// Keys were bought; the buyer is the round's new leader.
    KeysPurchased {
        round: RoundId,
        buyer: Address,
        keys_bought: KeyCount,
        spent: Amount,
        refund: Amount,
    },
    /// Dividends were paid out through `through_round`.
    DividendsWithdrawn {
        addr: Address,
        amount: Amount,
        through_round: RoundId,
    },
    /// A round's winner payout was claimed.
    BankWithdrawn {
        round: RoundId,
        winner: Address,
        amount: Amount,
    },
    /// A fully settled round's remainder was folded into the active round.
    RemainderRolledOver {
        from_round: RoundId,
        into_round: RoundId,
        amount: Amount,
    },
    /// A global configuration value changed.
    ConfigUpdated {
        caller: Address,
        parameter: ConfigParameter,
        value: Amount,
    },
}

/// Which configuration value a `ConfigUpdated` event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigParameter {
    DividendsPercent,
    StartKeyPrice,
    PriceIncreasingPercent,
}

/// Broadcast envelope: payload plus a unique event id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique id of this emission.
    pub event_id: Uuid,
    /// The committed change.
    pub event: LedgerEvent,
}

impl EventRecord {
    /// Wraps an event with a fresh id.
    #[must_use]
    pub fn new(event: LedgerEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event,
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
    fn test_event_record_ids_are_unique() {
        let a = EventRecord::new(LedgerEvent::RoundOpened {
            round: 1,
            end_timestamp: 300,
            dividends_percent: 30,
        });
        let b = EventRecord::new(a.event.clone());
        assert_ne!(a.event_id, b.event_id);
    }

    #[test]
    fn test_event_serde_round_trip() {
        let record = EventRecord::new(LedgerEvent::KeysPurchased {
            round: 2,
            buyer: Address::new([5u8; 20]),
            keys_bought: 3,
            spent: 3_310,
            refund: 90,
        });
        let json = serde_json::to_string(&record).unwrap();
        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_id, record.event_id);
        assert_eq!(back.event, record.event);
    }
}
