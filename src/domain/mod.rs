//! # Domain Layer
//!
//! Pure game logic: value objects, checked arithmetic, the round registry,
//! the pricing engine, and the ledger state machine. Nothing in here touches
//! the outside world; transfers and authorization live behind ports.

pub mod entities;
pub mod invariants;
pub mod ledger;
pub mod math;
pub mod pricing;
pub mod value_objects;

pub use entities::{
    GameConfig, Round, RoundInfo, RoundStatus, EXTENSION_PER_KEY_SECS,
    ROUND_INITIAL_DURATION_SECS, ROUND_MAX_DURATION_SECS,
};
pub use ledger::{BankClaim, DividendClaim, LedgerState, PurchaseOutcome, Rollover};
pub use pricing::{compute_keys, KeyPurchase};
pub use value_objects::{Address, Amount, KeyCount, RoundId, Timestamp};
