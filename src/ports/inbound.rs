//! # Driving Port (Inbound)
//!
//! The operations the key game exposes to its collaborators. Implemented by
//! `KeyGameService`; callers hold this trait, not the service type.

use crate::domain::entities::RoundInfo;
use crate::domain::value_objects::{Address, Amount, KeyCount, RoundId};
use crate::errors::LedgerError;
use async_trait::async_trait;

/// External interface of the key game ledger.
///
/// Every mutating operation executes as one atomic transaction: it either
/// fully applies its effects (including the single outbound transfer) or
/// fully reverts them.
#[async_trait]
pub trait KeyGameApi: Send + Sync {
    /// Buys keys with `amount` (already received by the capability layer)
    /// on behalf of `payer`. Returns the number of keys bought; any unspent
    /// remainder is refunded through the transfer capability.
    async fn buy_keys(&self, payer: Address, amount: Amount) -> Result<KeyCount, LedgerError>;

    /// Unrealized dividend total through the current round (read-only).
    async fn show_accrued_dividends(&self, addr: Address) -> Result<Amount, LedgerError>;

    /// Claimable dividend total through the last ended round (read-only).
    async fn show_withdrawable_dividends(&self, addr: Address) -> Result<Amount, LedgerError>;

    /// Pays out every dividend owed to `addr` and advances its checkpoint.
    /// Returns the amount paid. Fails with `NothingToClaim` when zero.
    async fn withdraw_dividends(&self, addr: Address) -> Result<Amount, LedgerError>;

    /// Pays the winner share of a past round's bank to its leader.
    /// Returns the amount paid.
    async fn withdraw_bank(
        &self,
        claimant: Address,
        round: RoundId,
    ) -> Result<Amount, LedgerError>;

    /// Sets the dividend percentage for rounds created after this call.
    /// Admin-gated.
    async fn set_dividends_percent(
        &self,
        caller: Address,
        value: Amount,
    ) -> Result<(), LedgerError>;

    /// Sets the starting key price of future rounds. Admin-gated.
    async fn set_start_key_price(&self, caller: Address, value: Amount)
        -> Result<(), LedgerError>;

    /// Sets the compounding price increase per key. Admin-gated.
    async fn set_price_increasing_percent(
        &self,
        caller: Address,
        value: Amount,
    ) -> Result<(), LedgerError>;

    /// Active round number.
    async fn current_round(&self) -> RoundId;

    /// Price of the next key in the active round.
    async fn current_key_price(&self) -> Amount;

    /// Snapshot of a round's stored fields.
    async fn round_info(&self, round: RoundId) -> Result<RoundInfo, LedgerError>;
}
