//! # Key Game Service
//!
//! The single logical writer over the ledger state. Every mutating operation
//! takes the write lock for its full duration, runs the domain logic against
//! a staged working copy, performs the single outbound transfer, and only
//! then commits — so a failed transfer (or any arithmetic/validation error)
//! leaves the committed state untouched.
//!
//! Committed operations publish `EventRecord`s over a broadcast channel and
//! update service statistics.

use crate::domain::entities::{GameConfig, RoundInfo};
use crate::domain::ledger::{LedgerState, Rollover};
use crate::domain::value_objects::{Address, Amount, KeyCount, RoundId};
use crate::errors::LedgerError;
use crate::events::{ConfigParameter, EventRecord, LedgerEvent};
use crate::ports::inbound::KeyGameApi;
use crate::ports::outbound::{AccessPolicy, Clock, FundsTransfer};

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, instrument, warn};

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Capacity of the event broadcast channel.
    pub event_buffer: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { event_buffer: 256 }
    }
}

/// Statistics for the key game service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Total operations attempted (mutating calls).
    pub operations_executed: u64,
    /// Operations that committed.
    pub successful_operations: u64,
    /// Operations that reverted.
    pub failed_operations: u64,
    /// Calls rejected before staging (authorization/validation).
    pub rejected_calls: u64,
    /// Keys sold across all rounds.
    pub keys_sold: u64,
    /// Total value paid out (refunds, dividends, winner payouts).
    pub total_paid_out: Amount,
}

/// The key game service: ledger state behind a write lock, plus the three
/// outbound capabilities it consumes.
pub struct KeyGameService<B, P, C> {
    bank: Arc<B>,
    policy: Arc<P>,
    clock: Arc<C>,
    state: RwLock<LedgerState>,
    stats: RwLock<ServiceStats>,
    events: broadcast::Sender<EventRecord>,
}

impl<B, P, C> KeyGameService<B, P, C>
where
    B: FundsTransfer,
    P: AccessPolicy,
    C: Clock,
{
    /// Creates the service with round 0 open as of `clock.now()`.
    pub fn new(
        bank: Arc<B>,
        policy: Arc<P>,
        clock: Arc<C>,
        game_config: GameConfig,
        service_config: ServiceConfig,
    ) -> Result<Self, LedgerError> {
        let state = LedgerState::new(clock.now(), game_config)?;
        let (events, _) = broadcast::channel(service_config.event_buffer);
        Ok(Self {
            bank,
            policy,
            clock,
            state: RwLock::new(state),
            stats: RwLock::new(ServiceStats::default()),
            events,
        })
    }

    /// Subscribes to committed-operation events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    /// Current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    fn emit(&self, event: LedgerEvent) {
        // No subscribers is fine; events are best-effort notifications.
        let _ = self.events.send(EventRecord::new(event));
    }

    fn emit_round_opened(&self, state: &LedgerState, opened: Option<RoundId>) {
        if let Some(round) = opened {
            if let Ok(info) = state.round_info(round) {
                self.emit(LedgerEvent::RoundOpened {
                    round,
                    end_timestamp: info.end_timestamp,
                    dividends_percent: info.dividends_percent,
                });
            }
        }
    }

    fn emit_rollovers(&self, state: &LedgerState, rollovers: &[Rollover]) {
        for rollover in rollovers {
            self.emit(LedgerEvent::RemainderRolledOver {
                from_round: rollover.from_round,
                into_round: state.current_round(),
                amount: rollover.amount,
            });
        }
    }

    async fn record_success(&self) {
        let mut stats = self.stats.write().await;
        stats.operations_executed += 1;
        stats.successful_operations += 1;
    }

    async fn record_failure(&self, err: &LedgerError) {
        let mut stats = self.stats.write().await;
        stats.operations_executed += 1;
        stats.failed_operations += 1;
        if err.is_rejection() {
            stats.rejected_calls += 1;
        }
    }

    async fn fail(&self, err: LedgerError) -> LedgerError {
        self.record_failure(&err).await;
        err
    }

    /// Authorization gate shared by the configuration setters.
    async fn authorize(&self, caller: Address) -> Result<(), LedgerError> {
        if self.policy.is_privileged(caller) {
            Ok(())
        } else {
            warn!(caller = %caller, "unauthorized configuration call");
            Err(self.fail(LedgerError::Unauthorized { caller }).await)
        }
    }

    async fn apply_config_change<F>(
        &self,
        caller: Address,
        parameter: ConfigParameter,
        value: Amount,
        mutate: F,
    ) -> Result<(), LedgerError>
    where
        F: FnOnce(&mut LedgerState) -> Result<(), LedgerError>,
    {
        self.authorize(caller).await?;
        let mut state = self.state.write().await;
        if let Err(err) = mutate(&mut state) {
            return Err(self.fail(err).await);
        }
        drop(state);
        self.record_success().await;
        self.emit(LedgerEvent::ConfigUpdated {
            caller,
            parameter,
            value,
        });
        info!(?parameter, value, "configuration updated");
        Ok(())
    }
}

#[async_trait]
impl<B, P, C> KeyGameApi for KeyGameService<B, P, C>
where
    B: FundsTransfer,
    P: AccessPolicy,
    C: Clock,
{
    #[instrument(skip(self), fields(payer = %payer))]
    async fn buy_keys(&self, payer: Address, amount: Amount) -> Result<KeyCount, LedgerError> {
        let now = self.clock.now();
        let mut state = self.state.write().await;
        let mut staged = state.clone();

        let outcome = match staged.buy_keys(now, payer, amount) {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.fail(err).await),
        };
        if outcome.refund > 0 {
            if let Err(err) = self.bank.transfer(payer, outcome.refund).await {
                warn!(error = %err, "refund transfer failed, reverting purchase");
                return Err(self.fail(err.into()).await);
            }
        }
        *state = staged;

        self.emit_round_opened(&state, outcome.opened_round);
        self.emit(LedgerEvent::KeysPurchased {
            round: outcome.round,
            buyer: payer,
            keys_bought: outcome.keys_bought,
            spent: outcome.spent,
            refund: outcome.refund,
        });
        drop(state);

        {
            let mut stats = self.stats.write().await;
            stats.operations_executed += 1;
            stats.successful_operations += 1;
            stats.keys_sold += outcome.keys_bought;
            stats.total_paid_out += outcome.refund;
        }
        debug!(
            round = outcome.round,
            keys_bought = outcome.keys_bought,
            spent = outcome.spent,
            refund = outcome.refund,
            "keys purchased"
        );
        Ok(outcome.keys_bought)
    }

    async fn show_accrued_dividends(&self, addr: Address) -> Result<Amount, LedgerError> {
        self.state.read().await.accrued_dividends(addr)
    }

    async fn show_withdrawable_dividends(&self, addr: Address) -> Result<Amount, LedgerError> {
        let now = self.clock.now();
        self.state.read().await.withdrawable_dividends(now, addr)
    }

    #[instrument(skip(self), fields(addr = %addr))]
    async fn withdraw_dividends(&self, addr: Address) -> Result<Amount, LedgerError> {
        let now = self.clock.now();
        let mut state = self.state.write().await;
        let mut staged = state.clone();

        let claim = match staged.withdraw_dividends(now, addr) {
            Ok(claim) => claim,
            Err(err) => return Err(self.fail(err).await),
        };
        if let Err(err) = self.bank.transfer(addr, claim.amount).await {
            warn!(error = %err, "dividend transfer failed, reverting withdrawal");
            return Err(self.fail(err.into()).await);
        }
        *state = staged;

        self.emit_round_opened(&state, claim.opened_round);
        self.emit(LedgerEvent::DividendsWithdrawn {
            addr,
            amount: claim.amount,
            through_round: claim.through_round,
        });
        self.emit_rollovers(&state, &claim.rollovers);
        drop(state);

        {
            let mut stats = self.stats.write().await;
            stats.operations_executed += 1;
            stats.successful_operations += 1;
            stats.total_paid_out += claim.amount;
        }
        info!(
            amount = claim.amount,
            through_round = claim.through_round,
            "dividends withdrawn"
        );
        Ok(claim.amount)
    }

    #[instrument(skip(self), fields(claimant = %claimant))]
    async fn withdraw_bank(
        &self,
        claimant: Address,
        round: RoundId,
    ) -> Result<Amount, LedgerError> {
        let now = self.clock.now();
        let mut state = self.state.write().await;
        let mut staged = state.clone();

        let claim = match staged.withdraw_bank(now, claimant, round) {
            Ok(claim) => claim,
            Err(err) => return Err(self.fail(err).await),
        };
        if let Err(err) = self.bank.transfer(claimant, claim.amount).await {
            warn!(error = %err, "winner payout transfer failed, reverting claim");
            return Err(self.fail(err.into()).await);
        }
        *state = staged;

        self.emit_round_opened(&state, claim.opened_round);
        self.emit(LedgerEvent::BankWithdrawn {
            round: claim.round,
            winner: claimant,
            amount: claim.amount,
        });
        if let Some(rollover) = claim.rollover {
            self.emit_rollovers(&state, &[rollover]);
        }
        drop(state);

        {
            let mut stats = self.stats.write().await;
            stats.operations_executed += 1;
            stats.successful_operations += 1;
            stats.total_paid_out += claim.amount;
        }
        info!(round = claim.round, amount = claim.amount, "bank withdrawn");
        Ok(claim.amount)
    }

    #[instrument(skip(self), fields(caller = %caller))]
    async fn set_dividends_percent(
        &self,
        caller: Address,
        value: Amount,
    ) -> Result<(), LedgerError> {
        self.apply_config_change(caller, ConfigParameter::DividendsPercent, value, |state| {
            state.set_dividends_percent(value)
        })
        .await
    }

    #[instrument(skip(self), fields(caller = %caller))]
    async fn set_start_key_price(
        &self,
        caller: Address,
        value: Amount,
    ) -> Result<(), LedgerError> {
        self.apply_config_change(caller, ConfigParameter::StartKeyPrice, value, |state| {
            state.set_start_key_price(value)
        })
        .await
    }

    #[instrument(skip(self), fields(caller = %caller))]
    async fn set_price_increasing_percent(
        &self,
        caller: Address,
        value: Amount,
    ) -> Result<(), LedgerError> {
        self.apply_config_change(
            caller,
            ConfigParameter::PriceIncreasingPercent,
            value,
            |state| state.set_price_increasing_percent(value),
        )
        .await
    }

    async fn current_round(&self) -> RoundId {
        self.state.read().await.current_round()
    }

    async fn current_key_price(&self) -> Amount {
        self.state.read().await.current_key_price()
    }

    async fn round_info(&self, round: RoundId) -> Result<RoundInfo, LedgerError> {
        self.state.read().await.round_info(round)
    }
}

// =============================================================================
// TESTS
// =============================================================================
