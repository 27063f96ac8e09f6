//! # Ledger State
//!
//! The single source of truth for the key game: round registry, lifecycle
//! reconciliation, dividend accounting, and bank settlement.
//!
//! All global pricing and checkpoint state lives in one explicitly passed
//! `LedgerState` value, never in ambient globals, so the single-writer
//! discipline is enforceable at the service layer: operations mutate a staged
//! working copy that is only committed after the outbound transfer succeeds.

use crate::domain::entities::{GameConfig, Round, RoundInfo};
use crate::domain::value_objects::{Address, Amount, KeyCount, RoundId, Timestamp};
use crate::domain::{math, pricing};
use crate::errors::LedgerError;
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// OPERATION OUTCOMES
// =============================================================================

/// Remainder of a fully settled round folded into the active round's bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rollover {
    /// The settled round the remainder came from.
    pub from_round: RoundId,
    /// Amount added to the active round's bank.
    pub amount: Amount,
}

/// Outcome of a key purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseOutcome {
    /// Round the keys were bought in.
    pub round: RoundId,
    /// Keys bought.
    pub keys_bought: KeyCount,
    /// Value that entered the round bank.
    pub spent: Amount,
    /// Unspent payment owed back to the payer.
    pub refund: Amount,
    /// Round lazily opened by this operation, if any.
    pub opened_round: Option<RoundId>,
}

/// Outcome of a dividend withdrawal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DividendClaim {
    /// Total dividend owed to the claimant.
    pub amount: Amount,
    /// Last round included in the claim; the checkpoint advances past it.
    pub through_round: RoundId,
    /// Remainders folded forward while settling rounds along the way.
    pub rollovers: Vec<Rollover>,
    /// Round lazily opened by this operation, if any.
    pub opened_round: Option<RoundId>,
}

/// Outcome of a winner payout claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BankClaim {
    /// The round whose bank was claimed.
    pub round: RoundId,
    /// Winner payout amount.
    pub amount: Amount,
    /// Remainder folded forward if the claim fully settled the round.
    pub rollover: Option<Rollover>,
    /// Round lazily opened by this operation, if any.
    pub opened_round: Option<RoundId>,
}

// =============================================================================
// LEDGER STATE
// =============================================================================

/// Complete game state: configuration, the round registry, the active round's
/// key price, and every address's dividend-withdrawal checkpoint.
#[derive(Clone, Debug)]
pub struct LedgerState {
    config: GameConfig,
    cur_round: RoundId,
    cur_key_price: Amount,
    rounds: BTreeMap<RoundId, Round>,
    /// First round for which the address has not yet claimed dividends.
    /// An absent entry means round 0.
    withdrawal_checkpoint: HashMap<Address, RoundId>,
}

impl LedgerState {
    /// Creates the ledger with round 0 already open.
    pub fn new(now: Timestamp, config: GameConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        let mut rounds = BTreeMap::new();
        rounds.insert(0, Round::open(now, config.dividends_percent));
        Ok(Self {
            cur_key_price: config.start_key_price,
            config,
            cur_round: 0,
            rounds,
            withdrawal_checkpoint: HashMap::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Read accessors
    // -------------------------------------------------------------------------

    /// Active round number.
    #[must_use]
    pub fn current_round(&self) -> RoundId {
        self.cur_round
    }

    /// Price of the next key in the active round.
    #[must_use]
    pub fn current_key_price(&self) -> Amount {
        self.cur_key_price
    }

    /// Current global configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The full round registry (read-only).
    #[must_use]
    pub fn rounds(&self) -> &BTreeMap<RoundId, Round> {
        &self.rounds
    }

    /// Snapshot of a single round.
    pub fn round_info(&self, round: RoundId) -> Result<RoundInfo, LedgerError> {
        self.rounds
            .get(&round)
            .map(|r| RoundInfo::snapshot(round, r))
            .ok_or(LedgerError::RoundNotFound { round })
    }

    /// First round for which `addr` has not yet claimed dividends.
    #[must_use]
    pub fn checkpoint_of(&self, addr: Address) -> RoundId {
        self.withdrawal_checkpoint.get(&addr).copied().unwrap_or(0)
    }

    fn current(&self) -> &Round {
        self.rounds
            .get(&self.cur_round)
            .expect("current round always exists")
    }

    fn current_mut(&mut self) -> &mut Round {
        self.rounds
            .get_mut(&self.cur_round)
            .expect("current round always exists")
    }

    /// The last round that has fully ended: the round strictly before the
    /// active one, or the active round itself if it has already ended but a
    /// new one has not been lazily created yet.
    #[must_use]
    pub fn last_ended_round(&self, now: Timestamp) -> Option<RoundId> {
        if self.current().has_ended(now) {
            Some(self.cur_round)
        } else {
            self.cur_round.checked_sub(1)
        }
    }

    // -------------------------------------------------------------------------
    // Round lifecycle
    // -------------------------------------------------------------------------

    /// Lazily advances the round lifecycle: if the active round has ended,
    /// opens exactly one successor round and resets the key price.
    ///
    /// Never creates more than one round per invocation; elapsed "empty"
    /// rounds are skipped rather than materialized.
    pub fn reconcile(&mut self, now: Timestamp) -> Option<RoundId> {
        if !self.current().has_ended(now) {
            return None;
        }
        self.cur_round += 1;
        self.rounds.insert(
            self.cur_round,
            Round::open(now, self.config.dividends_percent),
        );
        self.cur_key_price = self.config.start_key_price;
        Some(self.cur_round)
    }

    // -------------------------------------------------------------------------
    // Purchases
    // -------------------------------------------------------------------------

    /// Buys keys with `amount` on behalf of `payer`.
    ///
    /// The returned `refund` must be paid back to the payer through the
    /// transfer capability before the mutation is committed.
    pub fn buy_keys(
        &mut self,
        now: Timestamp,
        payer: Address,
        amount: Amount,
    ) -> Result<PurchaseOutcome, LedgerError> {
        let opened_round = self.reconcile(now);

        let purchase =
            pricing::compute_keys(amount, self.cur_key_price, self.config.price_increasing_percent)?;
        let spent = math::sub(amount, purchase.remainder)?;

        let round_id = self.cur_round;
        let round = self.current_mut();
        round.leader = Some(payer);
        round.extend(now, purchase.keys_bought)?;
        round.round_bank = math::add(round.round_bank, spent)?;
        let held = round.keys_of(payer);
        round.address_keys.insert(
            payer,
            held.checked_add(purchase.keys_bought)
                .ok_or(LedgerError::Overflow)?,
        );
        round.keys_counter = round
            .keys_counter
            .checked_add(purchase.keys_bought)
            .ok_or(LedgerError::Overflow)?;
        self.cur_key_price = purchase.final_price;

        Ok(PurchaseOutcome {
            round: round_id,
            keys_bought: purchase.keys_bought,
            spent,
            refund: purchase.remainder,
            opened_round,
        })
    }

    // -------------------------------------------------------------------------
    // Dividends
    // -------------------------------------------------------------------------

    /// Proportional dividend of `addr_keys` keys in `round`, with the full
    /// multiplication performed before either floor division. Rounds that
    /// sold no keys contribute zero.
    fn dividend_share(round: &Round, addr_keys: KeyCount) -> Result<Amount, LedgerError> {
        if round.keys_counter == 0 {
            return Ok(0);
        }
        let product = math::mul(
            math::mul(round.round_bank, round.dividends_percent)?,
            Amount::from(addr_keys),
        )?;
        math::div(math::div(product, 100)?, Amount::from(round.keys_counter))
    }

    /// Unrealized dividend total from the checkpoint through the *current*
    /// round inclusive. Informational: the current round may still be active.
    pub fn accrued_dividends(&self, addr: Address) -> Result<Amount, LedgerError> {
        self.sum_dividends(addr, self.cur_round)
    }

    /// Dividend total from the checkpoint through the last fully ended round.
    pub fn withdrawable_dividends(
        &self,
        now: Timestamp,
        addr: Address,
    ) -> Result<Amount, LedgerError> {
        match self.last_ended_round(now) {
            Some(last) => self.sum_dividends(addr, last),
            None => Ok(0),
        }
    }

    fn sum_dividends(&self, addr: Address, through: RoundId) -> Result<Amount, LedgerError> {
        let mut sum: Amount = 0;
        for r in self.checkpoint_of(addr)..=through {
            let round = self
                .rounds
                .get(&r)
                .ok_or(LedgerError::RoundNotFound { round: r })?;
            let held = round.keys_of(addr);
            if held > 0 {
                sum = math::add(sum, Self::dividend_share(round, held)?)?;
            }
        }
        Ok(sum)
    }

    /// Withdraws every dividend owed to `addr` through the last ended round,
    /// marking the keys as validated and folding forward any round that
    /// becomes fully settled along the way.
    ///
    /// Fails with `NothingToClaim` when the sum is zero so callers can
    /// distinguish "nothing owed" from a transfer failure.
    pub fn withdraw_dividends(
        &mut self,
        now: Timestamp,
        addr: Address,
    ) -> Result<DividendClaim, LedgerError> {
        let opened_round = self.reconcile(now);

        let last = self
            .last_ended_round(now)
            .ok_or(LedgerError::NothingToClaim)?;
        let checkpoint = self.checkpoint_of(addr);
        if checkpoint > last {
            return Err(LedgerError::NothingToClaim);
        }

        let mut sum: Amount = 0;
        let mut rollovers = Vec::new();
        for r in checkpoint..=last {
            {
                let round = self
                    .rounds
                    .get_mut(&r)
                    .ok_or(LedgerError::RoundNotFound { round: r })?;
                let held = round.keys_of(addr);
                if round.keys_counter > 0 && held > 0 {
                    let share = Self::dividend_share(round, held)?;
                    round.total_out = math::add(round.total_out, share)?;
                    round.count_validated_keys = round
                        .count_validated_keys
                        .checked_add(held)
                        .ok_or(LedgerError::Overflow)?;
                    sum = math::add(sum, share)?;
                }
            }
            if let Some(amount) = self.try_rollover(r)? {
                rollovers.push(Rollover {
                    from_round: r,
                    amount,
                });
            }
        }

        if sum == 0 {
            return Err(LedgerError::NothingToClaim);
        }
        self.withdrawal_checkpoint.insert(addr, last + 1);

        Ok(DividendClaim {
            amount: sum,
            through_round: last,
            rollovers,
            opened_round,
        })
    }

    // -------------------------------------------------------------------------
    // Bank settlement
    // -------------------------------------------------------------------------

    /// Pays the winner's share of a past round's bank to its leader.
    ///
    /// Requires the round to be strictly in the past and `claimant` to be its
    /// (unclaimed) leader. Clearing the leader marks the payout as claimed.
    pub fn withdraw_bank(
        &mut self,
        now: Timestamp,
        claimant: Address,
        round_id: RoundId,
    ) -> Result<BankClaim, LedgerError> {
        let opened_round = self.reconcile(now);

        if round_id >= self.cur_round {
            return Err(LedgerError::RoundNotEnded { round: round_id });
        }
        let payout;
        {
            let round = self
                .rounds
                .get_mut(&round_id)
                .ok_or(LedgerError::RoundNotFound { round: round_id })?;
            if round.leader != Some(claimant) {
                return Err(LedgerError::NotRoundLeader {
                    round: round_id,
                    claimant,
                });
            }
            payout = math::div(
                math::mul(
                    round.round_bank,
                    math::sub(100, round.dividends_percent)?,
                )?,
                100,
            )?;
            round.total_out = math::add(round.total_out, payout)?;
            round.leader = None;
        }

        let rollover = self.try_rollover(round_id)?.map(|amount| Rollover {
            from_round: round_id,
            amount,
        });

        Ok(BankClaim {
            round: round_id,
            amount: payout,
            rollover,
            opened_round,
        })
    }

    /// Folds a fully settled round's unclaimed remainder into the active
    /// round's bank.
    ///
    /// The condition: the round has ended (it is strictly before the active
    /// round), its winner payout has been claimed (`leader` is `None`), and
    /// every key holder's dividend has been accounted
    /// (`count_validated_keys == keys_counter`).
    ///
    /// Idempotent: the settled round's `total_out` is raised to its bank as
    /// part of the fold, so a second evaluation sees a zero remainder.
    fn try_rollover(&mut self, from: RoundId) -> Result<Option<Amount>, LedgerError> {
        if from >= self.cur_round {
            return Ok(None);
        }
        let remainder;
        {
            let round = self
                .rounds
                .get_mut(&from)
                .ok_or(LedgerError::RoundNotFound { round: from })?;
            if round.leader.is_some() || round.count_validated_keys != round.keys_counter {
                return Ok(None);
            }
            remainder = round.remainder();
            if remainder == 0 {
                return Ok(None);
            }
            round.total_out = round.round_bank;
        }
        let current = self.current_mut();
        current.round_bank = math::add(current.round_bank, remainder)?;
        Ok(Some(remainder))
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Sets the default dividend percentage for rounds created after this
    /// call; existing rounds keep their snapshot.
    pub fn set_dividends_percent(&mut self, value: Amount) -> Result<(), LedgerError> {
        if value >= 100 {
            return Err(LedgerError::InvalidPercent { value });
        }
        self.config.dividends_percent = value;
        Ok(())
    }

    /// Sets the starting key price, keeping the price curve guarantee.
    pub fn set_start_key_price(&mut self, value: Amount) -> Result<(), LedgerError> {
        let candidate = GameConfig {
            start_key_price: value,
            ..self.config.clone()
        };
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }

    /// Sets the per-key price increase, keeping the price curve guarantee.
    pub fn set_price_increasing_percent(&mut self, value: Amount) -> Result<(), LedgerError> {
        let candidate = GameConfig {
            price_increasing_percent: value,
            ..self.config.clone()
        };
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
