//! # Bank Adapter
//!
//! In-memory funds-transfer implementation for testing and local runs.
//! A production adapter would forward transfers to the token-ledger
//! collaborator.

use crate::domain::value_objects::{Address, Amount};
use crate::errors::TransferError;
use crate::ports::outbound::FundsTransfer;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// In-memory bank: credits transfers to per-address balances.
///
/// `freeze()` makes every subsequent transfer fail, which tests use to
/// verify that a failed payout aborts the whole ledger operation.
#[derive(Debug, Default)]
pub struct InMemoryBank {
    balances: RwLock<HashMap<Address, Amount>>,
    frozen: AtomicBool,
}

impl InMemoryBank {
    /// Creates an empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total credited to `addr` so far.
    #[must_use]
    pub fn balance_of(&self, addr: Address) -> Amount {
        self.balances
            .read()
            .expect("bank lock poisoned")
            .get(&addr)
            .copied()
            .unwrap_or(0)
    }

    /// Makes all subsequent transfers fail.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::SeqCst);
    }

    /// Re-enables transfers.
    pub fn unfreeze(&self) {
        self.frozen.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl FundsTransfer for InMemoryBank {
    async fn transfer(&self, to: Address, amount: Amount) -> Result<(), TransferError> {
        if self.frozen.load(Ordering::SeqCst) {
            return Err(TransferError::Unavailable);
        }
        let mut balances = self.balances.write().expect("bank lock poisoned");
        let entry = balances.entry(to).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(TransferError::Rejected {
                reason: "balance overflow".to_string(),
            })?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
