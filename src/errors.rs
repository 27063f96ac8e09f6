//! # Error Types
//!
//! All error types for the key game ledger.
//!
//! Every error is local to one operation: an operation either fully applies
//! its effects or fully reverts them. The service layer stages mutations and
//! only commits after the single outbound transfer has succeeded.

use crate::domain::value_objects::{Address, Amount, RoundId};
use thiserror::Error;

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors that can occur during a ledger operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A checked arithmetic operation exceeded the representable range.
    #[error("arithmetic overflow")]
    Overflow,

    /// A checked subtraction went below zero.
    #[error("arithmetic underflow")]
    Underflow,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Caller does not hold the owner-or-admin capability.
    #[error("unauthorized caller: {caller}")]
    Unauthorized { caller: Address },

    /// Percentage parameter out of range (must be < 100).
    #[error("invalid percent: {value} (must be < 100)")]
    InvalidPercent { value: Amount },

    /// Pricing parameters would stall the price curve at a fixed price.
    #[error(
        "price curve stalled: start price {start_price} x {increase_percent}% < 1 unit per key"
    )]
    PriceCurveStalled {
        start_price: Amount,
        increase_percent: Amount,
    },

    /// Round is not strictly in the past.
    #[error("round {round} has not ended")]
    RoundNotEnded { round: RoundId },

    /// Claimant is not the round leader (or the payout was already claimed).
    #[error("claimant {claimant} is not the leader of round {round}")]
    NotRoundLeader { round: RoundId, claimant: Address },

    /// Round number was never created.
    #[error("round not found: {round}")]
    RoundNotFound { round: RoundId },

    /// Dividend sum is zero; reported distinctly from a transfer failure.
    #[error("nothing to claim")]
    NothingToClaim,

    /// Outbound payment could not be completed; the whole operation reverts.
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

impl LedgerError {
    /// Returns true if the error was raised before any state was staged
    /// (validation and authorization failures).
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::InvalidPercent { .. }
                | Self::PriceCurveStalled { .. }
                | Self::RoundNotEnded { .. }
                | Self::NotRoundLeader { .. }
                | Self::RoundNotFound { .. }
        )
    }
}

// =============================================================================
// TRANSFER ERRORS
// =============================================================================

/// Errors from the outbound value-transfer capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The collaborator refused the transfer (e.g. blacklisted recipient).
    #[error("transfer rejected: {reason}")]
    Rejected { reason: String },

    /// The collaborator is unreachable.
    #[error("transfer backend unavailable")]
    Unavailable,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(LedgerError::Overflow.to_string(), "arithmetic overflow");
        assert_eq!(LedgerError::NothingToClaim.to_string(), "nothing to claim");

        let err = LedgerError::InvalidPercent { value: 150 };
        assert_eq!(err.to_string(), "invalid percent: 150 (must be < 100)");

        let err = LedgerError::RoundNotEnded { round: 3 };
        assert_eq!(err.to_string(), "round 3 has not ended");
    }

    #[test]
    fn test_transfer_error_conversion() {
        let err: LedgerError = TransferError::Unavailable.into();
        assert!(matches!(err, LedgerError::TransferFailed(_)));
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_is_rejection() {
        assert!(LedgerError::Unauthorized {
            caller: Address::ZERO
        }
        .is_rejection());
        assert!(LedgerError::RoundNotFound { round: 9 }.is_rejection());
        assert!(!LedgerError::Overflow.is_rejection());
        assert!(!LedgerError::NothingToClaim.is_rejection());
    }
}
