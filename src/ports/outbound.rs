//! # Driven Ports (Outbound)
//!
//! Interfaces the ledger depends on. The surrounding system (token ledger,
//! role management, host clock) implements these traits; the core never
//! reaches past them.
//!
//! Dependencies point inward: adapters implement these traits, the domain
//! and service only consume them.

use crate::domain::value_objects::{Address, Amount, Timestamp};
use crate::errors::TransferError;
use async_trait::async_trait;

// =============================================================================
// VALUE TRANSFER
// =============================================================================

/// Outbound value-transfer capability.
///
/// Each ledger operation performs at most one transfer through this port,
/// and a failure aborts the whole operation: the service commits its staged
/// state only after the transfer returns `Ok`.
#[async_trait]
pub trait FundsTransfer: Send + Sync {
    /// Pays `amount` to `to`.
    async fn transfer(&self, to: Address, amount: Amount) -> Result<(), TransferError>;
}

// =============================================================================
// AUTHORIZATION
// =============================================================================

/// Owner-or-admin authorization capability consumed from the access-control
/// collaborator. Configuration setters are gated through it.
pub trait AccessPolicy: Send + Sync {
    /// Returns true if `caller` holds the owner-or-admin role.
    fn is_privileged(&self, caller: Address) -> bool;
}

// =============================================================================
// CLOCK
// =============================================================================

/// Time source for round expiry checks.
///
/// Expiry is evaluated synchronously at the start of each operation against
/// this clock; there is no background timer or scheduled callback.
pub trait Clock: Send + Sync {
    /// Current unix time in seconds.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct AllowAll;

    impl AccessPolicy for AllowAll {
        fn is_privileged(&self, _caller: Address) -> bool {
            true
        }
    }

    struct FixedClock(Timestamp);

    impl Clock for FixedClock {
        fn now(&self) -> Timestamp {
            self.0
        }
    }

    #[test]
    fn test_trait_objects() {
        let policy: Box<dyn AccessPolicy> = Box::new(AllowAll);
        assert!(policy.is_privileged(Address::ZERO));

        let clock: Box<dyn Clock> = Box::new(FixedClock(42));
        assert_eq!(clock.now(), 42);
    }
}
