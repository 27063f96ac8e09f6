//! # Access Adapter
//!
//! Owner/admin role book backing the authorization capability.

use crate::domain::value_objects::Address;
use crate::ports::outbound::AccessPolicy;
use std::collections::HashSet;
use std::sync::RwLock;

/// Role book with one owner and a mutable set of admins.
#[derive(Debug)]
pub struct RoleBook {
    owner: Address,
    admins: RwLock<HashSet<Address>>,
}

impl RoleBook {
    /// Creates a role book with `owner` as the only privileged address.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            admins: RwLock::new(HashSet::new()),
        }
    }

    /// Grants the admin role.
    pub fn add_admin(&self, admin: Address) {
        self.admins.write().expect("role lock poisoned").insert(admin);
    }

    /// Revokes the admin role.
    pub fn remove_admin(&self, admin: Address) {
        self.admins
            .write()
            .expect("role lock poisoned")
            .remove(&admin);
    }
}

impl AccessPolicy for RoleBook {
    fn is_privileged(&self, caller: Address) -> bool {
        caller == self.owner
            || self
                .admins
                .read()
                .expect("role lock poisoned")
                .contains(&caller)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_and_admins() {
        let owner = Address::new([1u8; 20]);
        let admin = Address::new([2u8; 20]);
        let stranger = Address::new([3u8; 20]);

        let roles = RoleBook::new(owner);
        assert!(roles.is_privileged(owner));
        assert!(!roles.is_privileged(admin));

        roles.add_admin(admin);
        assert!(roles.is_privileged(admin));
        assert!(!roles.is_privileged(stranger));

        roles.remove_admin(admin);
        assert!(!roles.is_privileged(admin));
    }
}
