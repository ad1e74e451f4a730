//! Owner and role-based access control for the host.
//!
//! Roles are a per-address bitmask. The owner implicitly passes every role
//! check; other callers must hold at least one bit of the required mask.

use std::collections::HashMap;

use crate::types::Address;

/// Role bit required to install, uninstall, or update extensions.
pub const ROLE_INSTALLER: u64 = 1;

/// Owner plus per-address role bitmasks.
#[derive(Debug, Clone)]
pub struct AccessControl {
    owner: Address,
    roles: HashMap<Address, u64>,
}

impl AccessControl {
    /// Create access control with the given owner and no granted roles.
    pub fn new(owner: Address) -> Self {
        AccessControl {
            owner,
            roles: HashMap::new(),
        }
    }

    /// The owner address.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Check if `who` is the owner.
    pub fn is_owner(&self, who: Address) -> bool {
        who == self.owner
    }

    /// Grant role bits to an account, returning its new mask.
    pub fn grant(&mut self, account: Address, bits: u64) -> u64 {
        let mask = self.roles.entry(account).or_insert(0);
        *mask |= bits;
        *mask
    }

    /// Revoke role bits from an account, returning its new mask.
    pub fn revoke(&mut self, account: Address, bits: u64) -> u64 {
        match self.roles.get_mut(&account) {
            Some(mask) => {
                *mask &= !bits;
                *mask
            }
            None => 0,
        }
    }

    /// Current role mask of an account.
    pub fn roles_of(&self, account: Address) -> u64 {
        self.roles.get(&account).copied().unwrap_or(0)
    }

    /// Check if an account holds at least one bit of `bits`.
    pub fn has_any(&self, account: Address, bits: u64) -> bool {
        self.roles_of(account) & bits != 0
    }

    /// Owner-or-role check used by permissioned routed functions and the
    /// installer gate.
    pub fn authorized(&self, who: Address, bits: u64) -> bool {
        self.is_owner(who) || self.has_any(who, bits)
    }
}
