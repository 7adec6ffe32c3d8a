//! Capability checks.
//!
//! Role and permission data live outside this core; the portal only
//! consumes a boolean capability check. `RoleTable` is the in-repo
//! implementation used by the admin tool and tests.

use crate::types::UserId;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Approve, deny, or revert bank transactions.
    ApproveTransactions,
    /// Submit non-transfer ledger groups (contracts, job pay, grants).
    ManageLedger,
    /// Act on a player record the actor does not own.
    ManagePlayers,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ApproveTransactions => "approve-transactions",
            Capability::ManageLedger => "manage-ledger",
            Capability::ManagePlayers => "manage-players",
        };
        f.write_str(name)
    }
}

pub trait Authorizer {
    fn has_capability(&self, actor: UserId, capability: Capability) -> bool;
}

/// Static capability grants keyed by user id.
#[derive(Debug, Default, Clone)]
pub struct RoleTable {
    grants: HashMap<UserId, HashSet<Capability>>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, user: UserId, capability: Capability) -> &mut Self {
        self.grants.entry(user).or_default().insert(capability);
        self
    }
}

impl Authorizer for RoleTable {
    fn has_capability(&self, actor: UserId, capability: Capability) -> bool {
        self.grants
            .get(&actor)
            .is_some_and(|caps| caps.contains(&capability))
    }
}
